use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use url::Url;

use measurement_poster::replay;
use measurement_poster::transport::{Payload, Response, Session, Transport, TransportError};
use measurement_poster::{MeasurementRecord, Poster, Quantity, ServerType, Unit};

/// What a stub session should do when asked to send
#[derive(Clone)]
enum Reply {
    Status(u16),
    ConnectError,
}

#[derive(Default)]
struct Log {
    opened: usize,
    closed: usize,
    sent: Vec<Payload>,
}

#[derive(Clone)]
struct StubTransport {
    reply: Reply,
    fail_open: bool,
    fail_close: bool,
    log: Arc<Mutex<Log>>,
}

impl StubTransport {
    fn replying(reply: Reply) -> Self {
        StubTransport {
            reply,
            fail_open: false,
            fail_close: false,
            log: Arc::default(),
        }
    }

    fn log(&self) -> std::sync::MutexGuard<'_, Log> {
        self.log.lock().unwrap()
    }
}

struct StubSession {
    reply: Reply,
    fail_close: bool,
    log: Arc<Mutex<Log>>,
}

impl Transport for StubTransport {
    type Session = StubSession;

    fn open(&self) -> Result<StubSession, TransportError> {
        if self.fail_open {
            return Err(TransportError::Connect("no route to host".into()));
        }
        self.log().opened += 1;
        Ok(StubSession {
            reply: self.reply.clone(),
            fail_close: self.fail_close,
            log: self.log.clone(),
        })
    }
}

impl Session for StubSession {
    fn send(&mut self, _target: &Url, payload: &Payload) -> Result<Response, TransportError> {
        self.log.lock().unwrap().sent.push(payload.clone());
        match self.reply {
            Reply::Status(status) => Ok(Response::new(status).with_body("stub")),
            Reply::ConnectError => Err(TransportError::Connect("connection refused".into())),
        }
    }

    fn close(self) -> Result<(), TransportError> {
        self.log.lock().unwrap().closed += 1;
        if self.fail_close {
            Err(TransportError::Close("already closed".into()))
        } else {
            Ok(())
        }
    }
}

/// Fails the test if the poster ever tries to open a session
struct ForbiddenTransport;

impl Transport for ForbiddenTransport {
    type Session = StubSession;

    fn open(&self) -> Result<StubSession, TransportError> {
        panic!("unsupported server types must not touch the network");
    }
}

const TARGET: &str = "http://x/measurements";

fn record() -> MeasurementRecord {
    let time = Utc.timestamp_millis_opt(1_609_459_201_500).unwrap();
    MeasurementRecord::new("s1", time, Quantity::new(21.5, Unit::Celsius))
}

fn poster(server_type: ServerType, transport: StubTransport) -> Poster<StubTransport> {
    Poster::with_transport(TARGET, server_type, transport).unwrap()
}

#[test]
fn unsupported_type_never_opens_a_session() {
    let poster = Poster::with_transport(
        TARGET,
        ServerType::Other("influx".into()),
        ForbiddenTransport,
    )
    .unwrap();
    assert!(!poster.post(&record()));
}

#[test]
fn one_session_per_post_and_always_closed() {
    let transport = StubTransport::replying(Reply::Status(201));
    let poster = poster(ServerType::Diana, transport.clone());

    assert!(poster.post(&record()));
    assert!(poster.post(&record()));

    let log = transport.log();
    assert_eq!(log.opened, 2);
    assert_eq!(log.closed, 2);
    assert_eq!(log.sent.len(), 2);
    assert_eq!(log.sent[0].content_type, "application/json; charset=utf-8");
}

#[test]
fn session_closed_after_non_success_status() {
    let transport = StubTransport::replying(Reply::Status(500));
    let poster = poster(ServerType::Spark, transport.clone());

    assert!(!poster.post(&record()));
    assert_eq!(transport.log().closed, 1);
    assert_eq!(transport.log().sent[0].body, "name=s1&value=21.5&unit=Cel");
}

#[test]
fn connection_error_returns_false_and_closes() {
    let transport = StubTransport::replying(Reply::ConnectError);
    let poster = poster(ServerType::Diana, transport.clone());

    assert!(!poster.post(&record()));
    assert_eq!(transport.log().opened, 1);
    assert_eq!(transport.log().closed, 1);
}

#[test]
fn open_failure_returns_false() {
    let transport = StubTransport {
        fail_open: true,
        ..StubTransport::replying(Reply::Status(200))
    };
    let poster = poster(ServerType::Diana, transport.clone());

    assert!(!poster.post(&record()));
    assert_eq!(transport.log().opened, 0);
    assert_eq!(transport.log().closed, 0);
}

#[test]
fn close_failure_does_not_change_outcome() {
    let ok = StubTransport {
        fail_close: true,
        ..StubTransport::replying(Reply::Status(204))
    };
    assert!(poster(ServerType::Diana, ok.clone()).post(&record()));
    assert_eq!(ok.log().closed, 1);

    let rejected = StubTransport {
        fail_close: true,
        ..StubTransport::replying(Reply::Status(400))
    };
    assert!(!poster(ServerType::Diana, rejected).post(&record()));
}

#[test]
fn malformed_value_never_reaches_the_transport() {
    let transport = StubTransport::replying(Reply::Status(200));
    let poster = poster(ServerType::Diana, transport.clone());

    let mut bad = record();
    bad.measurement.value = f64::NAN;
    assert!(!poster.post(&bad));
    assert_eq!(transport.log().opened, 0);
}

#[test]
fn concurrent_posts_each_get_their_own_session() {
    let transport = StubTransport::replying(Reply::Status(200));
    let poster = poster(ServerType::Spark, transport.clone());

    std::thread::scope(|scope| {
        for _ in 0..16 {
            scope.spawn(|| assert!(poster.post(&record())));
        }
    });

    let log = transport.log();
    assert_eq!(log.opened, 16);
    assert_eq!(log.closed, 16);
}

#[test]
fn replay_counts_successes_and_failures() {
    let records = vec![record(), record(), record()];

    let ok = StubTransport::replying(Reply::Status(201));
    let summary = replay::replay(&poster(ServerType::Diana, ok.clone()), &records, Duration::ZERO);
    assert_eq!(summary.posted, 3);
    assert!(summary.all_posted());

    let refused = StubTransport::replying(Reply::ConnectError);
    let summary = replay::replay(&poster(ServerType::Diana, refused), &records, Duration::ZERO);
    assert_eq!(summary.posted, 0);
    assert_eq!(summary.failed, 3);
    assert!(!summary.all_posted());
}
