pub mod encode;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, error, warn};
use url::Url;

use crate::record::MeasurementRecord;
use crate::transport::{HttpTransport, Response, Session, SessionGuard, Transport, TransportError};
use encode::EncodeError;

#[derive(Error, Debug)]
pub enum PosterError {
    #[error("POST URL is empty")]
    EmptyTarget,

    #[error("Invalid POST URL: {0}")]
    InvalidTarget(#[from] url::ParseError),
}

/// Back-end flavour, which decides the wire format
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServerType {
    Diana,        // JSON body
    Spark,        // URL-encoded form
    Other(String), // anything we do not know how to post to
}

impl fmt::Display for ServerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerType::Diana => f.write_str("diana"),
            ServerType::Spark => f.write_str("spark"),
            ServerType::Other(name) => f.write_str(name),
        }
    }
}

impl From<&str> for ServerType {
    fn from(name: &str) -> Self {
        let name = name.trim();
        match name.to_ascii_lowercase().as_str() {
            "diana" => ServerType::Diana,
            "spark" => ServerType::Spark,
            _ => ServerType::Other(name.to_string()),
        }
    }
}

impl FromStr for ServerType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ServerType::from(s))
    }
}

/// Why a single post did not get a response; only ever logged
#[derive(Error, Debug)]
enum PostFailure {
    #[error("encoding failed: {0}")]
    Encode(#[from] EncodeError),

    #[error("{0}")]
    Transport(#[from] TransportError),
}

/// POSTs measurement records to one URL.
///
/// Every call to [`Poster::post`] opens its own transport session and closes
/// it before returning, so a `Poster` can be shared between threads without
/// locking.
#[derive(Debug)]
pub struct Poster<T = HttpTransport> {
    target: Url,
    server_type: ServerType,
    transport: T,
}

impl Poster<HttpTransport> {
    pub fn new(target: &str, server_type: ServerType) -> Result<Self, PosterError> {
        Self::with_transport(target, server_type, HttpTransport::default())
    }
}

impl<T: Transport> Poster<T> {
    pub fn with_transport(
        target: &str,
        server_type: ServerType,
        transport: T,
    ) -> Result<Self, PosterError> {
        let target = target.trim();
        if target.is_empty() {
            return Err(PosterError::EmptyTarget);
        }
        let target = Url::parse(target)?;
        debug!("Created {} poster for {}", server_type, target);
        Ok(Poster {
            target,
            server_type,
            transport,
        })
    }

    pub fn target(&self) -> &Url {
        &self.target
    }

    pub fn server_type(&self) -> &ServerType {
        &self.server_type
    }

    /// POST one record. A new connection is opened and closed on every call.
    ///
    /// Returns `true` if the server answered 200, 201 or 204. Every other
    /// outcome (another status, an unsupported back-end, an encoding or
    /// transport error) is logged and returns `false`.
    ///
    /// # Panics
    ///
    /// With the default [`HttpTransport`], calling this from inside an async
    /// runtime panics, since reqwest's blocking client cannot be used or dropped
    /// there. From async code, run it on `tokio::task::spawn_blocking`.
    pub fn post(&self, record: &MeasurementRecord) -> bool {
        debug!("Posting: {}", record);

        match self.send(record) {
            Ok(Some(response)) => {
                debug!(
                    "Response status: {} {}",
                    response.status,
                    response.reason.as_deref().unwrap_or("")
                );
                if is_success(response.status) {
                    debug!("Returned {} response, we're clear", response.status);
                    true
                } else {
                    warn!("Response code is not 200/201/204, is {}", response.status);
                    warn!(
                        "More details: {} {}",
                        response.reason.as_deref().unwrap_or("Unknown"),
                        response.body
                    );
                    false
                }
            }
            Ok(None) => {
                warn!("No response found");
                false
            }
            Err(e) => {
                error!("Error posting {} to {}: {}", record.sensor_id, self.target, e);
                false
            }
        }
    }

    fn send(&self, record: &MeasurementRecord) -> Result<Option<Response>, PostFailure> {
        let Some(payload) = encode::encode(&self.server_type, record)? else {
            warn!("Unsupported server type {:?}, not posting", self.server_type);
            return Ok(None);
        };
        debug!("Encoded for {} as: {}", self.server_type, payload.body);

        let mut guard = SessionGuard::new(self.transport.open()?);
        let response = guard.session().send(&self.target, &payload)?;
        Ok(Some(response))
    }
}

/// 200, 201 and 204 count as delivered
pub fn is_success(status: u16) -> bool {
    matches!(status, 200 | 201 | 204)
}
