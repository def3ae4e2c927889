//! The network seam between a [`Poster`](crate::poster::Poster) and the wire.
//!
//! A [`Transport`] hands out one [`Session`] per post. The session is used for
//! a single request and then closed; nothing is shared between posts, so a
//! transport never needs interior locking. Reusing sessions (pooling) would
//! make concurrent posts share connection state and is deliberately not done
//! here.

pub mod http;

use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

pub use self::http::HttpTransport;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("HTTP request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Failed to close session: {0}")]
    Close(String),
}

pub type Result<T> = std::result::Result<T, TransportError>;

/// An encoded request body together with its media types
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub body: String,
    pub content_type: &'static str,
    pub accept: &'static str,
}

/// What came back from the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub reason: Option<String>, // canonical reason phrase, if known
    pub body: String,
}

impl Response {
    pub fn new(status: u16) -> Self {
        Response {
            status,
            reason: None,
            body: String::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }
}

/// Opens a fresh session for every post
pub trait Transport: Send + Sync {
    type Session: Session;

    fn open(&self) -> Result<Self::Session>;
}

/// Per-post connection state
pub trait Session {
    /// POST the payload to `target` and read the whole response
    fn send(&mut self, target: &Url, payload: &Payload) -> Result<Response>;

    /// Release the session's resources
    fn close(self) -> Result<()>;
}

/// Owns a session and closes it when dropped, whatever path the post took.
///
/// A failed close is logged and otherwise ignored: by the time the guard
/// drops, the outcome of the post has already been decided.
pub struct SessionGuard<S: Session> {
    session: Option<S>,
}

impl<S: Session> SessionGuard<S> {
    pub fn new(session: S) -> Self {
        SessionGuard {
            session: Some(session),
        }
    }

    pub fn session(&mut self) -> &mut S {
        // Only `drop` takes the session out.
        self.session
            .as_mut()
            .unwrap_or_else(|| unreachable!("session released before guard dropped"))
    }
}

impl<S: Session> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            match session.close() {
                Ok(()) => debug!("Session closed"),
                Err(e) => warn!("Error closing session: {}", e),
            }
        }
    }
}
