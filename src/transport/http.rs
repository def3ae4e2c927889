use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::debug;
use url::Url;

use crate::poster::is_success;

use super::{Payload, Response, Result, Session, Transport, TransportError};

/// Plain HTTP(S) transport backed by a blocking reqwest client.
///
/// A new client is built in [`Transport::open`] and dropped in
/// [`Session::close`], so no connection outlives the post that opened it.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    pub timeout: Option<Duration>, // whole-request timeout; None leaves reqwest's default
    pub user_agent: String,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self {
            timeout: None,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpTransport {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..Self::default()
        }
    }
}

impl Transport for HttpTransport {
    type Session = HttpSession;

    fn open(&self) -> Result<HttpSession> {
        let mut builder = Client::builder()
            .user_agent(self.user_agent.clone())
            .pool_max_idle_per_host(0);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(TransportError::Client)?;
        debug!("Opened HTTP client");
        Ok(HttpSession { client })
    }
}

pub struct HttpSession {
    client: Client,
}

impl Session for HttpSession {
    fn send(&mut self, target: &Url, payload: &Payload) -> Result<Response> {
        let response = self
            .client
            .post(target.clone())
            .header(CONTENT_TYPE, payload.content_type)
            .header(ACCEPT, payload.accept)
            .body(payload.body.clone())
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    TransportError::Connect(e.to_string())
                } else {
                    TransportError::Request(e)
                }
            })?;

        // The status alone decides the outcome; the body only feeds diagnostics.
        let status = response.status();
        let body = if is_success(status.as_u16()) {
            String::new()
        } else {
            response.text().unwrap_or_else(|e| {
                debug!("Failed to read response body: {}", e);
                String::new()
            })
        };

        Ok(Response {
            status: status.as_u16(),
            reason: status.canonical_reason().map(str::to_string),
            body,
        })
    }

    fn close(self) -> Result<()> {
        drop(self.client);
        debug!("Closed HTTP client");
        Ok(())
    }
}
