//! Transport-neutral description of what went wrong in a remote call.
//!
//! Providers translate their client library's errors into [`Fault`] so the
//! classifier never needs to know about sockets, resolvers or TLS stacks.

use std::io::ErrorKind;

use thiserror::Error;

/// Closed set of fault kinds a [`crate::WeatherProvider`] may report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("request timed out")]
    TimedOut,

    #[error("failed to resolve host: {0}")]
    Dns(String),

    #[error("connection refused: {0}")]
    ConnectionRefused(String),

    #[error("host unreachable: {0}")]
    Unreachable(String),

    #[error("I/O interrupted: {0}")]
    Interrupted(String),

    #[error("TLS handshake failed: {0}")]
    Tls(String),

    /// Any other transport-level I/O failure.
    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("{}", .0.as_deref().unwrap_or("unknown failure"))]
    Other(Option<String>),
}

impl Fault {
    /// The fault's own message, if it carries one.
    pub fn message(&self) -> Option<String> {
        match self {
            Fault::Other(None) => None,
            other => Some(other.to_string()),
        }
    }
}

impl Fault {
    /// Maps a failure while reading a response body.
    ///
    /// reqwest reports a connection dropped mid-body as a decode error, so
    /// this path never yields [`Fault::Decode`]. The message is fixed rather
    /// than taken from the error chain.
    pub fn from_body_read(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_timeout() {
            return Fault::TimedOut;
        }
        io_error_kind(&err)
            .and_then(|kind| io_fault(kind, error_chain(&err)))
            .unwrap_or_else(|| Fault::Transport("response body was cut short".into()))
    }
}

impl From<reqwest::Error> for Fault {
    fn from(err: reqwest::Error) -> Self {
        // The URL carries the API key and the user's query.
        let err = err.without_url();
        let message = error_chain(&err);

        if err.is_timeout() {
            return Fault::TimedOut;
        }
        if let Some(status) = err.status() {
            return Fault::Status { status: status.as_u16(), message };
        }
        if let Some(fault) = io_error_kind(&err).and_then(|kind| io_fault(kind, message.clone())) {
            return fault;
        }

        if err.is_connect() {
            let lower = message.to_lowercase();
            if ["dns", "resolve", "lookup"].iter().any(|k| lower.contains(k)) {
                return Fault::Dns(message);
            }
            if ["tls", "ssl", "certificate"].iter().any(|k| lower.contains(k)) {
                return Fault::Tls(message);
            }
            return Fault::Transport(message);
        }

        if err.is_request() || err.is_body() {
            return Fault::Transport(message);
        }
        if err.is_decode() {
            return Fault::Decode(message);
        }

        Fault::Other(Some(message))
    }
}

fn io_fault(kind: ErrorKind, message: String) -> Option<Fault> {
    match kind {
        ErrorKind::TimedOut => Some(Fault::TimedOut),
        ErrorKind::ConnectionRefused => Some(Fault::ConnectionRefused(message)),
        ErrorKind::HostUnreachable | ErrorKind::NetworkUnreachable => {
            Some(Fault::Unreachable(message))
        }
        ErrorKind::Interrupted => Some(Fault::Interrupted(message)),
        _ => None,
    }
}

/// Joins an error and all of its sources: `outer: inner: root`.
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

fn io_error_kind(err: &(dyn std::error::Error + 'static)) -> Option<ErrorKind> {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            return Some(io.kind());
        }
        source = cause.source();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{ErrorCategory, classify};

    #[test]
    fn other_without_message_has_no_message() {
        assert_eq!(Fault::Other(None).message(), None);
        assert_eq!(Fault::Other(None).to_string(), "unknown failure");
    }

    #[test]
    fn status_message_includes_code() {
        let fault = Fault::Status { status: 400, message: "No matching location found.".into() };
        assert_eq!(fault.message().as_deref(), Some("HTTP 400: No matching location found."));
    }

    #[derive(Debug, Error)]
    #[error("error sending request")]
    struct Wrapper(#[source] std::io::Error);

    #[test]
    fn error_chain_walks_sources() {
        let err = Wrapper(std::io::Error::new(ErrorKind::ConnectionRefused, "refused"));
        assert_eq!(error_chain(&err), "error sending request: refused");
        assert_eq!(io_error_kind(&err), Some(ErrorKind::ConnectionRefused));
    }

    #[tokio::test]
    async fn refused_connection_maps_to_connectivity_fault() {
        // Bind then drop to get a local port nobody listens on.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
            listener.local_addr().expect("addr").port()
        };

        let err = reqwest::Client::new()
            .get(format!("http://127.0.0.1:{port}/"))
            .send()
            .await
            .expect_err("nothing is listening");

        let fault = Fault::from(err);
        assert_eq!(classify(&fault, "fallback"), ErrorCategory::NoConnectivity, "{fault:?}");
    }

    #[tokio::test]
    async fn fault_text_leaves_out_the_request_url() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
            listener.local_addr().expect("addr").port()
        };

        let err = reqwest::Client::new()
            .get(format!("http://127.0.0.1:{port}/search.json"))
            .query(&[("key", "SECRET_KEY_123"), ("q", "Shostka")])
            .send()
            .await
            .expect_err("nothing is listening");

        let text = Fault::from(err).to_string();
        assert!(!text.contains("SECRET_KEY_123"), "{text}");
        assert!(!text.contains("Shostka"), "{text}");
    }
}
