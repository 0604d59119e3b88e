//! Maps provider faults onto the few categories a user ever sees.

use thiserror::Error;

use crate::fault::Fault;

/// Message keywords that mark an otherwise unrecognised transport failure
/// as a connectivity problem.
const CONNECTIVITY_KEYWORDS: &[&str] = &["host", "connect", "ssl", "resolve", "unreachable", "route"];

/// User-facing failure category published by the coordinators.
///
/// `Display` renders the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorCategory {
    #[error("No internet connection")]
    NoConnectivity,

    #[error("Connection error")]
    ConnectionError,

    #[error("Invalid location name")]
    InvalidLocation,

    #[error("{0}")]
    Unspecified(String),
}

/// Classify `fault` by kind first, then by message keywords for generic
/// transport failures. `fallback` is used when the fault carries no message.
pub fn classify(fault: &Fault, fallback: &str) -> ErrorCategory {
    match fault {
        Fault::TimedOut
        | Fault::Dns(_)
        | Fault::ConnectionRefused(_)
        | Fault::Unreachable(_)
        | Fault::Interrupted(_)
        | Fault::Tls(_) => ErrorCategory::NoConnectivity,
        Fault::Transport(message) => {
            let lower = message.to_lowercase();
            if CONNECTIVITY_KEYWORDS.iter().any(|k| lower.contains(k)) {
                ErrorCategory::NoConnectivity
            } else {
                ErrorCategory::ConnectionError
            }
        }
        Fault::Status { .. } | Fault::Decode(_) | Fault::Other(_) => {
            ErrorCategory::Unspecified(fault.message().unwrap_or_else(|| fallback.to_string()))
        }
    }
}
