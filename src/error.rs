//! Error types for hvctl
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using HvError
pub type Result<T> = std::result::Result<T, HvError>;

/// Unified error type for hvctl operations
#[derive(Debug, Error)]
pub enum HvError {
    // -------------------------------------------------------------------------
    // Connection Errors
    // -------------------------------------------------------------------------
    /// TCP handshake timed out, was refused, or the address was unreachable
    #[error("Connection to {addr} failed: {source}")]
    Connection {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Write or unexpected read failure in the middle of a round trip
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// The connection saw a transport error earlier and must be rebuilt
    #[error("Connection is broken by an earlier transport error; reconnect")]
    ConnectionBroken,

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    /// The cleaned response does not have the shape the command expects
    #[error("Wrong response: {response:?} (format: '{pattern}')")]
    Protocol { response: String, pattern: String },

    /// The device echoed different values than the ones requested.
    /// `echoed` holds the digit text as received.
    #[error(
        "Channel or code in response {echoed:?} not the same as in request {requested:?}: {response:?}"
    )]
    EchoMismatch {
        requested: (u32, u32),
        echoed: (String, String),
        response: String,
    },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl HvError {
    /// Build a protocol error from the offending text and the pattern template
    pub fn protocol(response: impl Into<String>, pattern: impl Into<String>) -> Self {
        HvError::Protocol {
            response: response.into(),
            pattern: pattern.into(),
        }
    }
}
