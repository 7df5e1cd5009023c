//! Transport Module
//!
//! TCP connection to the unit and reply framing.
//!
//! ## Framing
//! - Requests: command text + CR LF
//! - Replies: no terminator and no length prefix; a read that stays idle
//!   for the configured timeout ends the reply
//! - Replies are cleaned before decoding (see [`clean_response`])

mod cleanup;
mod connection;

pub use cleanup::{clean_bytes, clean_response, GARBAGE_PREFIX};
pub use connection::{Connection, READ_CHUNK_SIZE, TERMINATOR};
