//! Client Module
//!
//! Command façade over one connection to the HV control unit.
//!
//! ## Responsibilities
//! - Map typed requests to wire text
//! - Validate replies and decode their numeric fields
//! - Keep exactly one command in flight on the connection

use std::thread;

use parking_lot::Mutex;

use crate::config::Config;
use crate::error::{HvError, Result};
use crate::protocol::{ChannelEcho, Command, Pattern, Telemetry};
use crate::transport::Connection;

/// Client for one HV control unit
///
/// ## Concurrency Model: one command in flight
///
/// The unit answers strictly one request at a time and replies carry no
/// framing, so interleaved round trips would corrupt each other. Every
/// operation holds `connection` for the whole drain → send → settle → read
/// sequence. Methods take `&self`; share the client with `Arc` if needed.
///
/// Each reply costs at least one full read timeout. Keep the client off
/// latency-sensitive threads.
pub struct HvClient {
    /// Client configuration
    config: Config,

    /// The single connection (the in-flight command lock)
    connection: Mutex<Connection>,
}

impl HvClient {
    /// Connect to the unit described by `config`
    pub fn connect(config: Config) -> Result<Self> {
        let connection = Connection::open(&config)?;
        tracing::info!("Connected to HV unit at {}", config.addr());

        Ok(Self {
            config,
            connection: Mutex::new(connection),
        })
    }

    /// Connect to the unit at its factory address
    pub fn connect_default() -> Result<Self> {
        Self::connect(Config::default())
    }

    /// Get the client configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether a transport error has invalidated the connection
    pub fn is_broken(&self) -> bool {
        self.connection.lock().is_broken()
    }

    // =========================================================================
    // Passthrough
    // =========================================================================

    /// Send arbitrary text and return the cleaned reply, unvalidated
    pub fn execute(&self, text: &str) -> Result<String> {
        let mut conn = self.connection.lock();
        self.round_trip(&mut conn, text)
    }

    /// Send a typed command and return the cleaned reply, unvalidated
    pub fn send(&self, command: &Command) -> Result<String> {
        let mut conn = self.connection.lock();
        if command.drains_first() {
            conn.drain()?;
        }
        self.round_trip(&mut conn, &command.wire_text())
    }

    // =========================================================================
    // Typed Operations
    // =========================================================================

    /// Read HV output voltage and supply currents
    pub fn read_telemetry(&self) -> Result<Telemetry> {
        let response = self.send(&Command::Telemetry)?;
        Telemetry::parse(&response)
    }

    /// Set the DAC `code` of HV channel `chan`.
    ///
    /// The unit echoes what it applied; any difference from the request is
    /// an error, never a success.
    pub fn set_channel(&self, chan: u32, code: u32) -> Result<()> {
        let response = self.send(&Command::SetChannel { chan, code })?;
        let echo = ChannelEcho::parse(&response)?;

        if !echo.is_echo_of(chan, code) {
            return Err(HvError::EchoMismatch {
                requested: (chan, code),
                echoed: (echo.chan, echo.code),
                response,
            });
        }
        Ok(())
    }

    /// Turn the HV supply off
    pub fn power_off(&self) -> Result<()> {
        self.expect_reply(&Command::PowerOff)
    }

    /// Turn the HV supply on
    pub fn power_on(&self) -> Result<()> {
        self.expect_reply(&Command::PowerOn)
    }

    /// Shut the connection down
    pub fn close(self) -> Result<()> {
        tracing::debug!("Closing connection to {}", self.config.addr());
        self.connection.into_inner().close()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Send, let the unit settle, read. Caller holds the lock.
    fn round_trip(&self, conn: &mut Connection, text: &str) -> Result<String> {
        conn.send_command(text)?;
        if !self.config.settle_delay.is_zero() {
            thread::sleep(self.config.settle_delay);
        }
        conn.read_response()
    }

    /// Run a command whose reply is fixed text
    fn expect_reply(&self, command: &Command) -> Result<()> {
        let response = self.send(command)?;
        if let Some(template) = command.reply_template() {
            Pattern::new(template)?.parse(&response)?;
        }
        Ok(())
    }
}
