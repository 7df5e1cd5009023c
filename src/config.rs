//! Configuration for hvctl
//!
//! Endpoint and timing settings with the unit's factory defaults.

use std::time::Duration;

use crate::error::{HvError, Result};

/// Default address of the HV control unit
pub const DEFAULT_HOST: &str = "172.22.60.202";

/// Default TCP port of the HV control unit
pub const DEFAULT_PORT: u16 = 2217;

/// Default connect timeout, also used as the read-idle threshold
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Default pause between sending a command and reading the reply
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Client configuration
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Endpoint
    // -------------------------------------------------------------------------
    /// Host name or IP address of the unit
    pub host: String,

    /// TCP port of the unit
    pub port: u16,

    // -------------------------------------------------------------------------
    // Timing
    // -------------------------------------------------------------------------
    /// Connect deadline and read/write timeout.
    ///
    /// A read that sees no data for this long ends the reply, so every
    /// round trip costs at least this much.
    pub timeout: Duration,

    /// Sleep after a command is written, before the reply is drained
    pub settle_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// `host:port` string used for resolution and error messages
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Reject settings the socket layer cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(HvError::Config("host must not be empty".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(HvError::Config("timeout must be positive".to_string()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the unit's host name or IP address
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the unit's TCP port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the connect/read-idle timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the post-send settle delay
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.config.settle_delay = delay;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
