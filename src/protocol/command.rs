//! Command definitions
//!
//! Represents requests to the unit and their wire text.

use std::fmt;

/// Reply template for `v`
pub const TELEMETRY_PATTERN: &str = "HVPS{space}{digit} V,  I(hv){space}{digit} mA, \
I(+6){space}{digit} mA, I(-6){space}{digit} mA";

/// Reply template for `c <chan> <code>`
pub const SET_CHANNEL_PATTERN: &str = "chan{space}{digit}, code{space}{digit} <- HV setup";

/// Reply template for `o0`
pub const POWER_OFF_PATTERN: &str = "Turn OFF HV Power supply";

/// Reply template for `o1`
pub const POWER_ON_PATTERN: &str = "Turn ON HV Power supply";

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Raw,
    Telemetry,
    SetChannel,
    PowerOff,
    PowerOn,
}

/// A request to the unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Free-form text, sent as is
    Raw(String),

    /// Read voltage and supply currents
    Telemetry,

    /// Set the DAC code of one HV channel
    SetChannel { chan: u32, code: u32 },

    /// Switch the HV supply off
    PowerOff,

    /// Switch the HV supply on
    PowerOn,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Raw(_) => CommandType::Raw,
            Command::Telemetry => CommandType::Telemetry,
            Command::SetChannel { .. } => CommandType::SetChannel,
            Command::PowerOff => CommandType::PowerOff,
            Command::PowerOn => CommandType::PowerOn,
        }
    }

    /// Text written to the socket, without the terminator
    pub fn wire_text(&self) -> String {
        match self {
            Command::Raw(text) => text.clone(),
            Command::Telemetry => "v".to_string(),
            Command::SetChannel { chan, code } => format!("c {} {}", chan, code),
            Command::PowerOff => "o0".to_string(),
            Command::PowerOn => "o1".to_string(),
        }
    }

    /// Template a valid reply must match, if the command has one
    pub fn reply_template(&self) -> Option<&'static str> {
        match self {
            Command::Raw(_) => None,
            Command::Telemetry => Some(TELEMETRY_PATTERN),
            Command::SetChannel { .. } => Some(SET_CHANNEL_PATTERN),
            Command::PowerOff => Some(POWER_OFF_PATTERN),
            Command::PowerOn => Some(POWER_ON_PATTERN),
        }
    }

    /// Whether stale input must be drained before sending.
    ///
    /// The unit pushes unsolicited text that lands in front of the `v` reply.
    pub fn drains_first(&self) -> bool {
        matches!(self, Command::Telemetry)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.wire_text())
    }
}
