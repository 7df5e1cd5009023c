//! Response definitions
//!
//! Typed values decoded from validated replies.

use std::collections::BTreeMap;

use super::command::{SET_CHANNEL_PATTERN, TELEMETRY_PATTERN};
use super::pattern::Pattern;
use crate::error::{HvError, Result};

/// Reading returned by the `v` command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Telemetry {
    /// HV output, volts
    pub voltage: u32,

    /// HV output current, mA
    pub i_hv: u32,

    /// +6 V rail current, mA
    pub i6v_pos: u32,

    /// -6 V rail current, mA
    pub i6v_neg: u32,
}

impl Telemetry {
    /// Key names used by the unit's own tooling
    pub const KEYS: [&'static str; 4] = ["V", "Ihv", "I6V_pos", "I6V_neg"];

    /// Decode a cleaned `v` reply, e.g.
    /// `HVPS    0 V,  I(hv)    0 mA, I(+6)   65 mA, I(-6)   41 mA`
    pub fn parse(response: &str) -> Result<Self> {
        let pattern = Pattern::new(TELEMETRY_PATTERN)?;
        let fields = pattern.parse(response)?;

        Ok(Self {
            voltage: fields.get_u32(0)?,
            i_hv: fields.get_u32(1)?,
            i6v_pos: fields.get_u32(2)?,
            i6v_neg: fields.get_u32(3)?,
        })
    }

    /// Values keyed by [`Telemetry::KEYS`]
    pub fn to_map(&self) -> BTreeMap<&'static str, u32> {
        Self::KEYS
            .into_iter()
            .zip([self.voltage, self.i_hv, self.i6v_pos, self.i6v_neg])
            .collect()
    }
}

/// Channel and code echoed back by `c <chan> <code>`.
///
/// Kept as the digit text the unit sent, so an echo too large for any
/// integer type still compares unequal to the request instead of failing
/// conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelEcho {
    pub chan: String,
    pub code: String,
}

impl ChannelEcho {
    /// Decode a cleaned `c` reply, e.g. `chan 99, code 100 <- HV setup`
    pub fn parse(response: &str) -> Result<Self> {
        let pattern = Pattern::new(SET_CHANNEL_PATTERN)?;
        let fields = pattern.parse(response)?;

        match (fields.get(0), fields.get(1)) {
            (Some(chan), Some(code)) => Ok(Self {
                chan: chan.to_string(),
                code: code.to_string(),
            }),
            _ => Err(HvError::protocol(response, SET_CHANNEL_PATTERN)),
        }
    }

    /// Whether the echo carries exactly the requested values
    pub fn is_echo_of(&self, chan: u32, code: u32) -> bool {
        digits_equal(&self.chan, chan) && digits_equal(&self.code, code)
    }
}

/// Numeric equality of a digit run and a value; leading zeros don't count
fn digits_equal(digits: &str, value: u32) -> bool {
    let significant = digits.trim_start_matches('0');
    let significant = if significant.is_empty() { "0" } else { significant };
    significant == value.to_string()
}
