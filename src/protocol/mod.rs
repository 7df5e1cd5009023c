//! Protocol Module
//!
//! Defines the command set and reply grammar of the HV control unit.
//!
//! ## Commands
//! - `v`: read telemetry
//! - `c <chan> <code>`: set the DAC code of one channel
//! - `o0` / `o1`: HV supply off / on
//! - anything else: passed through untouched
//!
//! ## Replies
//! ```text
//! v      -> HVPS    0 V,  I(hv)    0 mA, I(+6)   65 mA, I(-6)   41 mA
//! c 1 5  -> chan 1, code 5 <- HV setup
//! o0     -> Turn OFF HV Power supply
//! o1     -> Turn ON HV Power supply
//! ```

mod command;
mod pattern;
mod response;

pub use command::{
    Command, CommandType, POWER_OFF_PATTERN, POWER_ON_PATTERN, SET_CHANNEL_PATTERN,
    TELEMETRY_PATTERN,
};
pub use pattern::{Fields, Pattern};
pub use response::{ChannelEcho, Telemetry};
