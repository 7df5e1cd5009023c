//! # hvctl
//!
//! Client for the FSC HV control unit (64-channel high-voltage power supply)
//! with:
//! - Persistent TCP connection, one command in flight
//! - Idle-timeout reply framing with cleanup of firmware litter
//! - Typed telemetry, channel setup and power switching with reply validation
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        HvClient                              │
//! │     execute / read_telemetry / set_channel / power_on|off    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  Protocol   │          │ Transport   │
//!   │ (patterns)  │          │  (Mutex)    │
//!   └─────────────┘          └──────┬──────┘
//!                                   │
//!                                   ▼
//!                           ┌─────────────┐
//!                           │  TcpStream  │
//!                           │  (CR LF)    │
//!                           └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use hvctl::{Config, HvClient};
//!
//! let client = HvClient::connect(Config::builder().host("172.22.60.202").build())?;
//! let telemetry = client.read_telemetry()?;
//! println!("{} V, {} mA", telemetry.voltage, telemetry.i_hv);
//! client.set_channel(3, 1200)?;
//! # Ok::<(), hvctl::HvError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod transport;
pub mod protocol;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{HvError, Result};
pub use config::Config;
pub use client::HvClient;
pub use protocol::Telemetry;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of hvctl
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
