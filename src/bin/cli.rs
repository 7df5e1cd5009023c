//! hvctl CLI
//!
//! Sends its arguments to the HV control unit as one command and prints
//! the cleaned reply.

use std::process;
use std::time::Duration;

use clap::Parser;
use hvctl::config::{DEFAULT_HOST, DEFAULT_PORT};
use hvctl::{Config, HvClient};
use tracing_subscriber::{fmt, EnvFilter};

/// hvctl CLI
#[derive(Parser, Debug)]
#[command(name = "hvctl")]
#[command(about = "Send a command to the FSC HV control unit")]
#[command(version)]
struct Args {
    /// Unit host name or IP address
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    /// Unit TCP port
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Connect timeout and read-idle threshold, seconds
    #[arg(short, long, default_value = "1.0")]
    timeout: f64,

    /// Pause between sending and reading, seconds
    #[arg(short, long, default_value = "1.0")]
    settle: f64,

    /// Command words, joined with single spaces
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

fn main() {
    // Logs go to stderr; stdout carries only the reply
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,hvctl=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let timeout = seconds(args.timeout, "--timeout");
    let settle = seconds(args.settle, "--settle");

    let config = Config::builder()
        .host(&args.host)
        .port(args.port)
        .timeout(timeout)
        .settle_delay(settle)
        .build();

    let client = match HvClient::connect(config) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to connect: {}", e);
            process::exit(1);
        }
    };

    let command = args.command.join(" ");
    match client.execute(&command) {
        Ok(response) => println!("{}", response),
        Err(e) => {
            tracing::error!("Command {:?} failed: {}", command, e);
            process::exit(1);
        }
    }

    if let Err(e) = client.close() {
        tracing::warn!("Error closing connection: {}", e);
    }
}

/// Parse a non-negative seconds value or exit
fn seconds(value: f64, flag: &str) -> Duration {
    match Duration::try_from_secs_f64(value) {
        Ok(d) => d,
        Err(e) => {
            tracing::error!("Invalid {} value {}: {}", flag, value, e);
            process::exit(2);
        }
    }
}
