//! Process configuration.
//!
//! One immutable [`Config`] is built at startup from CLI arguments and
//! environment variables and handed to the driver by reference; there is
//! no process-wide mutable state. Every knob has a default matching the
//! original simulator, so `gt06sim` with no arguments talks to
//! `127.0.0.1:5051`.

use std::time::Duration;

use clap::Parser;

use crate::error::{Result, SimulatorError};
use crate::motion::Position;
use crate::protocol::Identity;

/// Command-line interface. Host and port stay positional for parity with
/// the original tool (`gt06sim [HOST] [PORT]`); everything else is a flag
/// with an environment-variable fallback.
#[derive(Parser, Debug)]
#[command(name = "gt06sim", version, about = "Synthetic GT06 GPS-tracker traffic generator")]
pub struct Cli {
    /// Server host
    #[arg(value_name = "HOST", env = "GT06_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Server port
    #[arg(value_name = "PORT", env = "GT06_PORT", default_value_t = 5051)]
    pub port: u16,

    /// 15-digit device identity (IMEI)
    #[arg(long, env = "GT06_IMEI", default_value = "123456789012345")]
    pub imei: String,

    /// Seconds between location reports
    #[arg(long, env = "GT06_INTERVAL", default_value_t = 10)]
    pub interval: u64,

    /// Start latitude in decimal degrees
    #[arg(long, env = "GT06_LAT", default_value_t = 12.9716)]
    pub lat: f64,

    /// Start longitude in decimal degrees
    #[arg(long, env = "GT06_LON", default_value_t = 77.5946)]
    pub lon: f64,

    /// Simulated speed in km/h
    #[arg(long, env = "GT06_SPEED", default_value_t = 25.0)]
    pub speed: f64,

    /// Bearing in degrees (0 = north, 90 = east)
    #[arg(long, env = "GT06_BEARING", default_value_t = 0.0)]
    pub bearing: f64,

    /// Send login plus exactly one report, then exit
    #[arg(long, short = '1')]
    pub once: bool,
}

/// Immutable runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub identity: Identity,
    pub interval: Duration,
    pub start: Position,
    pub speed_kmh: f64,
    pub bearing_deg: f64,
    pub once: bool,
    /// Timeout on each connection attempt.
    pub connect_timeout: Duration,
    /// Fixed delay between reconnect attempts.
    pub retry_delay: Duration,
}

impl Config {
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
    pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

    /// Validate parsed CLI arguments into a runtime configuration.
    ///
    /// The only validation clap cannot do itself is the identity check;
    /// a malformed identity is fatal here, at startup, rather than at
    /// encode time inside the loop.
    pub fn from_cli(cli: Cli) -> Result<Self> {
        if cli.host.is_empty() {
            return Err(SimulatorError::config("host must not be empty"));
        }
        let identity = Identity::new(cli.imei)?;
        Ok(Config {
            host: cli.host,
            port: cli.port,
            identity,
            interval: Duration::from_secs(cli.interval),
            start: Position::new(cli.lat, cli.lon),
            speed_kmh: cli.speed,
            bearing_deg: cli.bearing,
            once: cli.once,
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
            retry_delay: Self::DEFAULT_RETRY_DELAY,
        })
    }

    /// `host:port` form used for `TcpStream::connect` and log lines.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
