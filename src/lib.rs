//! Synthetic GT06 traffic generator.
//!
//! `gt06sim` exercises a GPS-tracker server's protocol parser under
//! controlled, deterministic conditions: it opens a TCP connection,
//! sends a device-login frame, then periodically sends location reports
//! simulating a device moving at constant speed and bearing from a
//! configurable start point.
//!
//! # Layout
//!
//! - [`protocol`]: the GT06 frame codec (encode only, pure functions)
//! - [`motion`]: flat-earth dead reckoning
//! - [`config`]: immutable runtime configuration from CLI/env
//! - [`driver`]: the connect/login/report session loop
//!
//! # Example
//!
//! ```rust,no_run
//! use gt06sim::config::{Cli, Config};
//! use gt06sim::driver::{FixedDelay, SessionDriver};
//! use clap::Parser;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_cli(Cli::parse())?;
//!     let retry = FixedDelay::new(config.retry_delay);
//!     let mut driver = SessionDriver::new(&config, CancellationToken::new());
//!     driver.run(&retry).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod driver;
mod error;
pub mod motion;
pub mod protocol;

pub use config::{Cli, Config};
pub use driver::{FixedDelay, RetryPolicy, SessionDriver};
pub use error::{Result, SimulatorError};
pub use motion::Position;
pub use protocol::Identity;
