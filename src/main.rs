//! `gt06sim` binary: parse config, set up logging, run the session
//! driver until Ctrl+C (or exit after one report with `--once`).

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gt06sim::config::{Cli, Config};
use gt06sim::driver::{FixedDelay, SessionDriver};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_cli(Cli::parse())?;
    info!(
        "gt06sim -> {} (imei={}, interval={:?}, start={:.4},{:.4}, {} km/h bearing {})",
        config.endpoint(),
        config.identity,
        config.interval,
        config.start.latitude,
        config.start.longitude,
        config.speed_kmh,
        config.bearing_deg,
    );
    if config.once {
        info!("single run: login + one report");
    } else {
        info!("press Ctrl+C to stop");
    }

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, shutting down");
            signal_cancel.cancel();
        }
    });

    let retry = FixedDelay::new(config.retry_delay);
    let mut driver = SessionDriver::new(&config, cancel);
    driver.run(&retry).await?;
    Ok(())
}
