//! Session driver: connect, login, then the report loop.
//!
//! Strictly sequential, one logical thread of control:
//! connect → send login → loop { sleep, advance position, send report }.
//! Any transport failure abandons the connection and the whole session
//! restarts through the [`RetryPolicy`]; the simulated position carries
//! over, it is never reset to the start point.

use chrono::Utc;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use std::time::Duration;

use crate::config::Config;
use crate::error::{Result, SimulatorError};
use crate::motion::{self, Position};
use crate::protocol::frame;

/// Decides how the session loop reacts to a transport failure.
///
/// The production policy is a fixed delay with unbounded retries, exactly
/// like the original tool. The seam exists so tests can inject zero-delay
/// or bounded variants instead of waiting out real reconnect delays.
#[async_trait::async_trait]
pub trait RetryPolicy: Send + Sync {
    /// Called after the `failures`-th consecutive session failure.
    /// Sleeps out whatever delay the policy wants, then returns `true`
    /// to reconnect or `false` to give up.
    async fn wait(&self, failures: u32) -> bool;
}

/// Fixed delay between reconnects, no backoff, no retry cap.
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait::async_trait]
impl RetryPolicy for FixedDelay {
    async fn wait(&self, failures: u32) -> bool {
        debug!("retry {failures}: sleeping {:?} before reconnect", self.delay);
        sleep(self.delay).await;
        true
    }
}

/// How a session ended without a transport error.
enum SessionEnd {
    /// `--once` mode finished its single report.
    Once,
    /// The cancellation token fired.
    Cancelled,
}

/// Drives one simulated device against one server.
pub struct SessionDriver<'a> {
    config: &'a Config,
    position: Position,
    cancel: CancellationToken,
}

impl<'a> SessionDriver<'a> {
    pub fn new(config: &'a Config, cancel: CancellationToken) -> Self {
        Self { config, position: config.start, cancel }
    }

    /// Current simulated position (persists across reconnects).
    pub fn position(&self) -> Position {
        self.position
    }

    /// Run sessions until cancelled, or until the retry policy gives up,
    /// or (in `--once` mode) after login plus exactly one report.
    pub async fn run(&mut self, retry: &dyn RetryPolicy) -> Result<()> {
        let mut failures = 0u32;
        loop {
            if self.cancel.is_cancelled() {
                return Ok(());
            }
            match self.run_session().await {
                Ok(SessionEnd::Once) => {
                    info!("single run complete");
                    return Ok(());
                }
                Ok(SessionEnd::Cancelled) => {
                    info!("stopped");
                    return Ok(());
                }
                Err(err) if err.is_retryable() => {
                    failures += 1;
                    warn!("session failed (attempt {failures}): {err}");
                    let keep_going = tokio::select! {
                        _ = self.cancel.cancelled() => return Ok(()),
                        keep_going = retry.wait(failures) => keep_going,
                    };
                    if !keep_going {
                        warn!("retry policy gave up after {failures} failures");
                        return Err(err);
                    }
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// One session: connect, login, report until cancelled or the
    /// transport fails. Every failure discards the whole connection;
    /// there is no partial-write recovery.
    async fn run_session(&mut self) -> Result<SessionEnd> {
        let mut stream = self.connect().await?;

        let login = frame::encode_login(&self.config.identity)?;
        Self::send(&mut stream, &login, "login").await?;
        info!("login sent ({} bytes) for {}", login.len(), self.config.identity);

        // First report goes out immediately after login, from the
        // current position; the interval only paces subsequent reports.
        self.send_report(&mut stream).await?;
        if self.config.once {
            return Ok(SessionEnd::Once);
        }

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return Ok(SessionEnd::Cancelled),
                _ = sleep(self.config.interval) => {}
            }
            let step_km = motion::distance_for(self.config.speed_kmh, self.config.interval);
            self.position = motion::advance(self.position, step_km, self.config.bearing_deg);
            self.send_report(&mut stream).await?;
        }
    }

    async fn connect(&self) -> Result<TcpStream> {
        let endpoint = self.config.endpoint();
        debug!("connecting to {endpoint}");
        let stream = timeout(self.config.connect_timeout, TcpStream::connect(&endpoint))
            .await
            .map_err(|_| SimulatorError::Timeout { duration: self.config.connect_timeout })?
            .map_err(|e| SimulatorError::connection_failed_with_source(&endpoint, e))?;
        info!("connected to {endpoint}");
        Ok(stream)
    }

    async fn send_report(&mut self, stream: &mut TcpStream) -> Result<()> {
        let now = Utc::now();
        let report = frame::encode_report(
            self.position.latitude,
            self.position.longitude,
            self.config.speed_kmh,
            &now,
        )?;
        Self::send(stream, &report, "report").await?;
        info!(
            "report sent ({} bytes) at {:.6},{:.6}",
            report.len(),
            self.position.latitude,
            self.position.longitude
        );
        Ok(())
    }

    async fn send(stream: &mut TcpStream, bytes: &[u8], what: &str) -> Result<()> {
        stream.write_all(bytes).await.map_err(|e| SimulatorError::io(format!("send {what}"), e))
    }
}
