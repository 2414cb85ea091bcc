//! Poll loops for the primary and the replica
//!
//! Each poller runs one cycle at a time: probe, publish, then sleep for the
//! poll interval. Cancellation is only observed between cycles, so a probe
//! that has started always completes and closes its connection.

mod primary;
mod replica;

pub use primary::PrimaryPoller;
pub use replica::ReplicaPoller;

use std::future::Future;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::MonitorConfig;
use crate::health::{Health, Side, SideStatus, StatusPublisher};
use crate::metrics::metrics;
use crate::probe::{ProbeError, Session};

/// Cadence and probe bound shared by both pollers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Delay between the end of a cycle and the start of the next
    pub interval: Duration,
    /// Upper bound on a whole probe, `None` for unbounded
    pub probe_timeout: Option<Duration>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self::from(&MonitorConfig::default())
    }
}

impl From<&MonitorConfig> for PollSettings {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            interval: config.poll_interval(),
            probe_timeout: config.probe_timeout(),
        }
    }
}

/// Run `cycle` until `cancel` fires, sleeping `interval` after each cycle
async fn run_cycles<F, Fut>(side: Side, interval: Duration, cancel: CancellationToken, mut cycle: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = SideStatus>,
{
    info!(side = %side, interval_ms = interval.as_millis() as u64, "Poller started");

    while !cancel.is_cancelled() {
        cycle().await;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    info!(side = %side, "Poller stopped");
}

/// Apply the optional probe bound
async fn bounded<T, Fut>(limit: Option<Duration>, probe: Fut) -> Result<T, ProbeError>
where
    Fut: Future<Output = Result<T, ProbeError>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, probe)
            .await
            .unwrap_or(Err(ProbeError::Timeout(limit))),
        None => probe.await,
    }
}

/// Close a session, logging rather than failing the cycle
async fn close_session<S: Session>(side: Side, session: S) {
    if let Err(e) = session.close().await {
        debug!(side = %side, error = %e, "Failed to close session cleanly");
    }
}

/// Publish a cycle's status, record metrics and log transitions
fn finish_cycle(
    side: Side,
    endpoint: &str,
    publisher: &StatusPublisher,
    status: &SideStatus,
    started: Instant,
) {
    let elapsed = started.elapsed();
    metrics().record_cycle(side, status.health, elapsed.as_secs_f64());

    let previous = publisher.publish(side, status.clone());
    if previous.health == status.health {
        debug!(side = %side, endpoint = %endpoint, status = %status.health, "Poll cycle finished");
        return;
    }

    match status.health {
        Health::Unreachable => warn!(
            side = %side,
            endpoint = %endpoint,
            error = %status.detail,
            "Side status changed"
        ),
        _ => info!(
            side = %side,
            endpoint = %endpoint,
            status = %status.health,
            probe_ms = elapsed.as_millis() as u64,
            "Side status changed"
        ),
    }
}
