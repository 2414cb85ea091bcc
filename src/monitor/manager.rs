//! Owns the sample store, the status publisher and both pollers, and starts
//! and stops the pollers as a unit.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::MonitorConfig;
use crate::health::{Side, SideStatus, StatusPublisher};
use crate::poller::{PollSettings, PrimaryPoller, ReplicaPoller};
use crate::probe::Connector;
use crate::samples::{LagPoint, Sample, SampleStore};

/// Error from the monitor lifecycle
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("Monitor already started")]
    AlreadyStarted,
}

/// Monitors one primary/replica pair
///
/// `start` spawns the two pollers and returns immediately; `stop` lets any
/// in-flight cycle finish, then waits for both pollers to exit. The read API
/// never waits on a poller.
pub struct MonitorCore<C: Connector> {
    samples: Arc<SampleStore>,
    publisher: Arc<StatusPublisher>,
    pollers: Option<(PrimaryPoller<C>, ReplicaPoller<C>)>,
    shutdown: CancellationToken,
    tasks: Vec<(Side, JoinHandle<()>)>,
}

impl<C: Connector> MonitorCore<C> {
    pub fn new(primary: C, replica: C, config: &MonitorConfig) -> Self {
        let samples = Arc::new(SampleStore::with_capacity(config.sample_capacity));
        let publisher = Arc::new(StatusPublisher::new());
        let settings = PollSettings::from(config);

        let primary = PrimaryPoller::new(primary, publisher.clone(), settings);
        let replica = ReplicaPoller::new(replica, publisher.clone(), samples.clone(), settings);

        Self {
            samples,
            publisher,
            pollers: Some((primary, replica)),
            shutdown: CancellationToken::new(),
            tasks: Vec::with_capacity(2),
        }
    }

    /// Spawn both pollers on the current tokio runtime
    pub fn start(&mut self) -> Result<(), MonitorError> {
        let (primary, replica) = self.pollers.take().ok_or(MonitorError::AlreadyStarted)?;

        self.tasks.push((
            Side::Primary,
            tokio::spawn(primary.run(self.shutdown.child_token())),
        ));
        self.tasks.push((
            Side::Replica,
            tokio::spawn(replica.run(self.shutdown.child_token())),
        ));

        info!("Monitor started");
        Ok(())
    }

    /// Signal both pollers and wait for them to exit
    ///
    /// A probe already in flight completes (and publishes) before its poller
    /// exits. Calling `stop` on a monitor that is not running is a no-op.
    pub async fn stop(&mut self) {
        if self.tasks.is_empty() {
            return;
        }
        self.shutdown.cancel();

        for (side, handle) in self.tasks.drain(..) {
            if let Err(e) = handle.await {
                error!(side = %side, error = %e, "Poller task failed");
            }
        }

        info!("Monitor stopped");
    }

    /// Whether pollers are currently spawned
    pub fn is_running(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Latest published status of a side
    pub fn status(&self, side: Side) -> SideStatus {
        self.publisher.get(side)
    }

    /// Change notifications for a side
    pub fn subscribe(&self, side: Side) -> watch::Receiver<SideStatus> {
        self.publisher.subscribe(side)
    }

    /// Point-in-time copy of the lag series, oldest first
    pub fn sample_series(&self) -> Vec<Sample> {
        self.samples.snapshot()
    }

    /// Lag series positioned relative to the newest sample, for plotting
    pub fn lag_points(&self) -> Vec<LagPoint> {
        self.samples.lag_points()
    }

    /// Capacity of the lag series
    pub fn sample_capacity(&self) -> usize {
        self.samples.capacity()
    }
}

impl<C: Connector> Drop for MonitorCore<C> {
    fn drop(&mut self) {
        // Pollers exit after their current cycle
        self.shutdown.cancel();
    }
}
