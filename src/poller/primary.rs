//! Primary side poller
//!
//! Reports the primary as healthy when its replication peer view can be
//! read, and carries that view as the status detail.

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use crate::health::{Side, SideStatus, StatusPublisher};
use crate::probe::{describe_peers, Connector, ProbeError, ReplicationPeer, Session};

use super::{bounded, close_session, finish_cycle, run_cycles, PollSettings};

/// Periodically probes the primary and publishes its status
pub struct PrimaryPoller<C: Connector> {
    connector: C,
    publisher: Arc<StatusPublisher>,
    settings: PollSettings,
    endpoint: String,
}

impl<C: Connector> PrimaryPoller<C> {
    pub fn new(connector: C, publisher: Arc<StatusPublisher>, settings: PollSettings) -> Self {
        let endpoint = connector.endpoint();
        Self {
            connector,
            publisher,
            settings,
            endpoint,
        }
    }

    /// Open, query and close one session
    async fn probe(&self) -> Result<Vec<ReplicationPeer>, ProbeError> {
        let mut session = self.connector.connect().await?;
        let result = session.replication_peers().await;
        close_session(Side::Primary, session).await;
        result
    }

    /// Run one cycle and publish its outcome
    pub async fn poll_once(&self) -> SideStatus {
        let started = Instant::now();
        let status = match bounded(self.settings.probe_timeout, self.probe()).await {
            Ok(peers) => SideStatus::healthy(describe_peers(&peers)),
            Err(e) => SideStatus::unreachable(&e),
        };

        finish_cycle(Side::Primary, &self.endpoint, &self.publisher, &status, started);
        status
    }

    /// Poll until cancelled
    pub async fn run(self, cancel: CancellationToken) {
        let this = &self;
        run_cycles(Side::Primary, self.settings.interval, cancel, || this.poll_once()).await;
    }
}
