//! Replica side poller
//!
//! A cycle is healthy only when both the recovery check and the lag query
//! succeed. Healthy cycles append one lag sample; failed cycles append
//! nothing so connection noise never enters the trend series.

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::health::{ReplicaDetail, Side, SideStatus, StatusPublisher};
use crate::metrics::metrics;
use crate::probe::{Connector, ProbeError, Session};
use crate::samples::{Sample, SampleStore};

use super::{bounded, close_session, finish_cycle, run_cycles, PollSettings};

/// Periodically probes the replica, records lag and publishes its status
pub struct ReplicaPoller<C: Connector> {
    connector: C,
    publisher: Arc<StatusPublisher>,
    samples: Arc<SampleStore>,
    settings: PollSettings,
    endpoint: String,
}

impl<C: Connector> ReplicaPoller<C> {
    pub fn new(
        connector: C,
        publisher: Arc<StatusPublisher>,
        samples: Arc<SampleStore>,
        settings: PollSettings,
    ) -> Self {
        let endpoint = connector.endpoint();
        Self {
            connector,
            publisher,
            samples,
            settings,
            endpoint,
        }
    }

    async fn probe(&self) -> Result<ReplicaDetail, ProbeError> {
        let mut session = self.connector.connect().await?;
        let result = Self::query(&mut session).await;
        close_session(Side::Replica, session).await;
        result
    }

    /// Recovery check first, then lag; the second never runs if the first fails
    async fn query(session: &mut C::Session) -> Result<ReplicaDetail, ProbeError> {
        let in_recovery = session.is_in_recovery().await?;
        let lag = session.replay_lag().await?;
        Ok(ReplicaDetail { in_recovery, lag })
    }

    /// Run one cycle, record its sample and publish its outcome
    pub async fn poll_once(&self) -> SideStatus {
        let started = Instant::now();
        let status = match bounded(self.settings.probe_timeout, self.probe()).await {
            Ok(detail) => {
                self.record(detail);
                SideStatus::healthy_replica(detail)
            }
            Err(e) => SideStatus::unreachable(&e),
        };

        finish_cycle(Side::Replica, &self.endpoint, &self.publisher, &status, started);
        status
    }

    fn record(&self, detail: ReplicaDetail) {
        let sample = Sample::from_lag(Instant::now(), detail.lag);
        self.samples.append(sample);
        metrics().record_sample(sample.lag_seconds, self.samples.len());
        trace!(lag_seconds = sample.lag_seconds, in_recovery = detail.in_recovery, "Recorded lag sample");
    }

    /// Poll until cancelled
    pub async fn run(self, cancel: CancellationToken) {
        let this = &self;
        run_cycles(Side::Replica, self.settings.interval, cancel, || this.poll_once()).await;
    }
}
