//! Database probe seam
//!
//! Pollers talk to the monitored databases only through [`Connector`] and
//! [`Session`]. Each cycle opens a fresh session, runs its queries and
//! closes it again; sessions are never pooled or shared.

pub mod postgres;
#[cfg(test)]
pub(crate) mod testing;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

/// Error during a probe
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProbeError {
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("query failed: {0}")]
    Query(String),
    #[error("probe timed out after {0:?}")]
    Timeout(Duration),
}

/// One streaming replica as seen from the primary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicationPeer {
    pub application_name: String,
    pub client_addr: Option<String>,
    pub state: Option<String>,
    pub sync_state: Option<String>,
}

impl fmt::Display for ReplicationPeer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = if self.application_name.is_empty() {
            "<unnamed>"
        } else {
            &self.application_name
        };
        write!(
            f,
            "{} ({}) state={} sync={}",
            name,
            self.client_addr.as_deref().unwrap_or("local"),
            self.state.as_deref().unwrap_or("unknown"),
            self.sync_state.as_deref().unwrap_or("unknown"),
        )
    }
}

/// Render the primary's peer view as status detail text
pub fn describe_peers(peers: &[ReplicationPeer]) -> String {
    let mut out = format!("Replication peers: {}", peers.len());
    for peer in peers {
        out.push_str("\n- ");
        out.push_str(&peer.to_string());
    }
    out
}

/// Opens sessions against one monitored endpoint
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Session: Session;

    /// Open a new session
    async fn connect(&self) -> Result<Self::Session, ProbeError>;

    /// Name used in logs
    fn endpoint(&self) -> String;
}

/// An open connection able to run the monitoring queries
#[async_trait]
pub trait Session: Send + Sized {
    /// Streaming replicas attached to this instance (primary side)
    async fn replication_peers(&mut self) -> Result<Vec<ReplicationPeer>, ProbeError>;

    /// Whether the instance is replaying another instance's WAL (replica side)
    async fn is_in_recovery(&mut self) -> Result<bool, ProbeError>;

    /// Delay between now and the last replayed transaction (replica side)
    ///
    /// `None` when the instance has nothing to report, e.g. it never replayed.
    async fn replay_lag(&mut self) -> Result<Option<Duration>, ProbeError>;

    /// Close the session
    async fn close(self) -> Result<(), ProbeError>;
}

/// Convert a lag in seconds reported by the server into a duration
///
/// Negative values (replica clock ahead of the primary) collapse to zero;
/// NaN and infinities count as no value.
pub fn lag_from_seconds(seconds: Option<f64>) -> Option<Duration> {
    seconds
        .filter(|s| s.is_finite())
        .and_then(|s| Duration::try_from_secs_f64(s.max(0.0)).ok())
}
