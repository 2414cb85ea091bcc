//! Status values published for each monitored side

use std::fmt;
use std::time::{Duration, Instant};

/// Which database of the pair a status belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Primary,
    Replica,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Primary, Side::Replica];

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Primary => "primary",
            Side::Replica => "replica",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health classification of a side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Health {
    /// No cycle has completed yet
    #[default]
    Unknown,
    /// The last probe succeeded
    Healthy,
    /// The last probe failed to connect or query
    Unreachable,
}

impl Health {
    /// Indicator colour for status lamps
    pub fn indicator(&self) -> &'static str {
        match self {
            Health::Unknown => "gray",
            Health::Healthy => "green",
            Health::Unreachable => "red",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Health::Unknown => "unknown",
            Health::Healthy => "healthy",
            Health::Unreachable => "unreachable",
        }
    }
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Replica-only facts gathered by a successful cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplicaDetail {
    /// Whether the replica is still replaying (not promoted)
    pub in_recovery: bool,
    /// Delay since the last replayed transaction, if the replica reported one
    pub lag: Option<Duration>,
}

impl ReplicaDetail {
    /// Human-readable rendering used as the status detail
    pub fn describe(&self) -> String {
        let lag = match self.lag {
            Some(lag) => format!("{:.3}s", lag.as_secs_f64()),
            None => "none".to_string(),
        };
        format!("Recovery mode: {}\nReplication delay: {}", self.in_recovery, lag)
    }
}

/// Latest known status of one side
///
/// Never mutated in place: each poll cycle publishes a fresh value.
#[derive(Debug, Clone, PartialEq)]
pub struct SideStatus {
    pub health: Health,
    pub detail: String,
    /// When the cycle that produced this status finished
    pub last_checked: Option<Instant>,
    /// Present only on healthy replica statuses
    pub replica: Option<ReplicaDetail>,
}

impl SideStatus {
    /// Status before the first cycle completes
    pub fn unknown(side: Side) -> Self {
        Self {
            health: Health::Unknown,
            detail: format!("Checking {} status...", side),
            last_checked: None,
            replica: None,
        }
    }

    pub fn healthy(detail: impl Into<String>) -> Self {
        Self {
            health: Health::Healthy,
            detail: detail.into(),
            last_checked: Some(Instant::now()),
            replica: None,
        }
    }

    /// Healthy replica status, with detail rendered from the replica facts
    pub fn healthy_replica(replica: ReplicaDetail) -> Self {
        Self {
            replica: Some(replica),
            ..Self::healthy(replica.describe())
        }
    }

    pub fn unreachable(cause: impl fmt::Display) -> Self {
        Self {
            health: Health::Unreachable,
            detail: format!("Error: {}", cause),
            last_checked: Some(Instant::now()),
            replica: None,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.health == Health::Healthy
    }

    /// Time since the producing cycle finished
    pub fn age(&self) -> Option<Duration> {
        self.last_checked.map(|t| t.elapsed())
    }
}
