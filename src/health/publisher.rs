//! Latest-status holder shared between pollers and consumers

use tokio::sync::watch;

use super::state::{Side, SideStatus};

/// Holds the most recently published status of each side
///
/// Backed by one watch channel per side: publishing replaces the value
/// without waiting on readers, and readers clone the current value without
/// waiting on the publisher's next cycle.
#[derive(Debug)]
pub struct StatusPublisher {
    primary: watch::Sender<SideStatus>,
    replica: watch::Sender<SideStatus>,
}

impl Default for StatusPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusPublisher {
    /// Create a publisher with both sides in the `Unknown` state
    pub fn new() -> Self {
        let (primary, _) = watch::channel(SideStatus::unknown(Side::Primary));
        let (replica, _) = watch::channel(SideStatus::unknown(Side::Replica));
        Self { primary, replica }
    }

    fn sender(&self, side: Side) -> &watch::Sender<SideStatus> {
        match side {
            Side::Primary => &self.primary,
            Side::Replica => &self.replica,
        }
    }

    /// Replace the status of a side
    ///
    /// Returns the status it replaced.
    pub fn publish(&self, side: Side, status: SideStatus) -> SideStatus {
        self.sender(side).send_replace(status)
    }

    /// Current status of a side
    pub fn get(&self, side: Side) -> SideStatus {
        self.sender(side).borrow().clone()
    }

    /// Receiver notified whenever the side publishes a new status
    pub fn subscribe(&self, side: Side) -> watch::Receiver<SideStatus> {
        self.sender(side).subscribe()
    }
}
