//! Health state for the monitored primary and replica
//!
//! This module provides:
//! - The per-side status value replaced after every poll cycle
//! - A publisher holding the latest status of each side for consumers

mod publisher;
mod state;

pub use publisher::StatusPublisher;
pub use state::{Health, ReplicaDetail, Side, SideStatus};
