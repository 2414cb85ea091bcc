//! Health and replication lag monitor for a PostgreSQL primary/replica pair
//!
//! Two pollers probe the primary and the replica independently. The replica
//! poller records lag samples into a bounded series. Consumers pull the
//! current status of each side and the series through [`MonitorCore`].

pub mod config;
pub mod health;
pub mod metrics;
pub mod monitor;
pub mod poller;
pub mod probe;
pub mod samples;

pub use health::{Health, ReplicaDetail, Side, SideStatus};
pub use monitor::{MonitorCore, MonitorError};
pub use samples::{LagPoint, Sample};
