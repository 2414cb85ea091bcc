//! Composition root for the monitoring core

mod manager;

pub use manager::{MonitorCore, MonitorError};
