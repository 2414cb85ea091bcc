//! Bounded time series of replica lag observations
//!
//! The replica poller is the only writer; consumers read point-in-time
//! copies for plotting.

mod store;

pub use store::{LagPoint, Sample, SampleStore, DEFAULT_SAMPLE_CAPACITY};
