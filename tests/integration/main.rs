//! Integration test entry point
//!
//! Run with: LAGWATCH_RUN_INTEGRATION_TESTS=1 cargo test --test integration
//!
//! Requires a running streaming replication pair. Environment variables:
//! - LAGWATCH_RUN_INTEGRATION_TESTS: Set to "1" to enable integration tests
//! - LAGWATCH_TEST_PRIMARY_HOST / _PORT: Primary address (default: 127.0.0.1:5432)
//! - LAGWATCH_TEST_REPLICA_HOST / _PORT: Replica address (default: 127.0.0.1:5433)
//! - LAGWATCH_TEST_USER / LAGWATCH_TEST_PASS: Credentials (default: postgres / postgres)

mod monitor;
mod probe;

use std::env;

use lagwatch::config::{EndpointConfig, MonitorConfig};

/// Check if integration tests should run
pub fn should_run_integration_tests() -> bool {
    env::var("LAGWATCH_RUN_INTEGRATION_TESTS")
        .map(|v| v == "1")
        .unwrap_or(false)
}

/// Skip test if integration tests are not enabled
#[macro_export]
macro_rules! skip_if_not_enabled {
    () => {
        if !crate::should_run_integration_tests() {
            eprintln!("Skipping integration test (set LAGWATCH_RUN_INTEGRATION_TESTS=1 to run)");
            return;
        }
    };
}

fn endpoint(prefix: &str, default_port: u16) -> EndpointConfig {
    EndpointConfig {
        host: env::var(format!("LAGWATCH_TEST_{}_HOST", prefix))
            .unwrap_or_else(|_| "127.0.0.1".to_string()),
        port: env::var(format!("LAGWATCH_TEST_{}_PORT", prefix))
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(default_port),
        user: env::var("LAGWATCH_TEST_USER").unwrap_or_else(|_| "postgres".to_string()),
        password: env::var("LAGWATCH_TEST_PASS").unwrap_or_else(|_| "postgres".to_string()),
        database: "postgres".to_string(),
        label: None,
    }
}

/// Primary connection config from environment
pub fn primary_config() -> EndpointConfig {
    endpoint("PRIMARY", 5432)
}

/// Replica connection config from environment
pub fn replica_config() -> EndpointConfig {
    endpoint("REPLICA", 5433)
}

/// An endpoint nothing listens on
pub fn dead_config() -> EndpointConfig {
    EndpointConfig {
        host: "127.0.0.1".to_string(),
        port: 1,
        ..primary_config()
    }
}

/// Fast cadence for tests
pub fn fast_monitor_config() -> MonitorConfig {
    MonitorConfig {
        poll_interval_ms: 100,
        probe_timeout_ms: 2000,
        ..MonitorConfig::default()
    }
}
