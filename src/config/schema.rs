use std::time::Duration;

use serde::Deserialize;

use crate::samples::DEFAULT_SAMPLE_CAPACITY;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Writable instance
    pub primary: EndpointConfig,
    /// Streaming replica of the primary
    pub replica: EndpointConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    /// Prometheus endpoint configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            primary: EndpointConfig::local(5432),
            replica: EndpointConfig::local(5433),
            monitor: MonitorConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

// ============================================================================
// Endpoint Configuration
// ============================================================================

/// Connection settings for one monitored PostgreSQL instance
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    /// Hostname or IP
    pub host: String,
    /// Port number
    #[serde(default = "default_port")]
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Database to connect to (any database works for the probes)
    #[serde(default = "default_database")]
    pub database: String,
    /// Display name, defaults to host:port
    #[serde(default)]
    pub label: Option<String>,
}

fn default_port() -> u16 {
    5432
}

fn default_database() -> String {
    "postgres".to_string()
}

impl EndpointConfig {
    fn local(port: u16) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port,
            user: "postgres".to_string(),
            password: String::new(),
            database: default_database(),
            label: None,
        }
    }

    /// Get the address string (host:port)
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Label if configured, otherwise the address
    pub fn display_name(&self) -> String {
        self.label.clone().unwrap_or_else(|| self.addr())
    }
}

// ============================================================================
// Monitor Configuration
// ============================================================================

/// Polling and retention settings
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Delay between the end of one cycle and the start of the next (milliseconds)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Upper bound on a whole probe, connect included (milliseconds, 0 = unbounded)
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    /// Lag samples kept for the trend series
    #[serde(default = "default_sample_capacity")]
    pub sample_capacity: usize,
    /// Console refresh cadence of the binary (milliseconds)
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_probe_timeout_ms() -> u64 {
    10_000
}

fn default_sample_capacity() -> usize {
    DEFAULT_SAMPLE_CAPACITY
}

fn default_refresh_interval_ms() -> u64 {
    1000
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            probe_timeout_ms: default_probe_timeout_ms(),
            sample_capacity: default_sample_capacity(),
            refresh_interval_ms: default_refresh_interval_ms(),
        }
    }
}

impl MonitorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Probe bound, `None` when disabled
    pub fn probe_timeout(&self) -> Option<Duration> {
        (self.probe_timeout_ms > 0).then(|| Duration::from_millis(self.probe_timeout_ms))
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

// ============================================================================
// Metrics Configuration
// ============================================================================

/// Prometheus scrape endpoint served by the binary
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_metrics_listen_addr")]
    pub listen_addr: String,
}

fn default_metrics_listen_addr() -> String {
    "127.0.0.1:9187".to_string()
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: default_metrics_listen_addr(),
        }
    }
}
