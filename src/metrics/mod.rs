//! Prometheus metrics for the replication monitor
//!
//! Exposes metrics via HTTP endpoint for Prometheus scraping.

use prometheus::{
    Gauge, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry,
};
use std::sync::OnceLock;

use crate::health::{Health, Side};

/// Global metrics registry
static METRICS: OnceLock<Metrics> = OnceLock::new();

/// Get the global metrics instance
pub fn metrics() -> &'static Metrics {
    METRICS.get_or_init(Metrics::new)
}

/// Monitor metrics collection
pub struct Metrics {
    /// Registry for all metrics
    pub registry: Registry,

    // Poll metrics
    /// Completed poll cycles by side and outcome
    pub poll_cycles_total: IntCounterVec,
    /// Probe latency histogram (in seconds)
    pub probe_duration_seconds: HistogramVec,
    /// 1 when the side's last cycle was healthy, 0 otherwise
    pub side_up: IntGaugeVec,

    // Lag metrics
    /// Last recorded replica lag
    pub replica_lag_seconds: Gauge,
    /// Samples currently held in the trend buffer
    pub samples_buffered: IntGauge,
}

impl Metrics {
    /// Create a new metrics collection
    pub fn new() -> Self {
        let registry = Registry::new();

        let poll_cycles_total = IntCounterVec::new(
            Opts::new("lagwatch_poll_cycles_total", "Total number of completed poll cycles"),
            &["side", "outcome"], // outcome: healthy, unreachable
        )
        .unwrap();

        let probe_duration_seconds = HistogramVec::new(
            HistogramOpts::new("lagwatch_probe_duration_seconds", "Probe latency in seconds")
                .buckets(vec![
                    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
                ]),
            &["side"],
        )
        .unwrap();

        let side_up = IntGaugeVec::new(
            Opts::new("lagwatch_side_up", "Whether the last probe of a side succeeded"),
            &["side"],
        )
        .unwrap();

        let replica_lag_seconds = Gauge::new(
            "lagwatch_replica_lag_seconds",
            "Replication delay of the last recorded sample",
        )
        .unwrap();

        let samples_buffered = IntGauge::new(
            "lagwatch_samples_buffered",
            "Number of lag samples held in the trend buffer",
        )
        .unwrap();

        registry
            .register(Box::new(poll_cycles_total.clone()))
            .unwrap();
        registry
            .register(Box::new(probe_duration_seconds.clone()))
            .unwrap();
        registry.register(Box::new(side_up.clone())).unwrap();
        registry
            .register(Box::new(replica_lag_seconds.clone()))
            .unwrap();
        registry
            .register(Box::new(samples_buffered.clone()))
            .unwrap();

        Self {
            registry,
            poll_cycles_total,
            probe_duration_seconds,
            side_up,
            replica_lag_seconds,
            samples_buffered,
        }
    }

    /// Record a finished poll cycle
    pub fn record_cycle(&self, side: Side, health: Health, duration_secs: f64) {
        self.poll_cycles_total
            .with_label_values(&[side.as_str(), health.as_str()])
            .inc();
        self.probe_duration_seconds
            .with_label_values(&[side.as_str()])
            .observe(duration_secs);
        self.side_up
            .with_label_values(&[side.as_str()])
            .set(i64::from(health == Health::Healthy));
    }

    /// Record an appended lag sample
    pub fn record_sample(&self, lag_seconds: f64, buffered: usize) {
        self.replica_lag_seconds.set(lag_seconds);
        self.samples_buffered.set(buffered as i64);
    }

    /// Get metrics as Prometheus text format
    pub fn gather(&self) -> String {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Start the metrics HTTP server
pub async fn start_metrics_server(addr: &str) -> anyhow::Result<()> {
    use http_body_util::Full;
    use hyper::body::Bytes;
    use hyper::server::conn::http1;
    use hyper::service::service_fn;
    use hyper::{Request, Response, StatusCode};
    use hyper_util::rt::TokioIo;
    use std::convert::Infallible;
    use std::net::SocketAddr;
    use tokio::net::TcpListener;
    use tracing::{error, info};

    async fn handle_request(
        req: Request<hyper::body::Incoming>,
    ) -> Result<Response<Full<Bytes>>, Infallible> {
        let (status, body) = match req.uri().path() {
            "/metrics" => (StatusCode::OK, metrics().gather()),
            "/health" => (StatusCode::OK, "OK".to_string()),
            _ => (StatusCode::NOT_FOUND, "Not Found".to_string()),
        };
        let mut response = Response::new(Full::new(Bytes::from(body)));
        *response.status_mut() = status;
        if status == StatusCode::OK {
            response.headers_mut().insert(
                hyper::header::CONTENT_TYPE,
                hyper::header::HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
            );
        }
        Ok(response)
    }

    let addr: SocketAddr = addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Metrics server listening");

    loop {
        let (stream, _) = listener.accept().await?;
        let io = TokioIo::new(stream);

        tokio::spawn(async move {
            if let Err(e) = http1::Builder::new()
                .serve_connection(io, service_fn(handle_request))
                .await
            {
                error!(error = %e, "Metrics server connection error");
            }
        });
    }
}
