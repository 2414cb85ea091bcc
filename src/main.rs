use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

use lagwatch::config::{self, Config};
use lagwatch::probe::postgres::PgConnector;
use lagwatch::{metrics, MonitorCore, Side};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    let config = load_or_default_config(std::env::args().nth(1));

    info!(
        primary = %config.primary.display_name(),
        replica = %config.replica.display_name(),
        poll_interval_ms = config.monitor.poll_interval_ms,
        probe_timeout_ms = config.monitor.probe_timeout_ms,
        "Monitoring replication pair"
    );

    if config.metrics.enabled {
        let addr = config.metrics.listen_addr.clone();
        tokio::spawn(async move {
            if let Err(e) = metrics::start_metrics_server(&addr).await {
                error!(error = %e, "Metrics server failed");
            }
        });
    }

    let mut core = MonitorCore::new(
        PgConnector::new(&config.primary),
        PgConnector::new(&config.replica),
        &config.monitor,
    );
    core.start()?;

    let mut refresh = tokio::time::interval(config.monitor.refresh_interval());
    refresh.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    warn!(error = %e, "Failed to listen for shutdown signal");
                }
                info!("Shutting down");
                break;
            }
            _ = refresh.tick() => report(&core),
        }
    }

    core.stop().await;
    Ok(())
}

/// Console view: one line per side plus a summary of the lag series
fn report(core: &MonitorCore<PgConnector>) {
    for side in Side::ALL {
        let status = core.status(side);
        info!(
            side = %side,
            status = %status.health,
            indicator = status.health.indicator(),
            detail = %status.detail.replace('\n', " | "),
            "Side status"
        );
    }

    let series = core.sample_series();
    let latest = series.last().map(|s| s.lag_seconds);
    let max = series.iter().map(|s| s.lag_seconds).reduce(f64::max);
    info!(
        samples = series.len(),
        capacity = core.sample_capacity(),
        latest_lag_seconds = ?latest,
        max_lag_seconds = ?max,
        "Replication delay"
    );
}

fn load_or_default_config(explicit: Option<String>) -> Config {
    let candidates = match explicit {
        Some(path) => vec![path],
        None => vec![
            "config/lagwatch.toml".to_string(),
            "lagwatch.toml".to_string(),
        ],
    };

    for path in &candidates {
        match config::load_config(path) {
            Ok(config) => {
                info!(path = %path, "Loaded configuration");
                return config;
            }
            Err(e) => {
                warn!(path = %path, error = %e, "Failed to load config");
            }
        }
    }

    info!("Using default configuration");
    Config::default()
}
