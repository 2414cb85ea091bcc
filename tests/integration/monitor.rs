//! Full monitor lifecycle against a live primary/replica pair

use std::time::Duration;

use lagwatch::probe::postgres::PgConnector;
use lagwatch::{Health, MonitorCore, Side};

use crate::{dead_config, fast_monitor_config, primary_config, replica_config, skip_if_not_enabled};

#[tokio::test]
async fn test_monitor_reports_healthy_pair() {
    skip_if_not_enabled!();

    let mut core = MonitorCore::new(
        PgConnector::new(&primary_config()),
        PgConnector::new(&replica_config()),
        &fast_monitor_config(),
    );
    core.start().expect("start");
    tokio::time::sleep(Duration::from_millis(600)).await;
    core.stop().await;

    let primary = core.status(Side::Primary);
    assert_eq!(primary.health, Health::Healthy, "{}", primary.detail);
    assert!(primary.detail.starts_with("Replication peers:"));

    let replica = core.status(Side::Replica);
    assert_eq!(replica.health, Health::Healthy, "{}", replica.detail);
    assert_eq!(replica.replica.map(|r| r.in_recovery), Some(true));

    let series = core.sample_series();
    assert!(!series.is_empty());
    assert!(series.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    assert!(series.iter().all(|s| s.lag_seconds >= 0.0));
}

#[tokio::test]
async fn test_monitor_reports_unreachable_replica() {
    skip_if_not_enabled!();

    let mut core = MonitorCore::new(
        PgConnector::new(&primary_config()),
        PgConnector::new(&dead_config()),
        &fast_monitor_config(),
    );
    core.start().expect("start");
    tokio::time::sleep(Duration::from_millis(600)).await;
    core.stop().await;

    assert_eq!(core.status(Side::Primary).health, Health::Healthy);
    let replica = core.status(Side::Replica);
    assert_eq!(replica.health, Health::Unreachable);
    assert!(replica.detail.starts_with("Error:"));
    assert!(core.sample_series().is_empty());
}
