//! Probe queries against a live primary/replica pair

use lagwatch::probe::postgres::PgConnector;
use lagwatch::probe::{Connector, ProbeError, Session};

use crate::{dead_config, primary_config, replica_config, skip_if_not_enabled};

#[tokio::test]
async fn test_primary_lists_replication_peers() {
    skip_if_not_enabled!();

    let connector = PgConnector::new(&primary_config());
    let mut session = connector.connect().await.expect("connect to primary");
    let peers = session.replication_peers().await.expect("query pg_stat_replication");
    session.close().await.expect("close");

    assert!(!peers.is_empty(), "primary should have at least one streaming replica");
}

#[tokio::test]
async fn test_replica_reports_recovery_and_lag() {
    skip_if_not_enabled!();

    let connector = PgConnector::new(&replica_config());
    let mut session = connector.connect().await.expect("connect to replica");
    assert!(session.is_in_recovery().await.expect("pg_is_in_recovery"));
    // A lag value may be absent on a fresh replica, but the query must succeed
    session.replay_lag().await.expect("replay lag");
    session.close().await.expect("close");
}

#[tokio::test]
async fn test_primary_is_not_in_recovery() {
    skip_if_not_enabled!();

    let connector = PgConnector::new(&primary_config());
    let mut session = connector.connect().await.expect("connect to primary");
    assert!(!session.is_in_recovery().await.expect("pg_is_in_recovery"));
    assert_eq!(session.replay_lag().await.expect("replay lag"), None);
    session.close().await.expect("close");
}

#[tokio::test]
async fn test_connect_refused() {
    skip_if_not_enabled!();

    let connector = PgConnector::new(&dead_config());
    match connector.connect().await {
        Err(ProbeError::Connection(reason)) => assert!(!reason.is_empty()),
        Err(other) => panic!("expected connection error, got {other}"),
        Ok(_) => panic!("expected connection error, got a session"),
    }
}
