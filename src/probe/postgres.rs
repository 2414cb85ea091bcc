//! PostgreSQL implementation of the probe seam
//!
//! Uses a single `sqlx` connection per cycle. The queries:
//! - primary: `pg_stat_replication`
//! - replica: `pg_is_in_recovery()` and the age of `pg_last_xact_replay_timestamp()`

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use tracing::debug;

use crate::config::EndpointConfig;

use super::{lag_from_seconds, Connector, ProbeError, ReplicationPeer, Session};

const REPLICATION_PEERS_SQL: &str = "SELECT application_name, host(client_addr), state, sync_state \
     FROM pg_stat_replication ORDER BY application_name";

const IN_RECOVERY_SQL: &str = "SELECT pg_is_in_recovery()";

const REPLAY_LAG_SQL: &str =
    "SELECT EXTRACT(EPOCH FROM (now() - pg_last_xact_replay_timestamp()))::float8";

/// Application name reported to the server in `pg_stat_activity`
const APPLICATION_NAME: &str = "lagwatch";

type PeerRow = (Option<String>, Option<String>, Option<String>, Option<String>);

/// Connects to one PostgreSQL endpoint
#[derive(Debug, Clone)]
pub struct PgConnector {
    options: PgConnectOptions,
    name: String,
}

impl PgConnector {
    pub fn new(config: &EndpointConfig) -> Self {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database)
            .application_name(APPLICATION_NAME);

        Self {
            options,
            name: config.display_name(),
        }
    }
}

#[async_trait]
impl Connector for PgConnector {
    type Session = PgSession;

    async fn connect(&self) -> Result<PgSession, ProbeError> {
        debug!(endpoint = %self.name, "Connecting");
        let conn = PgConnection::connect_with(&self.options)
            .await
            .map_err(|e| ProbeError::Connection(e.to_string()))?;
        Ok(PgSession { conn })
    }

    fn endpoint(&self) -> String {
        self.name.clone()
    }
}

/// An open PostgreSQL connection
pub struct PgSession {
    conn: PgConnection,
}

#[async_trait]
impl Session for PgSession {
    async fn replication_peers(&mut self) -> Result<Vec<ReplicationPeer>, ProbeError> {
        let rows: Vec<PeerRow> = sqlx::query_as(REPLICATION_PEERS_SQL)
            .fetch_all(&mut self.conn)
            .await
            .map_err(classify)?;

        Ok(rows
            .into_iter()
            .map(|(application_name, client_addr, state, sync_state)| ReplicationPeer {
                application_name: application_name.unwrap_or_default(),
                client_addr,
                state,
                sync_state,
            })
            .collect())
    }

    async fn is_in_recovery(&mut self) -> Result<bool, ProbeError> {
        sqlx::query_scalar(IN_RECOVERY_SQL)
            .fetch_one(&mut self.conn)
            .await
            .map_err(classify)
    }

    async fn replay_lag(&mut self) -> Result<Option<Duration>, ProbeError> {
        let seconds: Option<f64> = sqlx::query_scalar(REPLAY_LAG_SQL)
            .fetch_one(&mut self.conn)
            .await
            .map_err(classify)?;
        Ok(lag_from_seconds(seconds))
    }

    async fn close(self) -> Result<(), ProbeError> {
        self.conn
            .close()
            .await
            .map_err(|e| ProbeError::Connection(e.to_string()))
    }
}

/// Split driver errors on an open connection into transport and query failures
fn classify(err: sqlx::Error) -> ProbeError {
    match err {
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::Protocol(_) => {
            ProbeError::Connection(err.to_string())
        }
        other => ProbeError::Query(other.to_string()),
    }
}
