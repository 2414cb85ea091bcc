//! Scripted connector for poller and monitor tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use super::{Connector, ProbeError, ReplicationPeer, Session};

/// What one cycle's session will report
#[derive(Debug, Clone)]
pub(crate) enum Outcome {
    ConnectFails(String),
    Peers(Result<Vec<ReplicationPeer>, String>),
    Replica {
        in_recovery: Result<bool, String>,
        lag: Result<Option<Duration>, String>,
    },
}

impl Outcome {
    pub(crate) fn replica_lag(lag: Option<Duration>) -> Self {
        Outcome::Replica {
            in_recovery: Ok(true),
            lag: Ok(lag),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub connects: AtomicUsize,
    pub queries: AtomicUsize,
    pub closes: AtomicUsize,
}

/// Replays queued outcomes, then repeats the fallback forever
#[derive(Clone)]
pub(crate) struct ScriptedConnector {
    queue: Arc<Mutex<VecDeque<Outcome>>>,
    fallback: Outcome,
    query_delay: Duration,
    pub counters: Arc<Counters>,
    /// Signalled when a query starts
    pub query_started: Arc<Notify>,
}

impl ScriptedConnector {
    pub(crate) fn new(fallback: Outcome) -> Self {
        Self {
            queue: Arc::new(Mutex::new(VecDeque::new())),
            fallback,
            query_delay: Duration::ZERO,
            counters: Arc::new(Counters::default()),
            query_started: Arc::new(Notify::new()),
        }
    }

    pub(crate) fn with_script(fallback: Outcome, script: Vec<Outcome>) -> Self {
        let connector = Self::new(fallback);
        connector.queue.lock().extend(script);
        connector
    }

    pub(crate) fn with_query_delay(mut self, delay: Duration) -> Self {
        self.query_delay = delay;
        self
    }

    pub(crate) fn connects(&self) -> usize {
        self.counters.connects.load(Ordering::SeqCst)
    }

    pub(crate) fn closes(&self) -> usize {
        self.counters.closes.load(Ordering::SeqCst)
    }

    pub(crate) fn queries(&self) -> usize {
        self.counters.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    type Session = ScriptedSession;

    async fn connect(&self) -> Result<ScriptedSession, ProbeError> {
        self.counters.connects.fetch_add(1, Ordering::SeqCst);
        let outcome = self
            .queue
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        if let Outcome::ConnectFails(reason) = outcome {
            return Err(ProbeError::Connection(reason));
        }

        Ok(ScriptedSession {
            outcome,
            query_delay: self.query_delay,
            counters: self.counters.clone(),
            query_started: self.query_started.clone(),
        })
    }

    fn endpoint(&self) -> String {
        "scripted:5432".to_string()
    }
}

pub(crate) struct ScriptedSession {
    outcome: Outcome,
    query_delay: Duration,
    counters: Arc<Counters>,
    query_started: Arc<Notify>,
}

impl ScriptedSession {
    async fn begin_query(&self) {
        self.counters.queries.fetch_add(1, Ordering::SeqCst);
        self.query_started.notify_one();
        if !self.query_delay.is_zero() {
            tokio::time::sleep(self.query_delay).await;
        }
    }
}

fn unexpected() -> ProbeError {
    ProbeError::Query("unexpected query for scripted outcome".to_string())
}

#[async_trait]
impl Session for ScriptedSession {
    async fn replication_peers(&mut self) -> Result<Vec<ReplicationPeer>, ProbeError> {
        self.begin_query().await;
        match &self.outcome {
            Outcome::Peers(result) => result.clone().map_err(ProbeError::Query),
            _ => Err(unexpected()),
        }
    }

    async fn is_in_recovery(&mut self) -> Result<bool, ProbeError> {
        self.begin_query().await;
        match &self.outcome {
            Outcome::Replica { in_recovery, .. } => in_recovery.clone().map_err(ProbeError::Query),
            _ => Err(unexpected()),
        }
    }

    async fn replay_lag(&mut self) -> Result<Option<Duration>, ProbeError> {
        self.begin_query().await;
        match &self.outcome {
            Outcome::Replica { lag, .. } => lag.clone().map_err(ProbeError::Query),
            _ => Err(unexpected()),
        }
    }

    async fn close(self) -> Result<(), ProbeError> {
        self.counters.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
