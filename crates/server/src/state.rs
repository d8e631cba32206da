use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

use petdiag_core::{Catalog, Config, NarrowingSession, SessionSnapshot};

use crate::metrics::{ACTIVE_SESSIONS, SESSIONS_EXPIRED};

/// Upper bound on the pause between idle-session sweeps.
const MAX_SWEEP_INTERVAL_SECS: u64 = 60;

/// Raised when the in-memory session table is full.
#[derive(Debug, Error)]
#[error("Session limit of {0} reached")]
pub struct SessionLimitReached(pub usize);

/// Shared application state
pub struct AppState {
    config: Config,
    catalog: Arc<Catalog>,
    sessions: RwLock<HashMap<String, NarrowingSession>>,
}

impl AppState {
    pub fn new(config: Config, catalog: Arc<Catalog>) -> Self {
        Self {
            config,
            catalog,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn sessions(&self) -> &RwLock<HashMap<String, NarrowingSession>> {
        &self.sessions
    }

    /// Create and store a fresh session, returning its view.
    ///
    /// A full table is first cleared of idle sessions.
    pub async fn create_session(&self) -> Result<SessionSnapshot, SessionLimitReached> {
        self.create_session_at(Utc::now()).await
    }

    async fn create_session_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<SessionSnapshot, SessionLimitReached> {
        let mut sessions = self.sessions.write().await;
        let limit = self.config.server.max_sessions;
        if sessions.len() >= limit {
            evict_idle(&mut sessions, now, self.idle_timeout());
        }
        if sessions.len() >= limit {
            return Err(SessionLimitReached(limit));
        }

        let session = NarrowingSession::new(
            Arc::clone(&self.catalog),
            self.config.narrowing.clone(),
        );
        let snapshot = session.snapshot();
        sessions.insert(session.id().to_string(), session);
        ACTIVE_SESSIONS.set(sessions.len() as i64);
        Ok(snapshot)
    }

    /// Drop a session. Returns whether it existed.
    pub async fn remove_session(&self, id: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        let removed = sessions.remove(id).is_some();
        ACTIVE_SESSIONS.set(sessions.len() as i64);
        if removed {
            info!(session_id = %id, "Session abandoned");
        }
        removed
    }

    /// Drop every session idle for longer than `server.session_idle_secs`.
    /// Returns how many were dropped.
    pub async fn evict_idle_sessions(&self) -> usize {
        self.evict_idle_sessions_at(Utc::now()).await
    }

    async fn evict_idle_sessions_at(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        evict_idle(&mut sessions, now, self.idle_timeout())
    }

    fn idle_timeout(&self) -> TimeDelta {
        i64::try_from(self.config.server.session_idle_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX)
    }
}

fn evict_idle(
    sessions: &mut HashMap<String, NarrowingSession>,
    now: DateTime<Utc>,
    timeout: TimeDelta,
) -> usize {
    let before = sessions.len();
    sessions.retain(|_, session| now.signed_duration_since(session.updated_at()) <= timeout);
    let evicted = before - sessions.len();
    if evicted > 0 {
        info!(evicted, remaining = sessions.len(), "Evicted idle sessions");
        SESSIONS_EXPIRED.inc_by(evicted as u64);
    }
    ACTIVE_SESSIONS.set(sessions.len() as i64);
    evicted
}

/// Spawn the background task that periodically drops idle sessions.
pub fn spawn_session_sweeper(state: Arc<AppState>) {
    let period = Duration::from_secs(
        state
            .config
            .server
            .session_idle_secs
            .clamp(1, MAX_SWEEP_INTERVAL_SECS),
    );

    tokio::spawn(async move {
        info!(period_secs = period.as_secs(), "Session sweeper started");
        loop {
            tokio::time::sleep(period).await;
            let evicted = state.evict_idle_sessions().await;
            debug!(evicted, "Idle session sweep finished");
        }
    });
}
