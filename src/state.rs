//! Application state: session store, prompts, code runner, and OpenAI client.
//!
//! This module owns:
//!   - per-learner session records keyed by the session cookie
//!   - the prompts struct (from TOML or defaults)
//!   - the code runner (interpreter + timeout)
//!   - optional OpenAI client
//!
//! Session records are snapshotted for the duration of a request and written
//! back afterwards; the lock is never held across a model call or a child process.
//! Records idle longer than `session_ttl` are evicted on write, and the store
//! never holds more than `max_sessions` records.

use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::config::{load_practice_config_from_env, Prompts, SessionConfig};
use crate::openai::OpenAI;
use crate::runner::CodeRunner;
use crate::session::SessionState;

/// A stored session plus the time it was last written.
#[derive(Clone, Debug)]
pub struct SessionEntry {
    pub state: SessionState,
    pub last_seen: Instant,
}

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<RwLock<HashMap<String, SessionEntry>>>,
    pub session_ttl: Duration,
    pub max_sessions: usize,
    pub openai: Option<OpenAI>,
    pub prompts: Prompts,
    pub runner: CodeRunner,
}

impl AppState {
    /// Build state from env: load config, build the runner, init OpenAI.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        // Load TOML config if provided (prompts + runner + session settings).
        let cfg = load_practice_config_from_env().unwrap_or_default();
        let runner = CodeRunner::from_config(&cfg.runner);
        info!(target: "adaptipy", interpreter = %runner.interpreter, timeout = ?runner.timeout, "Code runner configured");

        // Build optional OpenAI client (if API key present).
        let openai = OpenAI::from_env();
        if let Some(oa) = &openai {
            info!(target: "adaptipy", base_url = %oa.base_url, model = %oa.model, "OpenAI enabled.");
        } else {
            info!(target: "adaptipy", "OpenAI disabled (no OPENAI_API_KEY). Using built-in problems and hints.");
        }

        Self::from_parts(openai, cfg.prompts, runner).with_session_limits(&cfg.sessions)
    }

    pub fn from_parts(openai: Option<OpenAI>, prompts: Prompts, runner: CodeRunner) -> Self {
        let limits = SessionConfig::default();
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            session_ttl: Duration::from_secs(limits.idle_ttl_secs),
            max_sessions: limits.max_sessions,
            openai,
            prompts,
            runner,
        }
    }

    pub fn with_session_limits(mut self, cfg: &SessionConfig) -> Self {
        self.session_ttl = Duration::from_secs(cfg.idle_ttl_secs);
        self.max_sessions = cfg.max_sessions.max(1);
        self
    }

    /// Snapshot of the session for `id`. Unknown, missing or expired ids start
    /// a fresh session under a new id; the record itself is created on `save_session`.
    #[instrument(level = "debug", skip(self))]
    pub async fn load_session(&self, id: Option<&str>) -> (String, SessionState) {
        if let Some(id) = id {
            if let Some(entry) = self.sessions.read().await.get(id) {
                if entry.last_seen.elapsed() <= self.session_ttl {
                    return (id.to_string(), entry.state.clone());
                }
            }
        }
        let id = Uuid::new_v4().to_string();
        debug!(target: "adaptipy", session = %id, "Starting new session");
        (id, SessionState::default())
    }

    /// Store the updated record (last writer wins), then evict idle records
    /// and, if still over capacity, the least recently seen ones.
    #[instrument(level = "debug", skip(self, session))]
    pub async fn save_session(&self, id: &str, session: SessionState) {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        sessions.insert(id.to_string(), SessionEntry { state: session, last_seen: now });

        let before = sessions.len();
        let ttl = self.session_ttl;
        sessions.retain(|_, e| now.duration_since(e.last_seen) <= ttl);

        if sessions.len() > self.max_sessions {
            let mut by_age: Vec<(Instant, String)> = sessions
                .iter()
                .filter(|(k, _)| k.as_str() != id)
                .map(|(k, e)| (e.last_seen, k.clone()))
                .collect();
            by_age.sort();
            let excess = sessions.len() - self.max_sessions;
            for (_, k) in by_age.into_iter().take(excess) {
                sessions.remove(&k);
            }
        }

        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!(target: "adaptipy", evicted, remaining = sessions.len(), "Evicted sessions");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Problem, Topic};

    fn offline_state() -> AppState {
        AppState::from_parts(None, Prompts::default(), CodeRunner::default())
    }

    #[tokio::test]
    async fn unknown_id_gets_a_fresh_session() {
        let state = offline_state();
        let (id, s) = state.load_session(Some("nope")).await;
        assert_ne!(id, "nope");
        assert_eq!(s, SessionState::default());
        assert!(state.sessions.read().await.is_empty());
    }

    #[tokio::test]
    async fn saved_session_is_returned_on_next_load() {
        let state = offline_state();
        let (id, mut s) = state.load_session(None).await;
        s.select_topic(Topic::Arrays);
        s.current = Some(Problem::new("Print 1", "1"));
        state.save_session(&id, s.clone()).await;

        let (again, loaded) = state.load_session(Some(&id)).await;
        assert_eq!(again, id);
        assert_eq!(loaded, s);
    }

    #[tokio::test]
    async fn idle_sessions_are_evicted_on_next_write() {
        let state = offline_state()
            .with_session_limits(&SessionConfig { idle_ttl_secs: 0, max_sessions: 100 });
        state.save_session("old-1", SessionState::default()).await;
        state.save_session("old-2", SessionState::default()).await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        state.save_session("fresh", SessionState::default()).await;
        let sessions = state.sessions.read().await;
        assert_eq!(sessions.len(), 1);
        assert!(sessions.contains_key("fresh"));
    }

    #[tokio::test]
    async fn expired_session_is_not_resumed() {
        let state = offline_state()
            .with_session_limits(&SessionConfig { idle_ttl_secs: 0, max_sessions: 100 });
        state.save_session("stale", SessionState { selected_topic: Topic::Strings, current: None }).await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        let (id, s) = state.load_session(Some("stale")).await;
        assert_ne!(id, "stale");
        assert_eq!(s, SessionState::default());
    }

    #[tokio::test]
    async fn cookieless_traffic_is_capped() {
        let state = offline_state()
            .with_session_limits(&SessionConfig { idle_ttl_secs: 3600, max_sessions: 3 });
        let mut last = String::new();
        for _ in 0..50 {
            let (id, s) = state.load_session(None).await;
            state.save_session(&id, s).await;
            last = id;
        }
        let sessions = state.sessions.read().await;
        assert_eq!(sessions.len(), 3);
        assert!(sessions.contains_key(&last));
    }
}
