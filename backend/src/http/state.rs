//! Application state for the HTTP server.

use std::collections::HashMap;
use std::sync::Arc;

use log::info;
use parking_lot::Mutex;

use crate::config::RosterConfig;
use crate::services::{GenerationBackend, GenerationJobTracker, JobId, JobTiming, SolverBackend};

struct Session {
    tracker: Arc<GenerationJobTracker>,
    last_used: u64,
}

/// Open sessions, stamped with a logical clock for LRU eviction.
#[derive(Default)]
struct Sessions {
    entries: HashMap<String, Session>,
    clock: u64,
}

impl Sessions {
    fn touch(&mut self, session_id: &str) -> Option<Arc<GenerationJobTracker>> {
        self.clock += 1;
        let now = self.clock;
        self.entries.get_mut(session_id).map(|session| {
            session.last_used = now;
            Arc::clone(&session.tracker)
        })
    }

    fn least_recently_used(&self) -> Option<String> {
        self.entries
            .iter()
            .min_by_key(|(_, session)| session.last_used)
            .map(|(id, _)| id.clone())
    }
}

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RosterConfig>,
    /// Backend every session's tracker hands its jobs to
    pub backend: Arc<dyn GenerationBackend>,
    /// One tracker per editing session, at most `server.max_sessions`
    sessions: Arc<Mutex<Sessions>>,
}

impl AppState {
    /// Create state that generates schedules with the in-process solver.
    pub fn new(config: RosterConfig) -> Self {
        let backend = Arc::new(SolverBackend::from_config(&config));
        Self::with_backend(config, backend)
    }

    pub fn with_backend(config: RosterConfig, backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            config: Arc::new(config),
            backend,
            sessions: Arc::new(Mutex::new(Sessions::default())),
        }
    }

    pub fn timing(&self) -> JobTiming {
        JobTiming::from(&self.config.jobs)
    }

    /// Tracker for `session_id`, created on first use. Opening a session past
    /// the limit closes the least recently used one and cancels its job.
    pub fn tracker(&self, session_id: &str) -> Arc<GenerationJobTracker> {
        let mut sessions = self.sessions.lock();
        if let Some(tracker) = sessions.touch(session_id) {
            return tracker;
        }

        let limit = self.config.server.max_sessions.max(1);
        while sessions.entries.len() >= limit {
            let Some(evicted) = sessions.least_recently_used() else {
                break;
            };
            if let Some(session) = sessions.entries.remove(&evicted) {
                session.tracker.cancel();
                info!("evicted idle generation session {}", evicted);
            }
        }

        info!("opening generation session {}", session_id);
        let tracker = Arc::new(GenerationJobTracker::new(
            Arc::clone(&self.backend),
            self.timing(),
        ));
        sessions.clock += 1;
        let last_used = sessions.clock;
        sessions.entries.insert(
            session_id.to_string(),
            Session {
                tracker: Arc::clone(&tracker),
                last_used,
            },
        );
        tracker
    }

    pub fn existing_tracker(&self, session_id: &str) -> Option<Arc<GenerationJobTracker>> {
        self.sessions.lock().touch(session_id)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().entries.len()
    }

    /// Close a session, cancelling its tracked job. Returns the cancelled job id.
    pub fn end_session(&self, session_id: &str) -> Option<JobId> {
        let session = self.sessions.lock().entries.remove(session_id)?;
        let cancelled = session.tracker.cancel();
        info!("closed generation session {}", session_id);
        cancelled
    }
}
