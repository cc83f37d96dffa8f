//! Session manager - bounded session-id → session map.
//!
//! Sessions are created on first use and expire after idling. Each session
//! sits behind its own async mutex, so concurrent requests for the same id
//! are serialized while distinct ids proceed in parallel.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::debug;

use crate::error::Error;
use crate::knowledge::KnowledgeBase;
use crate::llm::CompletionClient;
use crate::Result;

use super::session::Session;

/// Upper bound on live sessions; the least recently used is evicted beyond it.
pub const MAX_SESSIONS: usize = 256;

/// Sessions idle longer than this are dropped on the next sweep.
pub const IDLE_TTL: Duration = Duration::from_secs(30 * 60);

struct SessionEntry<C: CompletionClient> {
    session: Arc<Mutex<Session<C>>>,
    last_used: Instant,
}

/// Maps opaque session identifiers to live sessions.
pub struct SessionManager<C: CompletionClient + Clone> {
    client: C,
    system_instruction: String,
    knowledge: Arc<KnowledgeBase>,
    sessions: Mutex<HashMap<String, SessionEntry<C>>>,
    capacity: usize,
    idle_ttl: Duration,
}

impl<C: CompletionClient + Clone> SessionManager<C> {
    /// Create a manager with default bounds.
    pub fn new(client: C, system_instruction: impl Into<String>, knowledge: Arc<KnowledgeBase>) -> Self {
        Self::with_limits(client, system_instruction, knowledge, MAX_SESSIONS, IDLE_TTL)
    }

    /// Create a manager with explicit bounds.
    pub fn with_limits(
        client: C,
        system_instruction: impl Into<String>,
        knowledge: Arc<KnowledgeBase>,
        capacity: usize,
        idle_ttl: Duration,
    ) -> Self {
        Self {
            client,
            system_instruction: system_instruction.into(),
            knowledge,
            sessions: Mutex::new(HashMap::new()),
            capacity,
            idle_ttl,
        }
    }

    /// Look up the session for `id`, creating it on first use.
    pub async fn get_or_create(&self, id: &str) -> Arc<Mutex<Session<C>>> {
        let mut sessions = self.sessions.lock().await;

        // Sweep idle sessions before resolving this one.
        sessions.retain(|_, entry| entry.last_used.elapsed() < self.idle_ttl);

        if let Some(entry) = sessions.get_mut(id) {
            entry.last_used = Instant::now();
            return entry.session.clone();
        }

        if sessions.len() >= self.capacity {
            if let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(key, _)| key.clone())
            {
                debug!("Evicting least recently used session: {}", oldest);
                sessions.remove(&oldest);
            }
        }

        debug!("Creating session: {}", id);
        let session = Arc::new(Mutex::new(Session::new(
            self.client.clone(),
            self.system_instruction.clone(),
            self.knowledge.clone(),
        )));
        sessions.insert(
            id.to_string(),
            SessionEntry {
                session: session.clone(),
                last_used: Instant::now(),
            },
        );
        session
    }

    /// Resolve the session for `id` and run one user turn on it.
    ///
    /// Input is validated before the lookup so a rejected request never
    /// materializes a session entry.
    pub async fn respond(&self, id: &str, user_text: &str) -> Result<String> {
        if user_text.trim().is_empty() {
            return Err(Error::Input("message is empty".to_string()));
        }

        let session = self.get_or_create(id).await;
        let mut session = session.lock().await;
        session.respond(user_text).await
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
