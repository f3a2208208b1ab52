use std::collections::HashMap;
use std::sync::Arc;

use rand::distributions::Alphanumeric;
use rand::Rng;
use tokio::sync::{Mutex, RwLock};

use crate::model::session::Session;

pub const SESSION_ID_LEN: usize = 16;

/// Shared handle to one session; the mutex serialises requests for that id.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Process-lifetime map from session id to session record.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Returns the handle for `id`, creating an empty session the first time.
    /// The flag is true when this call created it.
    pub async fn get_or_create(&self, id: &str) -> (SessionHandle, bool) {
        if let Some(handle) = self.get(id).await {
            return (handle, false);
        }

        let mut sessions = self.sessions.write().await;
        if let Some(handle) = sessions.get(id) {
            return (handle.clone(), false);
        }

        let handle = Arc::new(Mutex::new(Session::new()));
        sessions.insert(id.to_string(), handle.clone());
        (handle, true)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

pub fn new_session_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_ID_LEN)
        .map(char::from)
        .collect()
}
