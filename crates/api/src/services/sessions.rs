//! In-memory sign-in sessions.
//!
//! A session maps an opaque bearer token to the signed-in account. Sessions
//! live for the lifetime of the process.

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;
use uuid::Uuid;

use domain::models::UserSummary;

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, UserSummary>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a session for `user` and returns its token.
    pub fn create(&self, user: UserSummary) -> String {
        let token = Uuid::new_v4().simple().to_string();
        debug!(user_id = %user.id, "Session created");
        self.write().insert(token.clone(), user);
        token
    }

    pub fn get(&self, token: &str) -> Option<UserSummary> {
        self.read().get(token).cloned()
    }

    /// Ends a session. Returns false if the token was unknown.
    pub fn revoke(&self, token: &str) -> bool {
        self.write().remove(token).is_some()
    }

    /// Ends every session of the given account.
    pub fn revoke_user(&self, user_id: Uuid) -> usize {
        let mut sessions = self.write();
        let before = sessions.len();
        sessions.retain(|_, user| user.id != user_id);
        before - sessions.len()
    }

    /// Replaces the account snapshot held by the user's open sessions.
    pub fn refresh_user(&self, user: &UserSummary) {
        for session in self.write().values_mut().filter(|u| u.id == user.id) {
            *session = user.clone();
        }
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Poisoned locks are recovered; each write is a single map operation
    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, UserSummary>> {
        self.sessions.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, UserSummary>> {
        self.sessions.write().unwrap_or_else(|e| e.into_inner())
    }
}
