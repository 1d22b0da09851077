// src/bot/session.rs - Per-chat session records and store

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

/// Where a chat currently is in the video -> voice -> text flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingVideo,
    ChoosingVoice,
    AwaitingText,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub state: SessionState,
    /// Set once a video has been accepted and probed.
    pub video_path: Option<PathBuf>,
    /// Seconds; 0.0 means not yet computed.
    pub video_duration: f64,
    pub selected_voice: Option<String>,
    pub language: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            state: SessionState::AwaitingVideo,
            video_path: None,
            video_duration: 0.0,
            selected_voice: None,
            language: "en".into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// In-process session repository keyed by chat id.
///
/// Sessions are volatile by design; nothing survives a restart.
#[derive(Default)]
pub struct SessionStore {
    inner: Mutex<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh session for the chat, replacing any existing one.
    pub fn create(&self, chat_id: &str) -> Session {
        let session = Session::new();
        self.lock().insert(chat_id.to_string(), session.clone());
        session
    }

    pub fn get(&self, chat_id: &str) -> Option<Session> {
        self.lock().get(chat_id).cloned()
    }

    /// Apply `f` to the chat's session and bump `updated_at`.
    /// Returns false when no session exists.
    pub fn update(&self, chat_id: &str, f: impl FnOnce(&mut Session)) -> bool {
        let mut map = self.lock();
        match map.get_mut(chat_id) {
            Some(session) => {
                f(session);
                session.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    /// Remove the chat's session. Idempotent: removing an absent
    /// session is not an error.
    pub fn delete(&self, chat_id: &str) -> Option<Session> {
        self.lock().remove(chat_id)
    }

    /// Chats whose sessions have been idle longer than `ttl`.
    pub fn idle_chats(&self, ttl: Duration) -> Vec<String> {
        let cutoff = Utc::now() - ttl;
        self.lock()
            .iter()
            .filter(|(_, session)| session.updated_at < cutoff)
            .map(|(chat_id, _)| chat_id.clone())
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Serializes event handling per chat: two updates for the same chat
/// are processed one after the other, different chats do not block
/// each other.
///
/// Entries are a few bytes each and live for the life of the process.
#[derive(Default)]
pub struct ChatGate {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl ChatGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock_for(&self, chat_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.entry(chat_id.to_string()).or_default().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_initializes_awaiting_video() {
        let store = SessionStore::new();
        let session = store.create("42");
        assert_eq!(session.state, SessionState::AwaitingVideo);
        assert!(session.video_path.is_none());
        assert_eq!(session.video_duration, 0.0);
        assert!(session.selected_voice.is_none());
        assert_eq!(session.language, "en");
    }

    #[test]
    fn test_create_overwrites_existing() {
        let store = SessionStore::new();
        store.create("42");
        store.update("42", |s| {
            s.state = SessionState::AwaitingText;
            s.selected_voice = Some("abc".into());
        });
        let fresh = store.create("42");
        assert_eq!(fresh.state, SessionState::AwaitingVideo);
        assert!(store.get("42").unwrap().selected_voice.is_none());
    }

    #[test]
    fn test_get_absent() {
        let store = SessionStore::new();
        assert!(store.get("42").is_none());
    }

    #[test]
    fn test_update_absent_is_noop() {
        let store = SessionStore::new();
        assert!(!store.update("42", |s| s.video_duration = 1.0));
    }

    #[test]
    fn test_update_bumps_updated_at() {
        let store = SessionStore::new();
        let created = store.create("42").updated_at;
        assert!(store.update("42", |s| s.video_duration = 12.5));
        let session = store.get("42").unwrap();
        assert_eq!(session.video_duration, 12.5);
        assert!(session.updated_at >= created);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let store = SessionStore::new();
        store.create("42");
        assert!(store.delete("42").is_some());
        assert!(store.delete("42").is_none());
    }

    #[test]
    fn test_idle_chats() {
        let store = SessionStore::new();
        store.create("42");
        assert!(store.idle_chats(Duration::minutes(5)).is_empty());
        assert_eq!(store.idle_chats(Duration::zero()), vec!["42".to_string()]);
    }

    #[tokio::test]
    async fn test_chat_gate_is_per_chat() {
        let gate = ChatGate::new();
        let a = gate.lock_for("1");
        let b = gate.lock_for("2");
        let _a_guard = a.lock().await;
        // A different chat's lock is acquirable while chat 1 is held.
        assert!(b.try_lock().is_ok());
        // The same chat's lock is the same mutex.
        assert!(gate.lock_for("1").try_lock().is_err());
    }
}
