//! Notification service (toast queue)
//!
//! An injected service object, constructed at startup and passed by handle.
//! No module-level singletons: tests build an isolated instance per case.
//! The UI drains the queue each frame; one-shot keys make sure advisory
//! announcements (e.g. "zone detected") fire at most once per session.

use std::collections::VecDeque;
use std::sync::Mutex;

use dashmap::DashMap;
use serde::Serialize;

/// Notice severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoticeKind {
    Success,
    Warning,
    Error,
}

/// A queued user-visible notice
#[derive(Debug, Clone, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

/// Queued notification service
#[derive(Debug, Default)]
pub struct Notifier {
    queue: Mutex<VecDeque<Notice>>,
    seen_keys: DashMap<String, ()>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a success notice
    pub fn success(&self, message: impl Into<String>) {
        self.push(NoticeKind::Success, message.into());
    }

    /// Queue a warning notice
    pub fn warning(&self, message: impl Into<String>) {
        self.push(NoticeKind::Warning, message.into());
    }

    /// Queue an error notice
    pub fn error(&self, message: impl Into<String>) {
        self.push(NoticeKind::Error, message.into());
    }

    /// Queue a notice at most once per key. Returns whether it was queued.
    pub fn once(&self, key: impl Into<String>, kind: NoticeKind, message: impl Into<String>) -> bool {
        let key = key.into();
        if self.seen_keys.contains_key(&key) {
            return false;
        }
        self.seen_keys.insert(key, ());
        self.push(kind, message.into());
        true
    }

    /// Drain all queued notices (consumed by the UI layer)
    pub fn drain(&self) -> Vec<Notice> {
        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        queue.drain(..).collect()
    }

    /// Clear the queue and forget all one-shot keys
    pub fn reset(&self) {
        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        queue.clear();
        self.seen_keys.clear();
    }

    fn push(&self, kind: NoticeKind, message: String) {
        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        queue.push_back(Notice { kind, message });
    }
}
