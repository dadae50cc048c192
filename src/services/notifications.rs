//! Toast notification queue.
//!
//! Capture rejections, storage failures, and relocation misses all surface
//! here as dismissable toasts. The queue is bounded: beyond `max_visible`
//! the oldest toast is evicted. Expiry is host-driven through the same
//! millisecond clock as the rest of the engine.

use crate::types::settings::NotificationSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
    Warning,
}

impl NotificationKind {
    pub fn icon(&self) -> &'static str {
        match self {
            NotificationKind::Success => "✓",
            NotificationKind::Error => "✕",
            NotificationKind::Info => "ℹ",
            NotificationKind::Warning => "⚠",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
    pub dismissible: bool,
    expires_at: Option<u64>,
}

pub struct NotificationCenter {
    settings: NotificationSettings,
    next_id: u64,
    queue: Vec<Notification>,
}

impl NotificationCenter {
    pub fn new(settings: NotificationSettings) -> Self {
        Self {
            settings,
            next_id: 1,
            queue: Vec::new(),
        }
    }

    /// Shows a toast with the default duration. Returns its id.
    pub fn show(&mut self, kind: NotificationKind, message: &str, now_ms: u64) -> u64 {
        let duration = self.settings.default_duration_ms;
        self.show_with_duration(kind, message, Some(duration), now_ms)
    }

    /// Shows a toast; `duration` of `None` keeps it until dismissed.
    pub fn show_with_duration(
        &mut self,
        kind: NotificationKind,
        message: &str,
        duration_ms: Option<u64>,
        now_ms: u64,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.queue.push(Notification {
            id,
            kind,
            message: message.to_string(),
            dismissible: true,
            expires_at: duration_ms.map(|d| now_ms + d),
        });
        while self.queue.len() > self.settings.max_visible {
            self.queue.remove(0);
        }
        id
    }

    pub fn success(&mut self, message: &str, now_ms: u64) -> u64 {
        self.show(NotificationKind::Success, message, now_ms)
    }

    pub fn error(&mut self, message: &str, now_ms: u64) -> u64 {
        self.show(NotificationKind::Error, message, now_ms)
    }

    pub fn info(&mut self, message: &str, now_ms: u64) -> u64 {
        self.show(NotificationKind::Info, message, now_ms)
    }

    pub fn warning(&mut self, message: &str, now_ms: u64) -> u64 {
        self.show(NotificationKind::Warning, message, now_ms)
    }

    /// Drops expired toasts and returns the ones still visible.
    pub fn active(&mut self, now_ms: u64) -> &[Notification] {
        self.queue.retain(|n| match n.expires_at {
            Some(expires_at) => now_ms < expires_at,
            None => true,
        });
        &self.queue
    }

    /// Dismisses one toast by id. Returns whether it existed.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.queue.len();
        self.queue.retain(|n| n.id != id);
        self.queue.len() != before
    }

    pub fn clear_all(&mut self) {
        self.queue.clear();
    }
}
