//! Transient user-facing notifications.
//!
//! Entries are appended by producers and removed oldest-first by an explicit
//! dismiss. There is no capacity bound and no expiry.

#[cfg(test)]
#[path = "notifications_test.rs"]
mod notifications_test;

use std::collections::VecDeque;
use std::str::FromStr;

use serde::Serialize;
use uuid::Uuid;

/// Severity used by views to style a notification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "success" => Ok(Self::Success),
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown notification kind: {other}")),
        }
    }
}

/// A single queued message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Stable key for views rendering the queue.
    pub id: Uuid,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
}

/// FIFO of pending notifications.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NotificationState {
    queue: VecDeque<Notification>,
}

impl NotificationState {
    /// Append a notification and return its id.
    pub fn enqueue(&mut self, message: impl Into<String>, kind: NotificationKind) -> Uuid {
        let id = Uuid::new_v4();
        self.queue.push_back(Notification { id, message: message.into(), kind });
        id
    }

    /// Remove and return the oldest notification, if any.
    pub fn dismiss(&mut self) -> Option<Notification> {
        self.queue.pop_front()
    }

    /// The notification currently surfaced to the user.
    #[must_use]
    pub fn current(&self) -> Option<&Notification> {
        self.queue.front()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.queue.iter()
    }
}
