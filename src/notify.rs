//! User-visible notifications (toasts).

use std::collections::VecDeque;

use crate::error::UiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationLevel {
    pub fn css_class(&self) -> &'static str {
        match self {
            NotificationLevel::Info => "toast-info",
            NotificationLevel::Success => "toast-success",
            NotificationLevel::Warning => "toast-warning",
            NotificationLevel::Error => "toast-error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn from_error(id: u64, err: &UiError) -> Self {
        let level = match err {
            UiError::Validation { .. } => NotificationLevel::Warning,
            _ => NotificationLevel::Error,
        };
        Self { id, level, message: err.to_string() }
    }
}

/// Bounded toast queue; the oldest entry falls off when full.
#[derive(Debug)]
pub struct Notifications {
    items: VecDeque<Notification>,
    next_id: u64,
    capacity: usize,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::with_capacity(8)
    }
}

impl Notifications {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { items: VecDeque::new(), next_id: 1, capacity: capacity.max(1) }
    }

    pub fn push(&mut self, level: NotificationLevel, message: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.enqueue(Notification { id, level, message: message.into() });
        id
    }

    pub fn info(&mut self, message: impl Into<String>) -> u64 {
        self.push(NotificationLevel::Info, message)
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.push(NotificationLevel::Success, message)
    }

    pub fn warning(&mut self, message: impl Into<String>) -> u64 {
        self.push(NotificationLevel::Warning, message)
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.push(NotificationLevel::Error, message)
    }

    pub fn report(&mut self, err: &UiError) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.enqueue(Notification::from_error(id, err));
        id
    }

    fn enqueue(&mut self, n: Notification) {
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(n);
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }

    /// Hand all pending toasts to the renderer.
    pub fn drain(&mut self) -> Vec<Notification> {
        self.items.drain(..).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
