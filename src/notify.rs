use std::time::{Duration, Instant};

pub const TOAST_LIFETIME: Duration = Duration::from_secs(4);
const MAX_VISIBLE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub kind: ToastKind,
    pub raised: Instant,
}

/// Transient notifications, newest last.
#[derive(Debug, Default)]
pub struct Toasts {
    items: Vec<Toast>,
}

impl Toast {
    pub fn is_error(&self) -> bool {
        self.kind == ToastKind::Destructive
    }
}

impl Toasts {
    pub fn push(&mut self, kind: ToastKind, title: impl Into<String>, description: impl Into<String>) {
        let toast = Toast {
            title: title.into(),
            description: description.into(),
            kind,
            raised: Instant::now(),
        };
        tracing::debug!(title = %toast.title, description = %toast.description, "toast");
        self.items.push(toast);
    }

    pub fn info(&mut self, title: impl Into<String>, description: impl Into<String>) {
        self.push(ToastKind::Info, title, description);
    }

    pub fn destructive(&mut self, title: impl Into<String>, description: impl Into<String>) {
        self.push(ToastKind::Destructive, title, description);
    }

    /// Drops toasts older than the lifetime.
    pub fn expire(&mut self, now: Instant) {
        self.items
            .retain(|t| now.saturating_duration_since(t.raised) < TOAST_LIFETIME);
    }

    pub fn visible(&self) -> &[Toast] {
        let start = self.items.len().saturating_sub(MAX_VISIBLE);
        &self.items[start..]
    }

    pub fn drain(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.items)
    }
}
