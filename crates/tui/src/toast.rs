use std::collections::VecDeque;
use std::time::{Duration, Instant};

const MAX_TOASTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastVariant {
    #[default]
    Default,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub variant: ToastVariant,
}

impl Toast {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: ToastVariant::Default,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: ToastVariant::Destructive,
        }
    }
}

/// Capability for surfacing transient notifications.
pub trait Notifier {
    fn notify(&mut self, toast: Toast);
}

pub struct ToastQueue {
    lifetime: Duration,
    entries: VecDeque<(Toast, Instant)>,
}

impl ToastQueue {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            lifetime,
            entries: VecDeque::new(),
        }
    }

    /// Newest first.
    pub fn visible(&self) -> impl Iterator<Item = &Toast> {
        self.entries.iter().map(|(toast, _)| toast)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn prune(&mut self, now: Instant) {
        let lifetime = self.lifetime;
        self.entries
            .retain(|(_, shown_at)| now.saturating_duration_since(*shown_at) < lifetime);
    }

    pub fn dismiss_latest(&mut self) {
        self.entries.pop_front();
    }

    fn push_at(&mut self, toast: Toast, now: Instant) {
        tracing::debug!(title = %toast.title, "toast");
        self.entries.push_front((toast, now));
        self.entries.truncate(MAX_TOASTS);
    }
}

impl Notifier for ToastQueue {
    fn notify(&mut self, toast: Toast) {
        self.push_at(toast, Instant::now());
    }
}
