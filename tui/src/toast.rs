//! Transient operator notifications shown above the key hints.

use std::collections::VecDeque;
use std::time::Duration;
use std::time::Instant;

const MAX_TOASTS: usize = 8;

#[derive(Debug, Clone)]
struct Toast {
    message: String,
    expires_at: Instant,
}

#[derive(Debug)]
pub(crate) struct ToastStack {
    ttl: Duration,
    toasts: VecDeque<Toast>,
}

impl ToastStack {
    pub(crate) fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            toasts: VecDeque::new(),
        }
    }

    pub(crate) fn push(&mut self, message: impl Into<String>, now: Instant) {
        let message = message.into();
        tracing::debug!("toast: {message}");
        if self.toasts.len() == MAX_TOASTS {
            self.toasts.pop_front();
        }
        self.toasts.push_back(Toast {
            message,
            expires_at: now + self.ttl,
        });
    }

    /// Drop expired toasts. Returns whether anything was removed.
    pub(crate) fn prune(&mut self, now: Instant) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|toast| toast.expires_at > now);
        before != self.toasts.len()
    }

    pub(crate) fn latest(&self) -> Option<&str> {
        self.toasts.back().map(|toast| toast.message.as_str())
    }

    pub(crate) fn len(&self) -> usize {
        self.toasts.len()
    }
}
