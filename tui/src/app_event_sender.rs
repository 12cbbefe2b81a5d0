use tokio::sync::mpsc::UnboundedSender;
use warden_core::lookup::Notifier;

use crate::app_event::AppEvent;

#[derive(Clone, Debug)]
pub(crate) struct AppEventSender {
    app_event_tx: UnboundedSender<AppEvent>,
}

impl AppEventSender {
    pub(crate) fn new(app_event_tx: UnboundedSender<AppEvent>) -> Self {
        Self { app_event_tx }
    }

    /// Send an event to the app event channel. If it fails, we swallow the
    /// error and log it.
    pub(crate) fn send(&self, event: AppEvent) {
        if let Err(e) = self.app_event_tx.send(event) {
            tracing::error!("failed to send event: {e}");
        }
    }

    pub(crate) fn toast(&self, message: impl Into<String>) {
        self.send(AppEvent::Toast(message.into()));
    }
}

/// Lookup roots report "not found" and failures as toasts.
impl Notifier for AppEventSender {
    fn notify(&self, message: &str) {
        self.toast(message);
    }
}
