//! Outbound notifications: the `Notifier` seam, its implementations, the
//! reminder dispatcher and the contact-inquiry relay.

pub mod notifier;
pub mod webhook;
pub mod dispatcher;
pub mod contact;

pub use notifier::{LogNotifier, Notifier, NotifyError, RecordingNotifier, SentMessage};
pub use webhook::WebhookNotifier;
pub use dispatcher::{DispatchReport, ReminderDispatcher};
pub use contact::{send_contact_inquiry, ContactInquiry};

use std::sync::Arc;

/// Webhook notifier when a gateway URL is configured, log notifier otherwise.
pub fn from_config(cfg: &configs::NotifierConfig) -> Result<Arc<dyn Notifier>, NotifyError> {
    match cfg.webhook_url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
        Some(url) => Ok(Arc::new(WebhookNotifier::new(url, std::time::Duration::from_secs(cfg.webhook_timeout_secs))?)),
        None => Ok(Arc::new(LogNotifier)),
    }
}
