use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use models::reminder::ReminderChannel;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notifier misconfigured: {0}")]
    Config(String),
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Hands a rendered message to whatever actually delivers email or SMS.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, channel: ReminderChannel, recipient: &str, body: &str) -> Result<(), NotifyError>;
}

/// Writes each message as a structured log line.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, channel: ReminderChannel, recipient: &str, body: &str) -> Result<(), NotifyError> {
        info!(channel = channel.as_str(), recipient = %recipient, body = %body, "notification");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub channel: ReminderChannel,
    pub recipient: String,
    pub body: String,
}

/// Keeps every message in memory; can be told to fail.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentMessage>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self { Self::default() }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, channel: ReminderChannel, recipient: &str, body: &str) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::Delivery("recording notifier set to fail".into()));
        }
        self.sent.lock().unwrap().push(SentMessage { channel, recipient: recipient.into(), body: body.into() });
        Ok(())
    }
}
