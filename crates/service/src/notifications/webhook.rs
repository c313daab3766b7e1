use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, instrument};

use models::reminder::ReminderChannel;
use super::notifier::{Notifier, NotifyError};

#[derive(Serialize)]
struct Payload<'a> {
    channel: &'a str,
    recipient: &'a str,
    body: &'a str,
}

/// POSTs `{channel, recipient, body}` as JSON to a delivery gateway.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, NotifyError> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(NotifyError::Config(format!("webhook url must be http(s): {url}")));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Config(e.to_string()))?;
        Ok(Self { client, url: url.to_string() })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    #[instrument(skip(self, body), fields(url = %self.url))]
    async fn send(&self, channel: ReminderChannel, recipient: &str, body: &str) -> Result<(), NotifyError> {
        let resp = self
            .client
            .post(&self.url)
            .json(&Payload { channel: channel.as_str(), recipient, body })
            .send()
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(NotifyError::Delivery(format!("gateway responded {status}")));
        }
        debug!(%status, "webhook delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_http_urls() {
        assert!(WebhookNotifier::new("ftp://gateway", Duration::from_secs(1)).is_err());
        assert!(WebhookNotifier::new("https://gateway.local/send", Duration::from_secs(1)).is_ok());
    }

    #[tokio::test]
    async fn unreachable_gateway_is_a_delivery_error() {
        let n = WebhookNotifier::new("http://127.0.0.1:9/send", Duration::from_millis(500)).unwrap();
        let err = n.send(ReminderChannel::Sms, "555-0100", "hi").await.unwrap_err();
        assert!(matches!(err, NotifyError::Delivery(_)));
    }
}
