use serde::Deserialize;
use tracing::{info, instrument};

use models::client::validate_email;
use models::reminder::ReminderChannel;
use crate::errors::ServiceError;
use super::notifier::Notifier;

pub const MAX_MESSAGE_LEN: usize = 5000;

/// Public contact form submission.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactInquiry {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactInquiry {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.name.trim().is_empty() {
            return Err(ServiceError::Validation("name required".into()));
        }
        validate_email(&self.email)?;
        let len = self.message.trim().chars().count();
        if len == 0 || len > MAX_MESSAGE_LEN {
            return Err(ServiceError::Validation(format!("message must be 1..={MAX_MESSAGE_LEN} characters")));
        }
        Ok(())
    }

    pub fn render(&self) -> String {
        format!(
            "New Contact Inquiry\n\nMessage from {} ({}):\n\n{}",
            self.name.trim(),
            self.email.trim(),
            self.message.trim()
        )
    }
}

/// Forward an inquiry to the salon's own address.
#[instrument(skip(notifier, inquiry), fields(from = %inquiry.email))]
pub async fn send_contact_inquiry(notifier: &dyn Notifier, salon_address: &str, inquiry: &ContactInquiry) -> Result<(), ServiceError> {
    inquiry.validate()?;
    notifier
        .send(ReminderChannel::Email, salon_address, &inquiry.render())
        .await
        .map_err(|e| ServiceError::Db(format!("contact inquiry not delivered: {e}")))?;
    info!("contact_inquiry_forwarded");
    Ok(())
}
