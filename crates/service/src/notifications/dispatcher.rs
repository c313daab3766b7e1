use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};

use common::metrics::{REMINDERS_SENT_TOTAL, REMINDER_DISPATCH_FAILURES_TOTAL};
use crate::booking::BookingRepository;
use crate::errors::ServiceError;
use super::notifier::Notifier;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub sent: usize,
    pub failed: usize,
}

/// Sends due reminders through a `Notifier` and marks them sent.
pub struct ReminderDispatcher {
    repo: Arc<dyn BookingRepository>,
    notifier: Arc<dyn Notifier>,
    batch_size: u64,
}

impl ReminderDispatcher {
    pub fn new(repo: Arc<dyn BookingRepository>, notifier: Arc<dyn Notifier>, batch_size: u64) -> Self {
        Self { repo, notifier, batch_size: batch_size.max(1) }
    }

    /// One pass over reminders due at `now`. Failed deliveries stay unsent
    /// and are picked up again on the next pass.
    #[instrument(skip(self))]
    pub async fn dispatch_due(&self, now: DateTime<Utc>) -> Result<DispatchReport, ServiceError> {
        let due = self.repo.due_reminders(now, self.batch_size).await?;
        let mut report = DispatchReport::default();
        for item in due {
            let id = item.reminder.id;
            if let Err(e) = self.notifier.send(item.reminder.channel, item.recipient(), &item.message()).await {
                warn!(reminder_id = %id, error = %e, "reminder delivery failed");
                REMINDER_DISPATCH_FAILURES_TOTAL.inc();
                report.failed += 1;
                continue;
            }
            self.repo.mark_reminder_sent(id).await?;
            REMINDERS_SENT_TOTAL.inc();
            info!(reminder_id = %id, appointment_id = %item.appointment.id, channel = item.reminder.channel.as_str(), "reminder_sent");
            report.sent += 1;
        }
        Ok(report)
    }
}
