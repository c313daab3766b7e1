use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use models::{appointment, client, payment, reminder};
use models::appointment::AppointmentStatus;
use models::reminder::ReminderChannel;
use crate::errors::ServiceError;

pub const MAX_NOTES_LEN: usize = 2000;

/// Booking input as received from a caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    /// Defaults to the calling principal.
    #[serde(default)]
    pub client_id: Option<Uuid>,
    pub service_id: Uuid,
    /// RFC 3339, or `YYYY-MM-DDTHH:MM[:SS]` read as UTC.
    pub requested_at: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Everything written by one booking.
#[derive(Debug, Clone, Serialize)]
pub struct BookingReceipt {
    pub appointment: appointment::Model,
    pub payments: Vec<payment::Model>,
    pub reminders: Vec<reminder::Model>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionReceipt {
    pub appointment: appointment::Model,
    pub final_payment: Option<payment::Model>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Balance {
    pub appointment_id: Uuid,
    pub service_price: Decimal,
    pub total_paid: Decimal,
    pub outstanding: Decimal,
}

impl Balance {
    pub fn of(appointment: &appointment::Model, payments: &[payment::Model]) -> Self {
        let total_paid = payment::total(payments);
        Self {
            appointment_id: appointment.id,
            service_price: appointment.service_price,
            total_paid,
            outstanding: appointment.service_price - total_paid,
        }
    }
}

/// The appointment must still accept money and `amount` must not push the
/// ledger past the price snapshot.
pub fn ensure_payment_fits(appointment: &appointment::Model, paid: Decimal, amount: Decimal) -> Result<(), ServiceError> {
    if appointment.is_deleted {
        return Err(ServiceError::Validation("appointment has been deleted".into()));
    }
    if appointment.status == AppointmentStatus::Canceled {
        return Err(ServiceError::Validation("appointment is canceled".into()));
    }
    let outstanding = appointment.service_price - paid;
    if amount > outstanding {
        return Err(ServiceError::Validation(format!("payment {amount} exceeds outstanding balance {outstanding}")));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ActiveFilter {
    pub client_id: Option<Uuid>,
}

/// A due reminder joined with what is needed to address and word it.
#[derive(Debug, Clone)]
pub struct DueReminder {
    pub reminder: reminder::Model,
    pub appointment: appointment::Model,
    pub client: client::Model,
    pub service_title: String,
}

impl DueReminder {
    /// Email address or phone number, depending on the channel.
    pub fn recipient(&self) -> &str {
        match self.reminder.channel {
            ReminderChannel::Email => &self.client.email,
            ReminderChannel::Sms => &self.client.phone,
        }
    }

    pub fn message(&self) -> String {
        format!(
            "Hi {}, this is a reminder of your {} appointment on {} UTC.",
            self.client.first_name,
            self.service_title,
            self.appointment.scheduled_at.with_timezone(&Utc).format("%Y-%m-%d %H:%M"),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReminderRule {
    pub offset: Duration,
    pub channel: ReminderChannel,
}

/// Fee percentage and reminder offsets applied to every booking.
#[derive(Debug, Clone)]
pub struct BookingPolicy {
    pub fee_percent: Decimal,
    pub reminders: Vec<ReminderRule>,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            fee_percent: Decimal::from(10),
            reminders: vec![
                ReminderRule { offset: Duration::hours(48), channel: ReminderChannel::Email },
                ReminderRule { offset: Duration::hours(4), channel: ReminderChannel::Sms },
            ],
        }
    }
}

impl BookingPolicy {
    pub fn from_config(cfg: &configs::BookingConfig) -> Result<Self, ServiceError> {
        if cfg.reservation_fee_percent > 100 {
            return Err(ServiceError::Validation("reservation_fee_percent must be <= 100".into()));
        }
        let reminders = cfg
            .reminders
            .iter()
            .map(|r| {
                Ok(ReminderRule {
                    offset: Duration::hours(i64::from(r.offset_hours)),
                    channel: ReminderChannel::parse(&r.channel)?,
                })
            })
            .collect::<Result<Vec<_>, ServiceError>>()?;
        Ok(Self { fee_percent: Decimal::from(cfg.reservation_fee_percent), reminders })
    }
}

/// `round(price * percent / 100, 2)`, halves rounded away from zero.
pub fn compute_reservation_fee(price: Decimal, percent: Decimal) -> Decimal {
    let mut fee = (price * percent / Decimal::ONE_HUNDRED).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    fee.rescale(2);
    fee
}

/// Parse a requested appointment time; it must lie strictly after `now`.
pub fn parse_requested_at(raw: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, ServiceError> {
    let raw = raw.trim();
    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").map(|n| n.and_utc()))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M").map(|n| n.and_utc()))
        .map_err(|_| ServiceError::Validation(format!("invalid date/time '{raw}', expected YYYY-MM-DDTHH:MM")))?;
    if parsed <= now {
        return Err(ServiceError::Validation("appointment time must be in the future".into()));
    }
    Ok(parsed)
}

/// One unsent reminder per rule at `scheduled_at - offset`. Rules whose time
/// has already passed still produce a reminder; the dispatcher sends it on
/// its next tick.
pub fn schedule_reminders(appointment_id: Uuid, scheduled_at: DateTime<Utc>, rules: &[ReminderRule]) -> Vec<reminder::Model> {
    rules
        .iter()
        .map(|rule| reminder::Model {
            id: Uuid::new_v4(),
            appointment_id,
            send_at: (scheduled_at - rule.offset).into(),
            channel: rule.channel,
            sent: false,
            sent_at: None,
        })
        .collect()
}
