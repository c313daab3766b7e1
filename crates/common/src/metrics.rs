//! Process-wide Prometheus metrics for the booking workflow.
//!
//! Metrics live in the default registry so `encode_metrics` can render
//! everything registered by any crate in the process.

use axum::http::StatusCode;
use once_cell::sync::Lazy;
use prometheus::{register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec, TextEncoder};

pub static APPOINTMENTS_BOOKED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "salon_appointments_booked_total",
        "Total appointments created through the booking workflow"
    )
    .expect("register appointments_booked_total")
});

pub static APPOINTMENT_TRANSITIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "salon_appointment_transitions_total",
        "Appointment status transitions by target status",
        &["status"]
    )
    .expect("register appointment_transitions_total")
});

pub static PAYMENTS_RECORDED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "salon_payments_recorded_total",
        "Ledger entries appended, by payment kind",
        &["kind"]
    )
    .expect("register payments_recorded_total")
});

pub static REMINDERS_SENT_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "salon_reminders_sent_total",
        "Reminders handed to the notifier and marked sent"
    )
    .expect("register reminders_sent_total")
});

pub static REMINDER_DISPATCH_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "salon_reminder_dispatch_failures_total",
        "Reminders the notifier failed to deliver"
    )
    .expect("register reminder_dispatch_failures_total")
});

/// Render the default registry in the Prometheus text format.
pub fn encode_metrics() -> (StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (StatusCode::OK, String::from_utf8(buffer).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booked_counter_shows_up_in_export() {
        APPOINTMENTS_BOOKED_TOTAL.inc();
        PAYMENTS_RECORDED_TOTAL.with_label_values(&["reservation"]).inc();
        let (status, body) = encode_metrics();
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("salon_appointments_booked_total"));
        assert!(body.contains("kind=\"reservation\""));
    }
}
