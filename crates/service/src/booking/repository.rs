use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use models::appointment::AppointmentStatus;
use models::{appointment, catalog, client, payment, reminder};
use super::domain::{BookingReceipt, DueReminder};
use crate::errors::ServiceError;

/// Persistence seam for the booking workflow.
///
/// `insert_booking` and `settle` are units of work: either every row they are
/// given is written, or none is.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn find_client(&self, id: Uuid) -> Result<Option<client::Model>, ServiceError>;
    async fn find_service(&self, id: Uuid) -> Result<Option<catalog::Model>, ServiceError>;

    async fn insert_booking(
        &self,
        appointment: appointment::Model,
        reservation: Option<payment::Model>,
        reminders: Vec<reminder::Model>,
    ) -> Result<BookingReceipt, ServiceError>;

    async fn get_appointment(&self, id: Uuid) -> Result<Option<appointment::Model>, ServiceError>;
    /// Persist status, notes, soft-delete flag and `updated_at`.
    async fn update_appointment(&self, appointment: appointment::Model) -> Result<appointment::Model, ServiceError>;
    /// Append `payment` (if any) and persist `appointment` together.
    ///
    /// The stored row must still be in status `from`, not deleted, and its
    /// ledger plus `payment` must add up to the price snapshot; otherwise
    /// `Conflict` and nothing is written.
    async fn settle(
        &self,
        appointment: appointment::Model,
        from: AppointmentStatus,
        payment: Option<payment::Model>,
    ) -> Result<(appointment::Model, Option<payment::Model>), ServiceError>;
    /// Non-deleted appointments ordered by schedule, plus the total count.
    async fn list_active(&self, client_id: Option<Uuid>, page_idx: u64, per_page: u64) -> Result<(Vec<appointment::Model>, u64), ServiceError>;

    /// Checked against the stored appointment with `ensure_payment_fits`
    /// in the same unit as the insert.
    async fn append_payment(&self, payment: payment::Model) -> Result<payment::Model, ServiceError>;
    /// Ledger in insertion order.
    async fn payments(&self, appointment_id: Uuid) -> Result<Vec<payment::Model>, ServiceError>;

    async fn reminders(&self, appointment_id: Uuid) -> Result<Vec<reminder::Model>, ServiceError>;
    /// `None` when the reminder does not exist. Already-sent reminders are returned unchanged.
    async fn mark_reminder_sent(&self, id: Uuid) -> Result<Option<reminder::Model>, ServiceError>;
    async fn due_reminders(&self, now: DateTime<Utc>, limit: u64) -> Result<Vec<DueReminder>, ServiceError>;
}

/// In-memory repository for tests, benches and doc examples
pub mod mock {
    use super::*;
    use rust_decimal::Decimal;
    use crate::booking::domain::ensure_payment_fits;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct State {
        clients: HashMap<Uuid, client::Model>,
        services: HashMap<Uuid, catalog::Model>,
        appointments: HashMap<Uuid, appointment::Model>,
        payments: Vec<payment::Model>,
        reminders: Vec<reminder::Model>,
    }

    #[derive(Default)]
    pub struct InMemoryBookingRepository {
        state: Mutex<State>,
        fail_next_write: AtomicBool,
    }

    impl InMemoryBookingRepository {
        pub fn new() -> Self { Self::default() }

        pub fn insert_client(&self, c: client::Model) {
            self.state.lock().unwrap().clients.insert(c.id, c);
        }

        pub fn insert_service(&self, s: catalog::Model) {
            self.state.lock().unwrap().services.insert(s.id, s);
        }

        /// Make the next unit of work fail before anything is written.
        pub fn fail_next_write(&self) {
            self.fail_next_write.store(true, Ordering::SeqCst);
        }

        pub fn appointment_count(&self) -> usize {
            self.state.lock().unwrap().appointments.len()
        }

        pub fn payment_count(&self) -> usize {
            self.state.lock().unwrap().payments.len()
        }

        pub fn reminder_count(&self) -> usize {
            self.state.lock().unwrap().reminders.len()
        }

        fn check_write(&self) -> Result<(), ServiceError> {
            if self.fail_next_write.swap(false, Ordering::SeqCst) {
                return Err(ServiceError::Db("simulated write failure".into()));
            }
            Ok(())
        }
    }

    /// Seed one client and one service priced at `price` (e.g. `"50.00"`).
    pub fn sample_client_and_service(repo: &InMemoryBookingRepository, price: &str) -> (client::Model, catalog::Model) {
        let now: chrono::DateTime<chrono::FixedOffset> = Utc::now().into();
        let client = client::Model {
            id: Uuid::new_v4(),
            first_name: "Ana".into(),
            last_name: "Silva".into(),
            email: "ana@example.com".into(),
            phone: "555-0100".into(),
            date_of_birth: None,
            created_at: now,
            updated_at: now,
        };
        let service = catalog::Model {
            id: Uuid::new_v4(),
            title: "Gel Manicure".into(),
            slug: "gel-manicure".into(),
            description: "Gel polish manicure".into(),
            price: price.parse().unwrap_or_default(),
            duration_minutes: Some(60),
            image_ref: None,
            created_at: now,
            updated_at: now,
        };
        repo.insert_client(client.clone());
        repo.insert_service(service.clone());
        (client, service)
    }

    #[async_trait]
    impl BookingRepository for InMemoryBookingRepository {
        async fn find_client(&self, id: Uuid) -> Result<Option<client::Model>, ServiceError> {
            Ok(self.state.lock().unwrap().clients.get(&id).cloned())
        }

        async fn find_service(&self, id: Uuid) -> Result<Option<catalog::Model>, ServiceError> {
            Ok(self.state.lock().unwrap().services.get(&id).cloned())
        }

        async fn insert_booking(
            &self,
            appointment: appointment::Model,
            reservation: Option<payment::Model>,
            reminders: Vec<reminder::Model>,
        ) -> Result<BookingReceipt, ServiceError> {
            self.check_write()?;
            let mut st = self.state.lock().unwrap();
            if !st.clients.contains_key(&appointment.client_id) || !st.services.contains_key(&appointment.service_id) {
                return Err(ServiceError::Conflict("appointment references a missing client or service".into()));
            }
            st.appointments.insert(appointment.id, appointment.clone());
            let payments: Vec<_> = reservation.into_iter().collect();
            st.payments.extend(payments.iter().cloned());
            st.reminders.extend(reminders.iter().cloned());
            Ok(BookingReceipt { appointment, payments, reminders })
        }

        async fn get_appointment(&self, id: Uuid) -> Result<Option<appointment::Model>, ServiceError> {
            Ok(self.state.lock().unwrap().appointments.get(&id).cloned())
        }

        async fn update_appointment(&self, appointment: appointment::Model) -> Result<appointment::Model, ServiceError> {
            self.check_write()?;
            let mut st = self.state.lock().unwrap();
            match st.appointments.get_mut(&appointment.id) {
                Some(slot) => {
                    *slot = appointment.clone();
                    Ok(appointment)
                }
                None => Err(ServiceError::not_found("appointment")),
            }
        }

        async fn settle(
            &self,
            appointment: appointment::Model,
            from: AppointmentStatus,
            payment: Option<payment::Model>,
        ) -> Result<(appointment::Model, Option<payment::Model>), ServiceError> {
            self.check_write()?;
            let mut st = self.state.lock().unwrap();
            let Some(stored) = st.appointments.get(&appointment.id) else {
                return Err(ServiceError::not_found("appointment"));
            };
            if stored.is_deleted || stored.status != from {
                return Err(ServiceError::Conflict(format!("appointment {} changed while completing", appointment.id)));
            }
            let paid: Decimal = st.payments.iter().filter(|p| p.appointment_id == appointment.id).map(|p| p.amount).sum();
            if paid + payment.as_ref().map_or(Decimal::ZERO, |p| p.amount) != stored.service_price {
                return Err(ServiceError::Conflict(format!("ledger of appointment {} changed while completing", appointment.id)));
            }
            if let Some(p) = &payment {
                st.payments.push(p.clone());
            }
            st.appointments.insert(appointment.id, appointment.clone());
            Ok((appointment, payment))
        }

        async fn list_active(&self, client_id: Option<Uuid>, page_idx: u64, per_page: u64) -> Result<(Vec<appointment::Model>, u64), ServiceError> {
            let st = self.state.lock().unwrap();
            let mut rows: Vec<_> = st
                .appointments
                .values()
                .filter(|a| !a.is_deleted)
                .filter(|a| client_id.map_or(true, |c| a.client_id == c))
                .cloned()
                .collect();
            rows.sort_by_key(|a| (a.scheduled_at, a.id));
            let total = rows.len() as u64;
            let page = rows
                .into_iter()
                .skip((page_idx * per_page) as usize)
                .take(per_page as usize)
                .collect();
            Ok((page, total))
        }

        async fn append_payment(&self, payment: payment::Model) -> Result<payment::Model, ServiceError> {
            self.check_write()?;
            let mut st = self.state.lock().unwrap();
            let Some(stored) = st.appointments.get(&payment.appointment_id) else {
                return Err(ServiceError::not_found("appointment"));
            };
            let paid: Decimal = st.payments.iter().filter(|p| p.appointment_id == stored.id).map(|p| p.amount).sum();
            ensure_payment_fits(stored, paid, payment.amount)?;
            st.payments.push(payment.clone());
            Ok(payment)
        }

        async fn payments(&self, appointment_id: Uuid) -> Result<Vec<payment::Model>, ServiceError> {
            let st = self.state.lock().unwrap();
            Ok(st.payments.iter().filter(|p| p.appointment_id == appointment_id).cloned().collect())
        }

        async fn reminders(&self, appointment_id: Uuid) -> Result<Vec<reminder::Model>, ServiceError> {
            let st = self.state.lock().unwrap();
            let mut rs: Vec<_> = st.reminders.iter().filter(|r| r.appointment_id == appointment_id).cloned().collect();
            rs.sort_by_key(|r| r.send_at);
            Ok(rs)
        }

        async fn mark_reminder_sent(&self, id: Uuid) -> Result<Option<reminder::Model>, ServiceError> {
            let mut st = self.state.lock().unwrap();
            let Some(r) = st.reminders.iter_mut().find(|r| r.id == id) else { return Ok(None) };
            if !r.sent {
                r.sent = true;
                r.sent_at = Some(Utc::now().into());
            }
            Ok(Some(r.clone()))
        }

        async fn due_reminders(&self, now: DateTime<Utc>, limit: u64) -> Result<Vec<DueReminder>, ServiceError> {
            let st = self.state.lock().unwrap();
            let mut due: Vec<DueReminder> = st
                .reminders
                .iter()
                .filter(|r| !r.sent && r.send_at <= now)
                .filter_map(|r| {
                    let a = st.appointments.get(&r.appointment_id)?;
                    if a.is_deleted || matches!(a.status, AppointmentStatus::Canceled | AppointmentStatus::Completed) {
                        return None;
                    }
                    let c = st.clients.get(&a.client_id)?;
                    let s = st.services.get(&a.service_id)?;
                    Some(DueReminder { reminder: r.clone(), appointment: a.clone(), client: c.clone(), service_title: s.title.clone() })
                })
                .collect();
            due.sort_by_key(|d| d.reminder.send_at);
            due.truncate(limit as usize);
            Ok(due)
        }
    }
}
