use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use common::metrics::{APPOINTMENTS_BOOKED_TOTAL, APPOINTMENT_TRANSITIONS_TOTAL, PAYMENTS_RECORDED_TOTAL};
use models::appointment::{self, AppointmentStatus};
use models::payment::{self, PaymentKind};
use models::reminder;

use super::domain::{
    compute_reservation_fee, ensure_payment_fits, parse_requested_at, schedule_reminders, ActiveFilter, Balance, BookingPolicy,
    BookingReceipt, BookingRequest, CompletionReceipt, MAX_NOTES_LEN,
};
use super::repository::BookingRepository;
use crate::auth::Principal;
use crate::errors::ServiceError;
use crate::pagination::{Page, Pagination};

/// Booking workflow independent of web framework
pub struct BookingService {
    repo: Arc<dyn BookingRepository>,
    policy: BookingPolicy,
}

impl BookingService {
    pub fn new(repo: Arc<dyn BookingRepository>, policy: BookingPolicy) -> Self { Self { repo, policy } }

    /// Book a service: appointment, reservation payment and reminders are written together.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::auth::{Principal, Role};
    /// use service::booking::{BookingService, BookingPolicy, BookingRequest};
    /// use service::booking::repository::mock::InMemoryBookingRepository;
    ///
    /// let repo = Arc::new(InMemoryBookingRepository::new());
    /// let (client, service) = service::booking::repository::mock::sample_client_and_service(&repo, "50.00");
    /// let svc = BookingService::new(repo, BookingPolicy::default());
    /// let who = Principal::new(client.id, Role::Client);
    /// let req = BookingRequest { client_id: None, service_id: service.id, requested_at: "2099-03-01T10:00".into(), notes: None };
    /// let receipt = tokio_test::block_on(svc.create_appointment(&who, req)).unwrap();
    /// assert_eq!(receipt.appointment.reservation_fee, rust_decimal::Decimal::new(500, 2));
    /// assert_eq!(receipt.reminders.len(), 2);
    /// ```
    pub async fn create_appointment(&self, principal: &Principal, request: BookingRequest) -> Result<BookingReceipt, ServiceError> {
        self.create_appointment_at(principal, request, Utc::now()).await
    }

    /// `create_appointment` with an explicit clock.
    #[instrument(skip(self, request), fields(principal = %principal.id, service_id = %request.service_id))]
    pub async fn create_appointment_at(&self, principal: &Principal, request: BookingRequest, now: DateTime<Utc>) -> Result<BookingReceipt, ServiceError> {
        let client_id = request.client_id.unwrap_or(principal.id);
        principal.ensure_can_act_for(client_id)?;
        let scheduled_at = parse_requested_at(&request.requested_at, now)?;
        let notes = request.notes.unwrap_or_default().trim().to_string();
        if notes.chars().count() > MAX_NOTES_LEN {
            return Err(ServiceError::Validation(format!("notes too long (<={MAX_NOTES_LEN})")));
        }

        let client = self.repo.find_client(client_id).await?.ok_or_else(|| ServiceError::not_found("client"))?;
        let service = self.repo.find_service(request.service_id).await?.ok_or_else(|| ServiceError::not_found("service"))?;

        let fee = compute_reservation_fee(service.price, self.policy.fee_percent);
        let appointment = appointment::Model {
            id: Uuid::new_v4(),
            client_id: client.id,
            service_id: service.id,
            scheduled_at: scheduled_at.into(),
            status: AppointmentStatus::Reserved,
            service_price: service.price,
            reservation_fee: fee,
            notes,
            is_deleted: false,
            created_at: now.into(),
            updated_at: now.into(),
        };
        let reservation = (fee > Decimal::ZERO).then(|| payment::Model {
            id: Uuid::new_v4(),
            appointment_id: appointment.id,
            amount: fee,
            kind: PaymentKind::Reservation,
            created_at: now.into(),
        });
        let reminders = schedule_reminders(appointment.id, scheduled_at, &self.policy.reminders);

        let receipt = self.repo.insert_booking(appointment, reservation, reminders).await?;
        APPOINTMENTS_BOOKED_TOTAL.inc();
        if !receipt.payments.is_empty() {
            PAYMENTS_RECORDED_TOTAL.with_label_values(&[PaymentKind::Reservation.as_str()]).inc();
        }
        info!(
            appointment_id = %receipt.appointment.id,
            client_id = %client.id,
            service = %service.slug,
            fee = %fee,
            scheduled_at = %scheduled_at,
            "appointment_booked"
        );
        Ok(receipt)
    }

    /// Read-only view shown after booking.
    pub async fn confirm_booking(&self, id: Uuid) -> Result<appointment::Model, ServiceError> {
        self.get(id).await
    }

    /// Includes soft-deleted appointments.
    pub async fn get(&self, id: Uuid) -> Result<appointment::Model, ServiceError> {
        self.repo.get_appointment(id).await?.ok_or_else(|| ServiceError::not_found("appointment"))
    }

    #[instrument(skip(self))]
    pub async fn confirm(&self, id: Uuid) -> Result<appointment::Model, ServiceError> {
        self.transition(id, AppointmentStatus::Confirmed).await
    }

    #[instrument(skip(self))]
    pub async fn cancel(&self, id: Uuid) -> Result<appointment::Model, ServiceError> {
        self.transition(id, AppointmentStatus::Canceled).await
    }

    async fn transition(&self, id: Uuid, next: AppointmentStatus) -> Result<appointment::Model, ServiceError> {
        let mut current = self.get(id).await?;
        if current.is_deleted {
            return Err(ServiceError::Validation("appointment has been deleted".into()));
        }
        let from = current.status;
        current.status = from.transition(next)?;
        current.updated_at = Utc::now().into();
        let saved = self.repo.update_appointment(current).await?;
        APPOINTMENT_TRANSITIONS_TOTAL.with_label_values(&[next.as_str()]).inc();
        info!(appointment_id = %id, from = %from, to = %next, "appointment_status_changed");
        Ok(saved)
    }

    /// Pay the outstanding balance and complete the appointment in one unit.
    ///
    /// A `reserved` appointment is confirmed on the way to `completed`.
    #[instrument(skip(self))]
    pub async fn complete_payment(&self, id: Uuid) -> Result<CompletionReceipt, ServiceError> {
        let mut current = self.get(id).await?;
        current.ensure_mutable()?;

        let ledger = self.repo.payments(id).await?;
        let balance = Balance::of(&current, &ledger);
        let now = Utc::now();
        let final_payment = (balance.outstanding > Decimal::ZERO).then(|| payment::Model {
            id: Uuid::new_v4(),
            appointment_id: id,
            amount: balance.outstanding,
            kind: PaymentKind::Final,
            created_at: now.into(),
        });

        let from = current.status;
        let mut status = from;
        if status == AppointmentStatus::Reserved {
            status = status.transition(AppointmentStatus::Confirmed)?;
        }
        current.status = status.transition(AppointmentStatus::Completed)?;
        current.updated_at = now.into();

        let (appointment, final_payment) = self.repo.settle(current, from, final_payment).await?;
        APPOINTMENT_TRANSITIONS_TOTAL.with_label_values(&[AppointmentStatus::Completed.as_str()]).inc();
        if let Some(p) = &final_payment {
            PAYMENTS_RECORDED_TOTAL.with_label_values(&[PaymentKind::Final.as_str()]).inc();
            info!(appointment_id = %id, amount = %p.amount, kind = "final", "payment_recorded");
        }
        info!(appointment_id = %id, "appointment_completed");
        Ok(CompletionReceipt { appointment, final_payment })
    }

    /// Hide from active listings; the row stays retrievable by id.
    #[instrument(skip(self))]
    pub async fn soft_delete(&self, id: Uuid) -> Result<appointment::Model, ServiceError> {
        let mut current = self.get(id).await?;
        if current.is_deleted {
            return Ok(current);
        }
        current.is_deleted = true;
        current.updated_at = Utc::now().into();
        let saved = self.repo.update_appointment(current).await?;
        info!(appointment_id = %id, "appointment_soft_deleted");
        Ok(saved)
    }

    pub async fn list_active(&self, filter: ActiveFilter, pagination: Pagination) -> Result<Page<appointment::Model>, ServiceError> {
        let (page_idx, per_page) = pagination.normalize();
        let (items, total) = self.repo.list_active(filter.client_id, page_idx, per_page).await?;
        Ok(Page::new(items, pagination, total))
    }

    /// Append a ledger entry. Amounts must be positive and may not exceed
    /// what is still owed. Final payments are only written by
    /// `complete_payment`, and a booking has at most one reservation payment.
    #[instrument(skip(self), fields(amount = %amount, kind = kind.as_str()))]
    pub async fn record_payment(&self, id: Uuid, amount: Decimal, kind: PaymentKind) -> Result<payment::Model, ServiceError> {
        payment::validate_amount(amount)?;
        let current = self.get(id).await?;
        if kind == PaymentKind::Final {
            return Err(ServiceError::Validation("final payments are recorded by completing the appointment".into()));
        }
        let ledger = self.repo.payments(id).await?;
        if kind == PaymentKind::Reservation && ledger.iter().any(|p| p.kind == PaymentKind::Reservation) {
            return Err(ServiceError::Validation("reservation fee already paid".into()));
        }
        if let Err(e) = ensure_payment_fits(&current, payment::total(&ledger), amount) {
            warn!(appointment_id = %id, err = %e, "payment rejected");
            return Err(e);
        }
        let saved = self
            .repo
            .append_payment(payment::Model {
                id: Uuid::new_v4(),
                appointment_id: id,
                amount,
                kind,
                created_at: Utc::now().into(),
            })
            .await?;
        PAYMENTS_RECORDED_TOTAL.with_label_values(&[kind.as_str()]).inc();
        info!(appointment_id = %id, payment_id = %saved.id, "payment_recorded");
        Ok(saved)
    }

    pub async fn ledger(&self, id: Uuid) -> Result<Vec<payment::Model>, ServiceError> {
        self.get(id).await?;
        self.repo.payments(id).await
    }

    pub async fn balance(&self, id: Uuid) -> Result<Balance, ServiceError> {
        let current = self.get(id).await?;
        let ledger = self.repo.payments(id).await?;
        Ok(Balance::of(&current, &ledger))
    }

    pub async fn reminders(&self, id: Uuid) -> Result<Vec<reminder::Model>, ServiceError> {
        self.get(id).await?;
        self.repo.reminders(id).await
    }

    /// Idempotent.
    #[instrument(skip(self))]
    pub async fn mark_sent(&self, reminder_id: Uuid) -> Result<reminder::Model, ServiceError> {
        self.repo
            .mark_reminder_sent(reminder_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("reminder"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::booking::repository::mock::{sample_client_and_service, InMemoryBookingRepository};
    use chrono::{Duration, TimeZone};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal { Decimal::from_str(s).unwrap() }

    struct Fixture {
        repo: Arc<InMemoryBookingRepository>,
        svc: BookingService,
        client: models::client::Model,
        service: models::catalog::Model,
        staff: Principal,
    }

    fn fixture(price: &str) -> Fixture {
        let repo = Arc::new(InMemoryBookingRepository::new());
        let (client, service) = sample_client_and_service(&repo, price);
        let svc = BookingService::new(repo.clone(), BookingPolicy::default());
        Fixture { repo, svc, client, service, staff: Principal::new(Uuid::new_v4(), Role::Staff) }
    }

    fn request(f: &Fixture, at: &str) -> BookingRequest {
        BookingRequest { client_id: Some(f.client.id), service_id: f.service.id, requested_at: at.into(), notes: Some("french tips".into()) }
    }

    fn now() -> DateTime<Utc> { Utc.with_ymd_and_hms(2030, 5, 1, 9, 0, 0).unwrap() }

    #[tokio::test]
    async fn gel_manicure_scenario() {
        let f = fixture("50.00");
        let receipt = f.svc.create_appointment_at(&f.staff, request(&f, "2030-05-10T15:00"), now()).await.unwrap();
        let a = &receipt.appointment;
        let t = Utc.with_ymd_and_hms(2030, 5, 10, 15, 0, 0).unwrap();

        assert_eq!(a.status, AppointmentStatus::Reserved);
        assert_eq!(a.reservation_fee, dec("5.00"));
        assert_eq!(a.service_price, dec("50.00"));
        assert_eq!(receipt.reminders.len(), 2);
        assert_eq!(receipt.reminders[0].send_at, t - Duration::hours(48));
        assert_eq!(receipt.reminders[1].send_at, t - Duration::hours(4));

        let ledger = f.svc.ledger(a.id).await.unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!((ledger[0].amount, ledger[0].kind), (dec("5.00"), PaymentKind::Reservation));

        let done = f.svc.complete_payment(a.id).await.unwrap();
        assert_eq!(done.appointment.status, AppointmentStatus::Completed);
        let fin = done.final_payment.unwrap();
        assert_eq!((fin.amount, fin.kind), (dec("45.00"), PaymentKind::Final));
        assert_eq!(f.svc.balance(a.id).await.unwrap().outstanding, Decimal::ZERO);
    }

    #[tokio::test]
    async fn completing_hundred_yields_ninety_final() {
        let f = fixture("100.00");
        let r = f.svc.create_appointment_at(&f.staff, request(&f, "2030-05-10T15:00"), now()).await.unwrap();
        f.svc.confirm(r.appointment.id).await.unwrap();
        let done = f.svc.complete_payment(r.appointment.id).await.unwrap();
        assert_eq!(done.final_payment.map(|p| p.amount), Some(dec("90.00")));
    }

    #[tokio::test]
    async fn clients_book_for_themselves_by_default() {
        let f = fixture("30.00");
        let me = Principal::new(f.client.id, Role::Client);
        let req = BookingRequest { client_id: None, ..request(&f, "2030-05-10T15:00") };
        let r = f.svc.create_appointment_at(&me, req, now()).await.unwrap();
        assert_eq!(r.appointment.client_id, f.client.id);

        let stranger = Principal::new(Uuid::new_v4(), Role::Client);
        let err = f.svc.create_appointment_at(&stranger, request(&f, "2030-05-10T15:00"), now()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn booking_validation_and_lookup_errors() {
        let f = fixture("30.00");
        let bad = f.svc.create_appointment_at(&f.staff, request(&f, "next tuesday"), now()).await.unwrap_err();
        assert!(matches!(bad, ServiceError::Validation(_)));
        let past = f.svc.create_appointment_at(&f.staff, request(&f, "2030-04-30T09:00"), now()).await.unwrap_err();
        assert!(matches!(past, ServiceError::Validation(_)));

        let missing_service = BookingRequest { service_id: Uuid::new_v4(), ..request(&f, "2030-05-10T15:00") };
        let err = f.svc.create_appointment_at(&f.staff, missing_service, now()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        let missing_client = BookingRequest { client_id: Some(Uuid::new_v4()), ..request(&f, "2030-05-10T15:00") };
        let err = f.svc.create_appointment_at(&f.staff, missing_client, now()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(f.repo.appointment_count(), 0);
    }

    #[tokio::test]
    async fn failed_booking_writes_nothing() {
        let f = fixture("50.00");
        f.repo.fail_next_write();
        let err = f.svc.create_appointment_at(&f.staff, request(&f, "2030-05-10T15:00"), now()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Db(_)));
        assert_eq!((f.repo.appointment_count(), f.repo.payment_count(), f.repo.reminder_count()), (0, 0, 0));
    }

    #[tokio::test]
    async fn free_service_skips_reservation_payment() {
        let f = fixture("0.00");
        let r = f.svc.create_appointment_at(&f.staff, request(&f, "2030-05-10T15:00"), now()).await.unwrap();
        assert_eq!(r.appointment.reservation_fee, Decimal::ZERO);
        assert!(r.payments.is_empty());
        assert_eq!(r.reminders.len(), 2);
        let done = f.svc.complete_payment(r.appointment.id).await.unwrap();
        assert!(done.final_payment.is_none());
        assert_eq!(done.appointment.status, AppointmentStatus::Completed);
    }

    #[tokio::test]
    async fn soft_deleted_is_hidden_but_retrievable() {
        let f = fixture("50.00");
        let keep = f.svc.create_appointment_at(&f.staff, request(&f, "2030-05-10T15:00"), now()).await.unwrap();
        let gone = f.svc.create_appointment_at(&f.staff, request(&f, "2030-05-11T15:00"), now()).await.unwrap();
        f.svc.soft_delete(gone.appointment.id).await.unwrap();

        assert!(f.svc.get(gone.appointment.id).await.unwrap().is_deleted);
        let page = f.svc.list_active(ActiveFilter { client_id: Some(f.client.id) }, Pagination::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, keep.appointment.id);

        let err = f.svc.complete_payment(gone.appointment.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Model(models::errors::ModelError::Validation(_))));
        let err = f.svc.record_payment(gone.appointment.id, dec("1.00"), PaymentKind::Installment).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn illegal_transitions_fail_validation() {
        let f = fixture("50.00");
        let r = f.svc.create_appointment_at(&f.staff, request(&f, "2030-05-10T15:00"), now()).await.unwrap();
        let id = r.appointment.id;
        f.svc.cancel(id).await.unwrap();
        assert!(f.svc.confirm(id).await.is_err());
        assert!(f.svc.complete_payment(id).await.is_err());
        assert!(matches!(f.svc.record_payment(id, dec("1.00"), PaymentKind::Final).await, Err(ServiceError::Validation(_))));

        let r2 = f.svc.create_appointment_at(&f.staff, request(&f, "2030-05-12T15:00"), now()).await.unwrap();
        f.svc.complete_payment(r2.appointment.id).await.unwrap();
        assert!(f.svc.cancel(r2.appointment.id).await.is_err());
        assert!(f.svc.complete_payment(r2.appointment.id).await.is_err());
    }

    #[tokio::test]
    async fn payments_must_be_positive_and_installments_bounded() {
        let f = fixture("50.00");
        let r = f.svc.create_appointment_at(&f.staff, request(&f, "2030-05-10T15:00"), now()).await.unwrap();
        let id = r.appointment.id;

        for bad in ["0", "-3.00"] {
            let err = f.svc.record_payment(id, dec(bad), PaymentKind::Installment).await.unwrap_err();
            assert!(matches!(err, ServiceError::Model(models::errors::ModelError::Validation(_))));
        }
        assert_eq!(f.svc.ledger(id).await.unwrap().len(), 1);

        assert!(f.svc.record_payment(id, dec("45.01"), PaymentKind::Installment).await.is_err());
        f.svc.record_payment(id, dec("20.00"), PaymentKind::Installment).await.unwrap();
        let bal = f.svc.balance(id).await.unwrap();
        assert_eq!((bal.total_paid, bal.outstanding), (dec("25.00"), dec("25.00")));

        let done = f.svc.complete_payment(id).await.unwrap();
        assert_eq!(done.final_payment.unwrap().amount, dec("25.00"));

        let err = f.svc.record_payment(Uuid::new_v4(), dec("1.00"), PaymentKind::Installment).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn manual_payments_cannot_overpay_or_finish_the_booking() {
        let f = fixture("50.00");
        let r = f.svc.create_appointment_at(&f.staff, request(&f, "2030-05-10T15:00"), now()).await.unwrap();
        let id = r.appointment.id;

        let err = f.svc.record_payment(id, dec("500.00"), PaymentKind::Final).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        let err = f.svc.record_payment(id, dec("45.00"), PaymentKind::Final).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        let err = f.svc.record_payment(id, dec("5.00"), PaymentKind::Reservation).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let bal = f.svc.balance(id).await.unwrap();
        assert_eq!((bal.total_paid, bal.outstanding), (dec("5.00"), dec("45.00")));
        assert_eq!(f.svc.get(id).await.unwrap().status, AppointmentStatus::Reserved);

        f.svc.record_payment(id, dec("45.00"), PaymentKind::Installment).await.unwrap();
        assert!(f.svc.record_payment(id, dec("0.01"), PaymentKind::Installment).await.is_err());
        let done = f.svc.complete_payment(id).await.unwrap();
        assert!(done.final_payment.is_none());
        assert_eq!(f.svc.balance(id).await.unwrap().outstanding, Decimal::ZERO);
    }

    #[tokio::test]
    async fn free_booking_accepts_no_reservation_payment() {
        let f = fixture("0.00");
        let r = f.svc.create_appointment_at(&f.staff, request(&f, "2030-05-10T15:00"), now()).await.unwrap();
        let err = f.svc.record_payment(r.appointment.id, dec("1.00"), PaymentKind::Reservation).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn settle_from_a_stale_read_writes_nothing() {
        let f = fixture("50.00");
        let r = f.svc.create_appointment_at(&f.staff, request(&f, "2030-05-10T15:00"), now()).await.unwrap();
        let stale = f.svc.get(r.appointment.id).await.unwrap();

        f.svc.complete_payment(stale.id).await.unwrap();
        assert_eq!(f.repo.payment_count(), 2);

        // a second completion computed from the same reserved snapshot
        let late = payment::Model {
            id: Uuid::new_v4(),
            appointment_id: stale.id,
            amount: dec("45.00"),
            kind: PaymentKind::Final,
            created_at: Utc::now().into(),
        };
        let mut target = stale.clone();
        target.status = AppointmentStatus::Completed;
        let err = f.repo.settle(target, AppointmentStatus::Reserved, Some(late)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert_eq!(f.repo.payment_count(), 2);
    }

    #[tokio::test]
    async fn settle_rejects_a_ledger_that_moved() {
        let f = fixture("50.00");
        let r = f.svc.create_appointment_at(&f.staff, request(&f, "2030-05-10T15:00"), now()).await.unwrap();
        let stale = f.svc.get(r.appointment.id).await.unwrap();
        // an installment lands after the balance was read
        f.svc.record_payment(stale.id, dec("20.00"), PaymentKind::Installment).await.unwrap();

        let final_on_old_balance = payment::Model {
            id: Uuid::new_v4(),
            appointment_id: stale.id,
            amount: dec("45.00"),
            kind: PaymentKind::Final,
            created_at: Utc::now().into(),
        };
        let mut target = stale.clone();
        target.status = AppointmentStatus::Completed;
        let err = f.repo.settle(target, AppointmentStatus::Reserved, Some(final_on_old_balance)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert_eq!(f.svc.balance(stale.id).await.unwrap().outstanding, dec("25.00"));
    }

    #[tokio::test]
    async fn repository_caps_installments_at_the_price() {
        let f = fixture("50.00");
        let r = f.svc.create_appointment_at(&f.staff, request(&f, "2030-05-10T15:00"), now()).await.unwrap();
        let id = r.appointment.id;
        f.svc.record_payment(id, dec("45.00"), PaymentKind::Installment).await.unwrap();

        // second writer that checked the balance before the first one landed
        let overshoot = payment::Model {
            id: Uuid::new_v4(),
            appointment_id: id,
            amount: dec("45.00"),
            kind: PaymentKind::Installment,
            created_at: Utc::now().into(),
        };
        assert!(matches!(f.repo.append_payment(overshoot).await, Err(ServiceError::Validation(_))));
        assert_eq!(f.svc.ledger(id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn mark_sent_is_idempotent() {
        let f = fixture("50.00");
        let r = f.svc.create_appointment_at(&f.staff, request(&f, "2030-05-10T15:00"), now()).await.unwrap();
        let rid = r.reminders[0].id;
        let first = f.svc.mark_sent(rid).await.unwrap();
        let second = f.svc.mark_sent(rid).await.unwrap();
        assert!(first.sent);
        assert_eq!(first.sent_at, second.sent_at);
        assert!(matches!(f.svc.mark_sent(Uuid::new_v4()).await, Err(ServiceError::NotFound(_))));
        assert!(f.svc.reminders(r.appointment.id).await.unwrap().iter().filter(|x| x.sent).count() == 1);
    }
}
