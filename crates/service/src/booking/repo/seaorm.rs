use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Unchanged, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use models::appointment::AppointmentStatus;
use models::errors::ModelError;
use models::{appointment, catalog, client, payment, reminder};
use crate::booking::domain::{ensure_payment_fits, BookingReceipt, DueReminder};
use crate::booking::repository::BookingRepository;
use crate::errors::ServiceError;

pub struct SeaOrmBookingRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmBookingRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn new_appointment(m: &appointment::Model) -> appointment::ActiveModel {
    appointment::ActiveModel {
        id: Set(m.id),
        client_id: Set(m.client_id),
        service_id: Set(m.service_id),
        scheduled_at: Set(m.scheduled_at),
        status: Set(m.status),
        service_price: Set(m.service_price),
        reservation_fee: Set(m.reservation_fee),
        notes: Set(m.notes.clone()),
        is_deleted: Set(m.is_deleted),
        created_at: Set(m.created_at),
        updated_at: Set(m.updated_at),
    }
}

fn changed_appointment(m: &appointment::Model) -> appointment::ActiveModel {
    appointment::ActiveModel {
        id: Unchanged(m.id),
        status: Set(m.status),
        notes: Set(m.notes.clone()),
        is_deleted: Set(m.is_deleted),
        updated_at: Set(m.updated_at),
        ..Default::default()
    }
}

fn new_payment(m: &payment::Model) -> payment::ActiveModel {
    payment::ActiveModel {
        id: Set(m.id),
        appointment_id: Set(m.appointment_id),
        amount: Set(m.amount),
        kind: Set(m.kind),
        created_at: Set(m.created_at),
    }
}

fn new_reminder(m: &reminder::Model) -> reminder::ActiveModel {
    reminder::ActiveModel {
        id: Set(m.id),
        appointment_id: Set(m.appointment_id),
        send_at: Set(m.send_at),
        channel: Set(m.channel),
        sent: Set(m.sent),
        sent_at: Set(m.sent_at),
    }
}

/// `SELECT .. FOR UPDATE`: concurrent payers of one appointment queue here.
async fn lock_appointment<C: ConnectionTrait>(txn: &C, id: Uuid) -> Result<appointment::Model, ServiceError> {
    appointment::Entity::find_by_id(id)
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| ServiceError::not_found("appointment"))
}

async fn paid<C: ConnectionTrait>(txn: &C, appointment_id: Uuid) -> Result<Decimal, ServiceError> {
    Ok(payment::total(&payment::ledger(txn, appointment_id).await?))
}

fn write_err(e: DbErr) -> ServiceError {
    match e {
        DbErr::RecordNotUpdated => ServiceError::not_found("appointment"),
        other => ModelError::from_db(other, "appointment").into(),
    }
}

#[async_trait]
impl BookingRepository for SeaOrmBookingRepository {
    async fn find_client(&self, id: Uuid) -> Result<Option<client::Model>, ServiceError> {
        Ok(client::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn find_service(&self, id: Uuid) -> Result<Option<catalog::Model>, ServiceError> {
        Ok(catalog::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn insert_booking(
        &self,
        appointment: appointment::Model,
        reservation: Option<payment::Model>,
        reminders: Vec<reminder::Model>,
    ) -> Result<BookingReceipt, ServiceError> {
        let txn = self.db.begin().await?;
        let appointment = new_appointment(&appointment).insert(&txn).await.map_err(write_err)?;
        let mut payments = Vec::new();
        if let Some(p) = &reservation {
            payments.push(new_payment(p).insert(&txn).await?);
        }
        let mut saved = Vec::with_capacity(reminders.len());
        for r in &reminders {
            saved.push(new_reminder(r).insert(&txn).await?);
        }
        // dropping `txn` on any early return above rolls everything back
        txn.commit().await?;
        Ok(BookingReceipt { appointment, payments, reminders: saved })
    }

    async fn get_appointment(&self, id: Uuid) -> Result<Option<appointment::Model>, ServiceError> {
        Ok(appointment::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn update_appointment(&self, appointment: appointment::Model) -> Result<appointment::Model, ServiceError> {
        changed_appointment(&appointment).update(&self.db).await.map_err(write_err)
    }

    async fn settle(
        &self,
        appointment: appointment::Model,
        from: AppointmentStatus,
        payment: Option<payment::Model>,
    ) -> Result<(appointment::Model, Option<payment::Model>), ServiceError> {
        let txn = self.db.begin().await?;
        let stored = lock_appointment(&txn, appointment.id).await?;
        if stored.is_deleted || stored.status != from {
            return Err(ServiceError::Conflict(format!("appointment {} changed while completing", appointment.id)));
        }
        let settled = paid(&txn, stored.id).await? + payment.as_ref().map_or(Decimal::ZERO, |p| p.amount);
        if settled != stored.service_price {
            return Err(ServiceError::Conflict(format!("ledger of appointment {} changed while completing", appointment.id)));
        }
        let payment = match &payment {
            Some(p) => Some(new_payment(p).insert(&txn).await?),
            None => None,
        };
        let appointment = changed_appointment(&appointment).update(&txn).await.map_err(write_err)?;
        txn.commit().await?;
        Ok((appointment, payment))
    }

    async fn list_active(&self, client_id: Option<Uuid>, page_idx: u64, per_page: u64) -> Result<(Vec<appointment::Model>, u64), ServiceError> {
        let mut q = appointment::find_active();
        if let Some(c) = client_id {
            q = q.filter(appointment::Column::ClientId.eq(c));
        }
        let paginator = q
            .order_by_asc(appointment::Column::ScheduledAt)
            .order_by_asc(appointment::Column::Id)
            .paginate(&self.db, per_page);
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page_idx).await?;
        Ok((rows, total))
    }

    async fn append_payment(&self, payment: payment::Model) -> Result<payment::Model, ServiceError> {
        let txn = self.db.begin().await?;
        let stored = lock_appointment(&txn, payment.appointment_id).await?;
        ensure_payment_fits(&stored, paid(&txn, stored.id).await?, payment.amount)?;
        let saved = new_payment(&payment)
            .insert(&txn)
            .await
            .map_err(|e| ServiceError::from(ModelError::from_db(e, "payment")))?;
        txn.commit().await?;
        Ok(saved)
    }

    async fn payments(&self, appointment_id: Uuid) -> Result<Vec<payment::Model>, ServiceError> {
        Ok(payment::ledger(&self.db, appointment_id).await?)
    }

    async fn reminders(&self, appointment_id: Uuid) -> Result<Vec<reminder::Model>, ServiceError> {
        Ok(reminder::for_appointment(&self.db, appointment_id).await?)
    }

    async fn mark_reminder_sent(&self, id: Uuid) -> Result<Option<reminder::Model>, ServiceError> {
        match reminder::mark_sent(&self.db, id).await {
            Ok(r) => Ok(Some(r)),
            Err(ModelError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn due_reminders(&self, now: DateTime<Utc>, limit: u64) -> Result<Vec<DueReminder>, ServiceError> {
        let due = reminder::due(&self.db, now.into(), limit).await?;
        if due.is_empty() {
            return Ok(Vec::new());
        }
        let appointment_ids: Vec<Uuid> = due.iter().map(|r| r.appointment_id).collect();
        let appointments: HashMap<Uuid, appointment::Model> = appointment::Entity::find()
            .filter(appointment::Column::Id.is_in(appointment_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();
        let client_ids: Vec<Uuid> = appointments.values().map(|a| a.client_id).collect();
        let service_ids: Vec<Uuid> = appointments.values().map(|a| a.service_id).collect();
        let clients: HashMap<Uuid, client::Model> = client::Entity::find()
            .filter(client::Column::Id.is_in(client_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();
        let titles: HashMap<Uuid, String> = catalog::Entity::find()
            .filter(catalog::Column::Id.is_in(service_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|s| (s.id, s.title))
            .collect();

        Ok(due
            .into_iter()
            .filter_map(|r| {
                let a = appointments.get(&r.appointment_id)?.clone();
                let c = clients.get(&a.client_id)?.clone();
                let t = titles.get(&a.service_id)?.clone();
                Some(DueReminder { reminder: r, appointment: a, client: c, service_title: t })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;
    use models::payment::PaymentKind;
    use models::reminder::ReminderChannel;

    use super::*;
    use crate::auth::{Principal, Role};
    use crate::booking::{BookingPolicy, BookingRequest, BookingService};
    use crate::test_support::get_db;

    async fn seed(db: &DatabaseConnection) -> anyhow::Result<(client::Model, catalog::Model)> {
        let c = client::create(db, client::ClientInput {
            first_name: "Mara".into(),
            last_name: "Quinn".into(),
            email: format!("mara_{}@example.com", Uuid::new_v4()),
            phone: "555-0150".into(),
            date_of_birth: None,
        })
        .await?;
        let s = catalog::create(db, catalog::ServiceInput {
            title: format!("Spa Pedicure {}", Uuid::new_v4()),
            slug: None,
            description: "soak, scrub and polish".into(),
            price: Decimal::new(5000, 2),
            duration_minutes: Some(45),
            image_ref: None,
        })
        .await?;
        Ok((c, s))
    }

    async fn cleanup(db: &DatabaseConnection, c: &client::Model, s: &catalog::Model) -> anyhow::Result<()> {
        appointment::Entity::delete_many().filter(appointment::Column::ClientId.eq(c.id)).exec(db).await?;
        catalog::Entity::delete_by_id(s.id).exec(db).await?;
        client::Entity::delete_by_id(c.id).exec(db).await?;
        Ok(())
    }

    fn booking_service(db: &DatabaseConnection) -> (Arc<SeaOrmBookingRepository>, BookingService) {
        let repo = Arc::new(SeaOrmBookingRepository::new(db.clone()));
        (repo.clone(), BookingService::new(repo, BookingPolicy::default()))
    }

    fn in_hours(c: &client::Model, s: &catalog::Model, hours: i64) -> BookingRequest {
        BookingRequest {
            client_id: Some(c.id),
            service_id: s.id,
            requested_at: (Utc::now() + Duration::hours(hours)).to_rfc3339(),
            notes: None,
        }
    }

    #[tokio::test]
    async fn failed_reminder_insert_rolls_back_booking() -> anyhow::Result<()> {
        let Some(db) = get_db().await else { return Ok(()) };
        let (c, s) = seed(&db).await?;
        let repo = SeaOrmBookingRepository::new(db.clone());

        let now: chrono::DateTime<chrono::FixedOffset> = Utc::now().into();
        let a = appointment::Model {
            id: Uuid::new_v4(),
            client_id: c.id,
            service_id: s.id,
            scheduled_at: now + Duration::days(2),
            status: AppointmentStatus::Reserved,
            service_price: s.price,
            reservation_fee: Decimal::new(500, 2),
            notes: String::new(),
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        let fee = payment::Model { id: Uuid::new_v4(), appointment_id: a.id, amount: Decimal::new(500, 2), kind: PaymentKind::Reservation, created_at: now };
        // points at an appointment that does not exist: FK violation mid-transaction
        let orphan = reminder::Model { id: Uuid::new_v4(), appointment_id: Uuid::new_v4(), send_at: now, channel: ReminderChannel::Email, sent: false, sent_at: None };

        assert!(repo.insert_booking(a.clone(), Some(fee), vec![orphan]).await.is_err());
        assert!(repo.get_appointment(a.id).await?.is_none());
        assert!(repo.payments(a.id).await?.is_empty());

        cleanup(&db, &c, &s).await
    }

    #[tokio::test]
    async fn concurrent_completions_write_one_final_payment() -> anyhow::Result<()> {
        let Some(db) = get_db().await else { return Ok(()) };
        let (c, s) = seed(&db).await?;
        let (repo, svc) = booking_service(&db);
        let staff = Principal::new(Uuid::new_v4(), Role::Staff);
        let id = svc.create_appointment(&staff, in_hours(&c, &s, 72)).await?.appointment.id;

        let (a, b) = tokio::join!(svc.complete_payment(id), svc.complete_payment(id));
        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);

        let ledger = repo.payments(id).await?;
        let finals: Vec<_> = ledger.iter().filter(|p| p.kind == PaymentKind::Final).collect();
        assert_eq!(finals.len(), 1);
        assert_eq!(finals[0].amount, Decimal::new(4500, 2));
        assert_eq!(repo.get_appointment(id).await?.map(|x| x.status), Some(AppointmentStatus::Completed));

        cleanup(&db, &c, &s).await
    }

    #[tokio::test]
    async fn concurrent_installments_never_overpay() -> anyhow::Result<()> {
        let Some(db) = get_db().await else { return Ok(()) };
        let (c, s) = seed(&db).await?;
        let (_, svc) = booking_service(&db);
        let staff = Principal::new(Uuid::new_v4(), Role::Staff);
        let id = svc.create_appointment(&staff, in_hours(&c, &s, 72)).await?.appointment.id;

        let thirty = Decimal::new(3000, 2);
        let (a, b) = tokio::join!(
            svc.record_payment(id, thirty, PaymentKind::Installment),
            svc.record_payment(id, thirty, PaymentKind::Installment)
        );
        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
        assert_eq!(svc.balance(id).await?.total_paid, Decimal::new(3500, 2));

        cleanup(&db, &c, &s).await
    }

    #[tokio::test]
    async fn settle_rejects_stale_status() -> anyhow::Result<()> {
        let Some(db) = get_db().await else { return Ok(()) };
        let (c, s) = seed(&db).await?;
        let (repo, svc) = booking_service(&db);
        let staff = Principal::new(Uuid::new_v4(), Role::Staff);
        let booked = svc.create_appointment(&staff, in_hours(&c, &s, 72)).await?.appointment;
        svc.cancel(booked.id).await?;

        let mut target = booked.clone();
        target.status = AppointmentStatus::Completed;
        let fin = payment::Model { id: Uuid::new_v4(), appointment_id: booked.id, amount: Decimal::new(4500, 2), kind: PaymentKind::Final, created_at: Utc::now().into() };
        let err = repo.settle(target, AppointmentStatus::Reserved, Some(fin)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert_eq!(repo.payments(booked.id).await?.len(), 1);

        cleanup(&db, &c, &s).await
    }

    #[tokio::test]
    async fn due_reminders_join_client_and_service() -> anyhow::Result<()> {
        let Some(db) = get_db().await else { return Ok(()) };
        let (c, s) = seed(&db).await?;
        let (repo, svc) = booking_service(&db);
        let staff = Principal::new(Uuid::new_v4(), Role::Staff);
        // 48h email reminder is already past, 4h sms is not
        let id = svc.create_appointment(&staff, in_hours(&c, &s, 5)).await?.appointment.id;

        let due = repo.due_reminders(Utc::now(), 10_000).await?;
        let mine: Vec<_> = due.iter().filter(|d| d.appointment.id == id).collect();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].reminder.channel, ReminderChannel::Email);
        assert_eq!(mine[0].client.email, c.email);
        assert_eq!(mine[0].service_title, s.title);

        svc.cancel(id).await?;
        let due = repo.due_reminders(Utc::now(), 10_000).await?;
        assert!(due.iter().all(|d| d.appointment.id != id));

        cleanup(&db, &c, &s).await
    }
}
