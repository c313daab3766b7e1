use super::setup_test_db;
use crate::appointment::{self, AppointmentStatus};
use crate::payment::{self, PaymentKind};
use crate::reminder::{self, ReminderChannel};
use crate::{catalog, client, errors::ModelError};
use anyhow::Result;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, ColumnTrait, Set};
use std::str::FromStr;
use uuid::Uuid;

async fn seed(db: &DatabaseConnection) -> Result<(client::Model, catalog::Model, appointment::Model)> {
    let c = client::create(db, client::ClientInput {
        first_name: "Ivy".into(),
        last_name: "Chen".into(),
        email: format!("ivy_{}@example.com", Uuid::new_v4()),
        phone: "555-0102".into(),
        date_of_birth: None,
    }).await?;
    let s = catalog::create(db, catalog::ServiceInput {
        title: format!("Gel Manicure {}", Uuid::new_v4()),
        slug: None,
        description: "long-lasting gel".into(),
        price: Decimal::from_str("50.00")?,
        duration_minutes: Some(60),
        image_ref: None,
    }).await?;
    let now = Utc::now();
    let a = appointment::ActiveModel {
        id: Set(Uuid::new_v4()),
        client_id: Set(c.id),
        service_id: Set(s.id),
        scheduled_at: Set((now + Duration::days(3)).into()),
        status: Set(AppointmentStatus::Reserved),
        service_price: Set(s.price),
        reservation_fee: Set(Decimal::from_str("5.00")?),
        notes: Set(String::new()),
        is_deleted: Set(false),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }.insert(db).await?;
    Ok((c, s, a))
}

async fn cleanup(db: &DatabaseConnection, c: &client::Model, s: &catalog::Model, a: &appointment::Model) -> Result<()> {
    appointment::Entity::delete_by_id(a.id).exec(db).await?;
    catalog::Entity::delete_by_id(s.id).exec(db).await?;
    client::Entity::delete_by_id(c.id).exec(db).await?;
    Ok(())
}

#[tokio::test]
async fn test_soft_delete_flag_hides_from_active_listing() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };
    let (c, s, a) = seed(&db).await?;

    let mut am: appointment::ActiveModel = a.clone().into();
    am.is_deleted = Set(true);
    am.update(&db).await?;

    let kept = appointment::Entity::find_by_id(a.id).one(&db).await?;
    assert!(kept.is_some_and(|row| row.is_deleted));
    let active = appointment::find_active()
        .filter(appointment::Column::ClientId.eq(c.id))
        .count(&db)
        .await?;
    assert_eq!(active, 0);

    cleanup(&db, &c, &s, &a).await
}

#[tokio::test]
async fn test_status_column_round_trips() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };
    let (c, s, a) = seed(&db).await?;

    let mut am: appointment::ActiveModel = a.clone().into();
    am.status = Set(AppointmentStatus::Canceled);
    am.update(&db).await?;
    let stored = appointment::Entity::find_by_id(a.id).one(&db).await?.map(|row| row.status);
    assert_eq!(stored, Some(AppointmentStatus::Canceled));

    cleanup(&db, &c, &s, &a).await
}

#[tokio::test]
async fn test_payment_ledger_is_append_only() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };
    let (c, s, a) = seed(&db).await?;

    let p = payment::ActiveModel {
        id: Set(Uuid::new_v4()),
        appointment_id: Set(a.id),
        amount: Set(Decimal::from_str("5.00")?),
        kind: Set(PaymentKind::Reservation),
        created_at: Set(Utc::now().into()),
    }.insert(&db).await?;

    let mut am: payment::ActiveModel = p.clone().into();
    am.amount = Set(Decimal::from_str("1.00")?);
    assert!(am.update(&db).await.is_err());
    let am: payment::ActiveModel = p.clone().into();
    assert!(am.delete(&db).await.is_err());

    let ledger = payment::ledger(&db, a.id).await?;
    assert_eq!(ledger.len(), 1);
    assert_eq!(payment::total(&ledger), Decimal::from_str("5.00")?);

    // appointment removal cascades to its ledger
    cleanup(&db, &c, &s, &a).await?;
    assert!(payment::Entity::find_by_id(p.id).one(&db).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_service_delete_restricted_while_booked() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };
    let (c, s, a) = seed(&db).await?;

    let err = catalog::hard_delete(&db, s.id).await;
    assert!(matches!(err, Err(ModelError::Conflict(_))));

    cleanup(&db, &c, &s, &a).await
}

#[tokio::test]
async fn test_reminder_mark_sent_idempotent() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };
    let (c, s, a) = seed(&db).await?;

    let r = reminder::ActiveModel {
        id: Set(Uuid::new_v4()),
        appointment_id: Set(a.id),
        send_at: Set((Utc::now() - Duration::minutes(1)).into()),
        channel: Set(ReminderChannel::Email),
        sent: Set(false),
        sent_at: Set(None),
    }.insert(&db).await?;

    let due = reminder::due(&db, Utc::now().into(), 500).await?;
    assert!(due.iter().any(|d| d.id == r.id));

    let first = reminder::mark_sent(&db, r.id).await?;
    let second = reminder::mark_sent(&db, r.id).await?;
    assert!(first.sent);
    assert_eq!(first.sent_at, second.sent_at);
    assert!(matches!(reminder::mark_sent(&db, Uuid::new_v4()).await, Err(ModelError::NotFound(_))));

    cleanup(&db, &c, &s, &a).await
}
