use sea_orm::{entity::prelude::*, ConnectionTrait, QueryOrder, QuerySelect, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{appointment::{self, AppointmentStatus}, errors::ModelError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "snake_case")]
pub enum ReminderChannel {
    #[sea_orm(string_value = "email")]
    Email,
    #[sea_orm(string_value = "sms")]
    Sms,
}

impl ReminderChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Sms => "sms",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ModelError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "email" => Ok(Self::Email),
            "sms" => Ok(Self::Sms),
            other => Err(ModelError::Validation(format!("unknown reminder channel: {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reminder")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub send_at: DateTimeWithTimeZone,
    pub channel: ReminderChannel,
    pub sent: bool,
    pub sent_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Appointment }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Appointment => Entity::belongs_to(appointment::Entity).from(Column::AppointmentId).to(appointment::Column::Id).into() }
    }
}

impl Related<appointment::Entity> for Entity {
    fn to() -> RelationDef { Relation::Appointment.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn for_appointment<C: ConnectionTrait>(db: &C, appointment_id: Uuid) -> Result<Vec<Model>, ModelError> {
    Entity::find()
        .filter(Column::AppointmentId.eq(appointment_id))
        .order_by_asc(Column::SendAt)
        .all(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))
}

/// Unsent reminders due at or before `now`, oldest first. Reminders of
/// deleted, canceled or completed appointments are never due.
pub async fn due<C: ConnectionTrait>(db: &C, now: DateTimeWithTimeZone, limit: u64) -> Result<Vec<Model>, ModelError> {
    Entity::find()
        .inner_join(appointment::Entity)
        .filter(appointment::Column::IsDeleted.eq(false))
        .filter(appointment::Column::Status.is_not_in([AppointmentStatus::Canceled, AppointmentStatus::Completed]))
        .filter(Column::Sent.eq(false))
        .filter(Column::SendAt.lte(now))
        .order_by_asc(Column::SendAt)
        .limit(limit)
        .all(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))
}

/// Idempotent: an already-sent reminder keeps its original `sent_at`.
pub async fn mark_sent<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Model, ModelError> {
    let found = Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))?
        .ok_or_else(|| ModelError::NotFound(format!("reminder {id}")))?;
    if found.sent {
        return Ok(found);
    }
    let mut am: ActiveModel = found.into();
    am.sent = Set(true);
    am.sent_at = Set(Some(Utc::now().into()));
    am.update(db).await.map_err(|e| ModelError::Db(e.to_string()))
}
