//! Appointment aggregate root and its status machine.
//!
//! ```text
//! reserved ──► confirmed ──► completed
//!     │            │
//!     └──► canceled ◄┘
//! ```
//!
//! Rows are never removed by the application; `is_deleted` hides them from
//! [`find_active`] while keeping them addressable by id.
use sea_orm::entity::prelude::*;
use uuid::Uuid;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{catalog, client, errors::ModelError, payment, reminder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[sea_orm(string_value = "reserved")]
    Reserved,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "canceled")]
    Canceled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reserved => "reserved",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Canceled => "canceled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Canceled)
    }

    pub fn can_transition_to(&self, next: Self) -> bool {
        use AppointmentStatus::*;
        matches!(
            (self, next),
            (Reserved, Confirmed) | (Reserved, Canceled) | (Confirmed, Completed) | (Confirmed, Canceled)
        )
    }

    /// Checked transition; illegal moves are validation failures.
    pub fn transition(self, next: Self) -> Result<Self, ModelError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(ModelError::Validation(format!(
                "cannot move appointment from {} to {}",
                self.as_str(),
                next.as_str()
            )))
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "appointment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub client_id: Uuid,
    pub service_id: Uuid,
    pub scheduled_at: DateTimeWithTimeZone,
    pub status: AppointmentStatus,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub service_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub reservation_fee: Decimal,
    pub notes: String,
    pub is_deleted: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Client,
    Service,
    Payment,
    Reminder,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Client => Entity::belongs_to(client::Entity).from(Column::ClientId).to(client::Column::Id).into(),
            Relation::Service => Entity::belongs_to(catalog::Entity).from(Column::ServiceId).to(catalog::Column::Id).into(),
            Relation::Payment => Entity::has_many(payment::Entity).into(),
            Relation::Reminder => Entity::has_many(reminder::Entity).into(),
        }
    }
}

impl Related<payment::Entity> for Entity {
    fn to() -> RelationDef { Relation::Payment.def() }
}

impl Related<reminder::Entity> for Entity {
    fn to() -> RelationDef { Relation::Reminder.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Mutations are refused on soft-deleted or terminal appointments.
    pub fn ensure_mutable(&self) -> Result<(), ModelError> {
        if self.is_deleted {
            return Err(ModelError::Validation("appointment has been deleted".into()));
        }
        if self.status.is_terminal() {
            return Err(ModelError::Validation(format!("appointment is already {}", self.status)));
        }
        Ok(())
    }
}

/// The only query path for listings: soft-deleted rows never appear.
pub fn find_active() -> Select<Entity> {
    Entity::find().filter(Column::IsDeleted.eq(false))
}
