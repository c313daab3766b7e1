use sea_orm::{entity::prelude::*, ConnectionTrait, QueryOrder};
use async_trait::async_trait;
use uuid::Uuid;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{appointment, errors::ModelError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    #[sea_orm(string_value = "reservation")]
    Reservation,
    #[sea_orm(string_value = "final")]
    Final,
    #[sea_orm(string_value = "installment")]
    Installment,
}

impl PaymentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reservation => "reservation",
            Self::Final => "final",
            Self::Installment => "installment",
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub appointment_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub amount: Decimal,
    pub kind: PaymentKind,
    pub created_at: DateTimeWithTimeZone,
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

// 账本只追加：更新与删除一律拒绝
#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if !insert {
            return Err(DbErr::Custom("payments are append-only".into()));
        }
        Ok(self)
    }

    async fn before_delete<C>(self, _db: &C) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        Err(DbErr::Custom("payments are append-only".into()))
    }
}

pub fn validate_amount(amount: Decimal) -> Result<(), ModelError> {
    if amount <= Decimal::ZERO {
        return Err(ModelError::Validation("payment amount must be > 0".into()));
    }
    if amount.round_dp(2) != amount {
        return Err(ModelError::Validation("payment amount has more than 2 decimal places".into()));
    }
    Ok(())
}

pub async fn ledger<C: ConnectionTrait>(db: &C, appointment_id: Uuid) -> Result<Vec<Model>, ModelError> {
    Entity::find()
        .filter(Column::AppointmentId.eq(appointment_id))
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))
}

pub fn total(payments: &[Model]) -> Decimal {
    payments.iter().map(|p| p.amount).sum()
}
