use sea_orm::{entity::prelude::*, DatabaseConnection, QuerySelect, Set, TransactionTrait};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{client, errors::ModelError};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "client_loyalty")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub client_id: Uuid,
    pub points: i32,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Client }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Client => Entity::belongs_to(client::Entity).from(Column::ClientId).to(client::Column::Id).into() }
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Balance after applying `delta`; the balance never goes negative.
pub fn apply_delta(current: i32, delta: i32) -> Result<i32, ModelError> {
    let next = current
        .checked_add(delta)
        .ok_or_else(|| ModelError::Validation("points overflow".into()))?;
    if next < 0 {
        return Err(ModelError::Validation(format!("insufficient points: have {current}, need {}", delta.unsigned_abs())));
    }
    Ok(next)
}

pub async fn find_by_client(db: &DatabaseConnection, client_id: Uuid) -> Result<Option<Model>, ModelError> {
    Entity::find()
        .filter(Column::ClientId.eq(client_id))
        .one(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))
}

/// Add (or with a negative delta, redeem) points, creating the row on first use.
pub async fn add_points(db: &DatabaseConnection, client_id: Uuid, delta: i32) -> Result<Model, ModelError> {
    let txn = db.begin().await.map_err(|e| ModelError::Db(e.to_string()))?;
    let existing = Entity::find()
        .filter(Column::ClientId.eq(client_id))
        .lock_exclusive()
        .one(&txn)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))?;
    let now = Utc::now().into();
    let saved = match existing {
        Some(row) => {
            let points = apply_delta(row.points, delta)?;
            let mut am: ActiveModel = row.into();
            am.points = Set(points);
            am.updated_at = Set(now);
            am.update(&txn).await.map_err(|e| ModelError::Db(e.to_string()))?
        }
        None => {
            let points = apply_delta(0, delta)?;
            let am = ActiveModel {
                id: Set(Uuid::new_v4()),
                client_id: Set(client_id),
                points: Set(points),
                updated_at: Set(now),
            };
            am.insert(&txn).await.map_err(|e| ModelError::from_db(e, "client loyalty"))?
        }
    };
    txn.commit().await.map_err(|e| ModelError::Db(e.to_string()))?;
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::apply_delta;

    #[test]
    fn earning_and_redeeming() {
        assert_eq!(apply_delta(0, 10).unwrap(), 10);
        assert_eq!(apply_delta(10, -10).unwrap(), 0);
    }

    #[test]
    fn cannot_go_negative() {
        assert!(apply_delta(5, -6).is_err());
        assert!(apply_delta(i32::MAX, 1).is_err());
        let err = apply_delta(0, i32::MIN).unwrap_err();
        assert!(err.to_string().contains("need 2147483648"));
    }
}
