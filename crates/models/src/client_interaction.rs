use sea_orm::{entity::prelude::*, DatabaseConnection, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{client, errors::ModelError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    #[sea_orm(string_value = "appointment")]
    Appointment,
    #[sea_orm(string_value = "complaint")]
    Complaint,
    #[sea_orm(string_value = "inquiry")]
    Inquiry,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "client_interaction")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub client_id: Uuid,
    pub kind: InteractionKind,
    pub notes: String,
    pub occurred_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Client }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Client => Entity::belongs_to(client::Entity).from(Column::ClientId).to(client::Column::Id).into() }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn create(db: &DatabaseConnection, client_id: Uuid, kind: InteractionKind, notes: &str) -> Result<Model, ModelError> {
    if notes.len() > 4000 { return Err(ModelError::Validation("notes too long (<=4000)".into())); }
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        client_id: Set(client_id),
        kind: Set(kind),
        notes: Set(notes.trim().to_string()),
        occurred_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(|e| ModelError::from_db(e, "client"))
}
