use sea_orm::{entity::prelude::*, DatabaseConnection, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "client")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub phone: String,
    pub date_of_birth: Option<Date>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { match *self {} }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Fields accepted when registering a client.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub date_of_birth: Option<Date>,
}

/// Partial update; `None` leaves the field untouched.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ClientUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<Date>,
}

pub fn validate_name(field: &str, v: &str) -> Result<(), ModelError> {
    let v = v.trim();
    if v.is_empty() { return Err(ModelError::Validation(format!("{field} required"))); }
    if v.chars().count() > 50 { return Err(ModelError::Validation(format!("{field} too long (<=50)"))); }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ModelError::Validation("invalid email".into()));
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') || email.len() > 254 {
        return Err(ModelError::Validation("invalid email".into()));
    }
    Ok(())
}

pub fn validate_phone(phone: &str) -> Result<(), ModelError> {
    let phone = phone.trim();
    if phone.is_empty() || phone.len() > 15 {
        return Err(ModelError::Validation("phone must be 1..=15 characters".into()));
    }
    let allowed = |c: char| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')');
    if !phone.chars().all(allowed) || !phone.chars().any(|c| c.is_ascii_digit()) {
        return Err(ModelError::Validation("phone may only contain digits and + - ( ) spaces".into()));
    }
    Ok(())
}

pub fn validate_date_of_birth(dob: Option<Date>) -> Result<(), ModelError> {
    if let Some(d) = dob {
        if d > Utc::now().date_naive() {
            return Err(ModelError::Validation("date_of_birth cannot be in the future".into()));
        }
    }
    Ok(())
}

pub fn validate_input(input: &ClientInput) -> Result<(), ModelError> {
    validate_name("first_name", &input.first_name)?;
    validate_name("last_name", &input.last_name)?;
    validate_email(&input.email)?;
    validate_phone(&input.phone)?;
    validate_date_of_birth(input.date_of_birth)
}

pub async fn create(db: &DatabaseConnection, input: ClientInput) -> Result<Model, ModelError> {
    validate_input(&input)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        first_name: Set(input.first_name.trim().to_string()),
        last_name: Set(input.last_name.trim().to_string()),
        email: Set(input.email.trim().to_lowercase()),
        phone: Set(input.phone.trim().to_string()),
        date_of_birth: Set(input.date_of_birth),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| ModelError::from_db(e, "client email"))
}

pub async fn update(db: &DatabaseConnection, id: Uuid, upd: ClientUpdate) -> Result<Model, ModelError> {
    let mut am: ActiveModel = Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))?
        .ok_or_else(|| ModelError::NotFound("client not found".into()))?
        .into();
    if let Some(v) = upd.first_name { validate_name("first_name", &v)?; am.first_name = Set(v.trim().to_string()); }
    if let Some(v) = upd.last_name { validate_name("last_name", &v)?; am.last_name = Set(v.trim().to_string()); }
    if let Some(v) = upd.email { validate_email(&v)?; am.email = Set(v.trim().to_lowercase()); }
    if let Some(v) = upd.phone { validate_phone(&v)?; am.phone = Set(v.trim().to_string()); }
    if upd.date_of_birth.is_some() { validate_date_of_birth(upd.date_of_birth)?; am.date_of_birth = Set(upd.date_of_birth); }
    am.updated_at = Set(Utc::now().into());
    am.update(db).await.map_err(|e| ModelError::from_db(e, "client email"))
}
