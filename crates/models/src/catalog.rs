//! Bookable salon services.
//!
//! Table is named `salon_service` so it does not read as the `service` crate.
//! The slug is derived from the title when absent and never changes after the
//! row is created.
use sea_orm::{entity::prelude::*, DatabaseConnection, QueryOrder, QuerySelect, Set};
use uuid::Uuid;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

pub const MAX_SLUG_LEN: usize = 120;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "salon_service")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub description: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,
    pub duration_minutes: Option<i32>,
    pub image_ref: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { match *self {} }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceInput {
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub duration_minutes: Option<i32>,
    #[serde(default)]
    pub image_ref: Option<String>,
}

/// Slug is deliberately absent: it is fixed at creation.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ServiceUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub duration_minutes: Option<i32>,
    pub image_ref: Option<String>,
}

/// Lowercase ASCII slug; runs of anything else collapse to a single `-`.
pub fn slugify(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out.truncate(MAX_SLUG_LEN);
    out.trim_end_matches('-').to_string()
}

pub fn validate_slug(slug: &str) -> Result<(), ModelError> {
    if slug.is_empty() {
        return Err(ModelError::Validation("slug must not be empty".into()));
    }
    if slug.len() > MAX_SLUG_LEN {
        return Err(ModelError::Validation(format!("slug too long (<={MAX_SLUG_LEN})")));
    }
    if !slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
        return Err(ModelError::Validation("slug may only contain a-z, 0-9 and '-'".into()));
    }
    if slug.starts_with('-') || slug.ends_with('-') || slug.contains("--") {
        return Err(ModelError::Validation("slug has misplaced '-'".into()));
    }
    Ok(())
}

pub fn validate_title(title: &str) -> Result<(), ModelError> {
    let t = title.trim();
    if t.is_empty() { return Err(ModelError::Validation("title required".into())); }
    if t.chars().count() > 100 { return Err(ModelError::Validation("title too long (<=100)".into())); }
    Ok(())
}

pub fn validate_price(price: Decimal) -> Result<(), ModelError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ModelError::Validation("price must be >= 0".into()));
    }
    if price.scale() > 2 && price.round_dp(2) != price {
        return Err(ModelError::Validation("price has more than 2 decimal places".into()));
    }
    if price >= Decimal::new(100_000_000, 0) {
        return Err(ModelError::Validation("price exceeds 99999999.99".into()));
    }
    Ok(())
}

pub fn validate_duration(minutes: Option<i32>) -> Result<(), ModelError> {
    match minutes {
        Some(m) if m <= 0 => Err(ModelError::Validation("duration_minutes must be > 0".into())),
        _ => Ok(()),
    }
}

fn validate_image_ref(image_ref: &Option<String>) -> Result<(), ModelError> {
    match image_ref {
        Some(r) if r.len() > 255 => Err(ModelError::Validation("image_ref too long (<=255)".into())),
        _ => Ok(()),
    }
}

/// Validate input and resolve the slug that will be stored.
pub fn prepare(input: &ServiceInput) -> Result<String, ModelError> {
    validate_title(&input.title)?;
    validate_price(input.price)?;
    validate_duration(input.duration_minutes)?;
    validate_image_ref(&input.image_ref)?;
    let slug = match input.slug.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => slugify(&input.title),
    };
    validate_slug(&slug)?;
    Ok(slug)
}

pub async fn create(db: &DatabaseConnection, input: ServiceInput) -> Result<Model, ModelError> {
    let slug = prepare(&input)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(input.title.trim().to_string()),
        slug: Set(slug),
        description: Set(input.description),
        price: Set(input.price.round_dp(2)),
        duration_minutes: Set(input.duration_minutes),
        image_ref: Set(input.image_ref),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| ModelError::from_db(e, "service slug"))
}

pub async fn update(db: &DatabaseConnection, id: Uuid, upd: ServiceUpdate) -> Result<Model, ModelError> {
    let mut am: ActiveModel = Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))?
        .ok_or_else(|| ModelError::NotFound("service not found".into()))?
        .into();
    if let Some(t) = upd.title { validate_title(&t)?; am.title = Set(t.trim().to_string()); }
    if let Some(d) = upd.description { am.description = Set(d); }
    if let Some(p) = upd.price { validate_price(p)?; am.price = Set(p.round_dp(2)); }
    if upd.duration_minutes.is_some() { validate_duration(upd.duration_minutes)?; am.duration_minutes = Set(upd.duration_minutes); }
    if upd.image_ref.is_some() { validate_image_ref(&upd.image_ref)?; am.image_ref = Set(upd.image_ref); }
    am.updated_at = Set(Utc::now().into());
    am.update(db).await.map_err(|e| ModelError::Db(e.to_string()))
}

pub async fn find_by_slug(db: &DatabaseConnection, slug: &str) -> Result<Option<Model>, ModelError> {
    Entity::find()
        .filter(Column::Slug.eq(slug))
        .one(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))
}

/// First `limit` services in catalog order, for landing pages.
pub async fn first_n(db: &DatabaseConnection, limit: u64) -> Result<Vec<Model>, ModelError> {
    Entity::find()
        .order_by_asc(Column::CreatedAt)
        .limit(limit)
        .all(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))
}

/// Deleting a service that appointments still reference surfaces as `Conflict`.
pub async fn hard_delete(db: &DatabaseConnection, id: Uuid) -> Result<(), ModelError> {
    let res = Entity::delete_by_id(id)
        .exec(db)
        .await
        .map_err(|e| ModelError::from_db(e, "service"))?;
    if res.rows_affected == 0 {
        return Err(ModelError::NotFound("service not found".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Gel Manicure"), "gel-manicure");
        assert_eq!(slugify("  Spa -- Pedicure!! "), "spa-pedicure");
        assert_eq!(slugify("Nail Art 2.0"), "nail-art-2-0");
        assert_eq!(slugify("Ünïcode"), "n-code");
    }

    #[test]
    fn slug_validation() {
        assert!(validate_slug("gel-manicure").is_ok());
        assert!(validate_slug("").is_err());
        assert!(validate_slug("Gel").is_err());
        assert!(validate_slug("-gel").is_err());
        assert!(validate_slug("gel--x").is_err());
    }

    #[test]
    fn prepare_derives_slug_when_absent() {
        let input = ServiceInput {
            title: "French Tips".into(),
            slug: None,
            description: String::new(),
            price: Decimal::from_str("35.00").unwrap(),
            duration_minutes: Some(45),
            image_ref: None,
        };
        assert_eq!(prepare(&input).unwrap(), "french-tips");
        let explicit = ServiceInput { slug: Some("tips".into()), ..input.clone() };
        assert_eq!(prepare(&explicit).unwrap(), "tips");
        let blank = ServiceInput { slug: Some("   ".into()), ..input };
        assert_eq!(prepare(&blank).unwrap(), "french-tips");
    }

    #[test]
    fn price_rules() {
        assert!(validate_price(Decimal::ZERO).is_ok());
        assert!(validate_price(Decimal::from_str("49.99").unwrap()).is_ok());
        assert!(validate_price(Decimal::from_str("-0.01").unwrap()).is_err());
        assert!(validate_price(Decimal::from_str("1.005").unwrap()).is_err());
        assert!(validate_duration(Some(0)).is_err());
        assert!(validate_duration(None).is_ok());
    }
}
