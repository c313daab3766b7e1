use uuid::Uuid;
use sea_orm::{DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, ColumnTrait, PaginatorTrait, Condition};
use sea_orm::sea_query::{Expr, Func};
use serde::Serialize;
use tracing::{info, instrument};

use models::{client, client_interaction, client_loyalty};
use models::client_interaction::InteractionKind;
use crate::auth::Role;
use crate::errors::ServiceError;
use crate::pagination::{Page, Pagination};

/// Points held by a client; zero when no loyalty row exists yet.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LoyaltyBalance {
    pub client_id: Uuid,
    pub points: i32,
}

/// Register a client.
#[instrument(skip(db, input), fields(email = %input.email))]
pub async fn create_client(db: &DatabaseConnection, input: client::ClientInput) -> Result<client::Model, ServiceError> {
    let created = client::create(db, input).await?;
    info!(client_id = %created.id, "client_created");
    Ok(created)
}

/// Get client by id.
pub async fn get_client(db: &DatabaseConnection, id: Uuid) -> Result<Option<client::Model>, ServiceError> {
    Ok(client::Entity::find_by_id(id).one(db).await?)
}

pub async fn update_client(db: &DatabaseConnection, id: Uuid, upd: client::ClientUpdate) -> Result<client::Model, ServiceError> {
    Ok(client::update(db, id, upd).await?)
}

/// List clients by name, optionally filtered by a case-insensitive search on name or email.
pub async fn list_clients(db: &DatabaseConnection, pagination: Pagination, search: Option<&str>) -> Result<Page<client::Model>, ServiceError> {
    let (page_idx, per_page) = pagination.normalize();
    let mut q = client::Entity::find();
    if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = format!("%{}%", term.to_lowercase());
        q = q.filter(
            Condition::any()
                .add(Expr::expr(Func::lower(Expr::col(client::Column::FirstName))).like(pattern.clone()))
                .add(Expr::expr(Func::lower(Expr::col(client::Column::LastName))).like(pattern.clone()))
                .add(Expr::expr(Func::lower(Expr::col(client::Column::Email))).like(pattern)),
        );
    }
    let paginator = q
        .order_by_asc(client::Column::LastName)
        .order_by_asc(client::Column::FirstName)
        .paginate(db, per_page);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page_idx).await?;
    Ok(Page::new(items, pagination, total))
}

async fn ensure_client(db: &DatabaseConnection, client_id: Uuid) -> Result<(), ServiceError> {
    get_client(db, client_id).await?.map(|_| ()).ok_or_else(|| ServiceError::not_found("client"))
}

#[instrument(skip(db, notes))]
pub async fn record_interaction(db: &DatabaseConnection, client_id: Uuid, kind: InteractionKind, notes: &str) -> Result<client_interaction::Model, ServiceError> {
    ensure_client(db, client_id).await?;
    Ok(client_interaction::create(db, client_id, kind, notes).await?)
}

/// Interactions for a client, newest first.
pub async fn list_interactions(db: &DatabaseConnection, client_id: Uuid) -> Result<Vec<client_interaction::Model>, ServiceError> {
    ensure_client(db, client_id).await?;
    Ok(client_interaction::Entity::find()
        .filter(client_interaction::Column::ClientId.eq(client_id))
        .order_by_desc(client_interaction::Column::OccurredAt)
        .all(db)
        .await?)
}

/// Award (or redeem, with a negative delta) loyalty points. Staff only.
#[instrument(skip(db))]
pub async fn add_loyalty_points(db: &DatabaseConnection, role: Role, client_id: Uuid, delta: i32) -> Result<LoyaltyBalance, ServiceError> {
    role.ensure_staff("adjusting loyalty points")?;
    ensure_client(db, client_id).await?;
    let row = client_loyalty::add_points(db, client_id, delta).await?;
    info!(client_id = %client_id, delta, points = row.points, "loyalty_adjusted");
    Ok(LoyaltyBalance { client_id, points: row.points })
}

pub async fn get_loyalty(db: &DatabaseConnection, client_id: Uuid) -> Result<LoyaltyBalance, ServiceError> {
    ensure_client(db, client_id).await?;
    let points = client_loyalty::find_by_client(db, client_id).await?.map(|r| r.points).unwrap_or(0);
    Ok(LoyaltyBalance { client_id, points })
}
