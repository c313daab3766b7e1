use rust_decimal::Decimal;
use uuid::Uuid;
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder, PaginatorTrait};
use tracing::{info, instrument};

use models::catalog;
use crate::auth::Role;
use crate::errors::ServiceError;
use crate::pagination::{Page, Pagination};

/// Create a service. Staff or admin only; a duplicate slug is a conflict.
#[instrument(skip(db, input), fields(title = %input.title))]
pub async fn create_service(db: &DatabaseConnection, role: Role, input: catalog::ServiceInput) -> Result<catalog::Model, ServiceError> {
    role.ensure_staff("creating a service")?;
    let slug = catalog::prepare(&input)?;
    if catalog::find_by_slug(db, &slug).await?.is_some() {
        return Err(ServiceError::Conflict(format!("service slug '{slug}' already exists")));
    }
    let created = catalog::create(db, catalog::ServiceInput { slug: Some(slug), ..input }).await?;
    info!(service_id = %created.id, slug = %created.slug, "service_created");
    Ok(created)
}

/// Update mutable fields. The slug stays as created.
#[instrument(skip(db, upd))]
pub async fn update_service(db: &DatabaseConnection, role: Role, id: Uuid, upd: catalog::ServiceUpdate) -> Result<catalog::Model, ServiceError> {
    role.ensure_staff("updating a service")?;
    Ok(catalog::update(db, id, upd).await?)
}

/// Remove a service that no appointment references.
#[instrument(skip(db))]
pub async fn delete_service(db: &DatabaseConnection, role: Role, id: Uuid) -> Result<(), ServiceError> {
    role.ensure_staff("deleting a service")?;
    catalog::hard_delete(db, id).await?;
    info!(service_id = %id, "service_deleted");
    Ok(())
}

pub async fn get_service(db: &DatabaseConnection, id: Uuid) -> Result<Option<catalog::Model>, ServiceError> {
    Ok(catalog::Entity::find_by_id(id).one(db).await?)
}

pub async fn get_service_by_slug(db: &DatabaseConnection, slug: &str) -> Result<Option<catalog::Model>, ServiceError> {
    Ok(catalog::find_by_slug(db, slug).await?)
}

pub async fn list_services(db: &DatabaseConnection, pagination: Pagination) -> Result<Page<catalog::Model>, ServiceError> {
    let (page_idx, per_page) = pagination.normalize();
    let paginator = catalog::Entity::find()
        .order_by_asc(catalog::Column::Title)
        .paginate(db, per_page);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page_idx).await?;
    Ok(Page::new(items, pagination, total))
}

/// First `limit` services (capped at 50) for the landing page.
pub async fn popular_services(db: &DatabaseConnection, limit: u64) -> Result<Vec<catalog::Model>, ServiceError> {
    Ok(catalog::first_n(db, limit.clamp(1, 50)).await?)
}

/// Starter menu loaded by the `seed` binary.
pub fn default_catalog() -> Vec<catalog::ServiceInput> {
    let item = |title: &str, description: &str, cents: i64, minutes: i32| catalog::ServiceInput {
        title: title.into(),
        slug: None,
        description: description.into(),
        price: Decimal::new(cents, 2),
        duration_minutes: Some(minutes),
        image_ref: Some(format!("{}.png", title.to_lowercase().replace(' ', "_"))),
    };
    vec![
        item("Basic Manicure", "A classic manicure that includes nail shaping, cuticle care, and a polish of your choice.", 2500, 30),
        item("Gel Manicure", "A gel-based manicure for a long-lasting and glossy finish.", 4000, 45),
        item("Spa Pedicure", "A relaxing pedicure experience with a soothing foot soak, exfoliation, and massage.", 5000, 60),
        item("Acrylic Nails", "Customizable acrylic nail extensions for length and durability.", 6000, 90),
        item("Nail Art", "Creative nail art design to make your nails stand out.", 1500, 20),
    ]
}

/// Insert every input whose slug is not taken yet; returns how many were created.
/// Existing services are left untouched, so running it twice is harmless.
#[instrument(skip(db, inputs), fields(count = inputs.len()))]
pub async fn seed_services(db: &DatabaseConnection, inputs: Vec<catalog::ServiceInput>) -> Result<usize, ServiceError> {
    let mut created = 0;
    for input in inputs {
        let slug = catalog::prepare(&input)?;
        if catalog::find_by_slug(db, &slug).await?.is_some() {
            info!(%slug, "service_seed_skipped");
            continue;
        }
        let s = catalog::create(db, catalog::ServiceInput { slug: Some(slug), ..input }).await?;
        info!(service_id = %s.id, slug = %s.slug, "service_seeded");
        created += 1;
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use crate::test_support::get_db;

    fn input(title: &str) -> catalog::ServiceInput {
        catalog::ServiceInput {
            title: title.into(),
            slug: None,
            description: "test".into(),
            price: Decimal::new(4500, 2),
            duration_minutes: Some(30),
            image_ref: None,
        }
    }

    #[tokio::test]
    async fn writes_require_staff_role() -> Result<(), anyhow::Error> {
        // role check runs before any query, so an unconnected handle is fine
        let db = DatabaseConnection::default();
        let err = create_service(&db, Role::Client, input("Pedicure")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
        let err = delete_service(&db, Role::Client, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
        Ok(())
    }

    #[tokio::test]
    async fn catalog_crud_service() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };

        let title = format!("Acrylic Set {}", Uuid::new_v4());
        let s = create_service(&db, Role::Staff, input(&title)).await?;
        assert_eq!(s.slug, catalog::slugify(&title));

        let dup = create_service(&db, Role::Admin, input(&title)).await;
        assert!(matches!(dup, Err(ServiceError::Conflict(_))));

        let upd = catalog::ServiceUpdate { title: Some("Renamed".into()), price: Some(Decimal::new(5000, 2)), ..Default::default() };
        let updated = update_service(&db, Role::Staff, s.id, upd).await?;
        assert_eq!(updated.slug, s.slug);
        assert_eq!(updated.price, Decimal::new(5000, 2));

        assert_eq!(get_service_by_slug(&db, &s.slug).await?.map(|x| x.id), Some(s.id));
        assert!(!popular_services(&db, 3).await?.is_empty());

        delete_service(&db, Role::Staff, s.id).await?;
        assert!(get_service(&db, s.id).await?.is_none());
        Ok(())
    }

    #[test]
    fn default_catalog_is_valid_and_distinct() {
        let items = default_catalog();
        assert_eq!(items.len(), 5);
        let slugs: HashSet<String> = items.iter().map(|i| catalog::prepare(i).unwrap()).collect();
        assert_eq!(slugs.len(), items.len());
        assert!(slugs.contains("spa-pedicure"));
        assert!(items.iter().all(|i| i.price > Decimal::ZERO));
    }

    #[tokio::test]
    async fn seeding_twice_creates_nothing_new() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };

        let tag = Uuid::new_v4();
        let batch = || vec![input(&format!("Paraffin Dip {tag}")), input(&format!("French Tips {tag}"))];
        assert_eq!(seed_services(&db, batch()).await?, 2);
        assert_eq!(seed_services(&db, batch()).await?, 0);

        seed_services(&db, default_catalog()).await?;
        for item in default_catalog() {
            let slug = catalog::slugify(&item.title);
            assert!(get_service_by_slug(&db, &slug).await?.is_some(), "{slug} missing");
        }

        for item in batch() {
            if let Some(s) = get_service_by_slug(&db, &catalog::slugify(&item.title)).await? {
                delete_service(&db, Role::Staff, s.id).await?;
            }
        }
        Ok(())
    }
}
