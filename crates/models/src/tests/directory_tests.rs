use super::setup_test_db;
use crate::{client, client_interaction, client_loyalty, errors::ModelError};
use crate::client_interaction::InteractionKind;
use anyhow::Result;
use sea_orm::EntityTrait;
use uuid::Uuid;

fn unique_client() -> client::ClientInput {
    client::ClientInput {
        first_name: "Maya".into(),
        last_name: "Lopez".into(),
        email: format!("maya_{}@example.com", Uuid::new_v4()),
        phone: "555-0101".into(),
        date_of_birth: None,
    }
}

#[tokio::test]
async fn test_client_crud() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let input = unique_client();
    let created = client::create(&db, input.clone()).await?;
    assert_eq!(created.email, input.email.to_lowercase());

    let dup = client::create(&db, input).await;
    assert!(matches!(dup, Err(ModelError::Conflict(_))));

    let upd = client::ClientUpdate { phone: Some("555-0199".into()), ..Default::default() };
    let updated = client::update(&db, created.id, upd).await?;
    assert_eq!(updated.phone, "555-0199");
    assert_eq!(updated.first_name, "Maya");

    client::Entity::delete_by_id(created.id).exec(&db).await?;
    Ok(())
}

#[tokio::test]
async fn test_interactions_cascade_with_client() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let c = client::create(&db, unique_client()).await?;
    let i = client_interaction::create(&db, c.id, InteractionKind::Inquiry, "asked about gel colors").await?;
    assert_eq!(i.kind, InteractionKind::Inquiry);

    client::Entity::delete_by_id(c.id).exec(&db).await?;
    let gone = client_interaction::Entity::find_by_id(i.id).one(&db).await?;
    assert!(gone.is_none());
    Ok(())
}

#[tokio::test]
async fn test_loyalty_points_never_negative() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let c = client::create(&db, unique_client()).await?;
    let row = client_loyalty::add_points(&db, c.id, 20).await?;
    assert_eq!(row.points, 20);
    let row = client_loyalty::add_points(&db, c.id, -5).await?;
    assert_eq!(row.points, 15);
    assert!(client_loyalty::add_points(&db, c.id, -16).await.is_err());
    assert_eq!(client_loyalty::find_by_client(&db, c.id).await?.map(|r| r.points), Some(15));

    client::Entity::delete_by_id(c.id).exec(&db).await?;
    Ok(())
}
