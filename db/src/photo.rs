use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::photo::Photo;

pub async fn list_photos<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    listing_id: Uuid,
) -> Res<Vec<Photo>> {
    sqlx::query_as::<_, Photo>(
        "SELECT * FROM photos WHERE listing_id = $1 ORDER BY created_at ASC",
    )
    .bind(listing_id)
    .fetch_all(executor)
    .await
    .map_err(AppError::from)
}

pub async fn count_photos<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    listing_id: Uuid,
) -> Res<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM photos WHERE listing_id = $1")
        .bind(listing_id)
        .fetch_one(executor)
        .await
        .map_err(AppError::from)
}

pub async fn insert_photo<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    listing_id: Uuid,
    image_key: &str,
) -> Res<Photo> {
    sqlx::query_as::<_, Photo>(
        "INSERT INTO photos (listing_id, image_key) VALUES ($1, $2) RETURNING *",
    )
    .bind(listing_id)
    .bind(image_key)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

/// Fetches a photo together with the owner of its listing.
pub async fn get_photo_with_owner<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    photo_id: Uuid,
) -> Res<Option<(Photo, Uuid)>> {
    #[derive(sqlx::FromRow)]
    struct Row {
        #[sqlx(flatten)]
        photo: Photo,
        owner_id: Uuid,
    }

    let row = sqlx::query_as::<_, Row>(
        r#"
        SELECT p.*, l.owner_id
        FROM photos p
        JOIN listings l ON l.id = p.listing_id
        WHERE p.id = $1
        "#,
    )
    .bind(photo_id)
    .fetch_optional(executor)
    .await?;

    Ok(row.map(|r| (r.photo, r.owner_id)))
}

pub async fn delete_photo<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    photo_id: Uuid,
) -> Res<()> {
    sqlx::query("DELETE FROM photos WHERE id = $1")
        .bind(photo_id)
        .execute(executor)
        .await?;
    Ok(())
}
