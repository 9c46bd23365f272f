use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{dtos::agency::AgencyDraft, models::agency::Agency};

pub async fn list_agencies<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
) -> Res<Vec<Agency>> {
    sqlx::query_as::<_, Agency>("SELECT * FROM agencies ORDER BY name ASC")
        .fetch_all(executor)
        .await
        .map_err(AppError::from)
}

pub async fn get_agency_by_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    agency_id: Uuid,
) -> Res<Option<Agency>> {
    sqlx::query_as::<_, Agency>("SELECT * FROM agencies WHERE id = $1")
        .bind(agency_id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

pub async fn get_agency_by_user<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<Option<Agency>> {
    sqlx::query_as::<_, Agency>("SELECT * FROM agencies WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

/// Creates or rewrites the single agency profile of `user_id`.
pub async fn upsert_agency_for_user<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
    draft: AgencyDraft,
) -> Res<Agency> {
    sqlx::query_as::<_, Agency>(
        r#"
        INSERT INTO agencies (
            user_id, name, address, city_id, phone, secondary_phone, website, social_url
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (user_id) DO UPDATE
        SET name = EXCLUDED.name,
            address = EXCLUDED.address,
            city_id = EXCLUDED.city_id,
            phone = EXCLUDED.phone,
            secondary_phone = EXCLUDED.secondary_phone,
            website = EXCLUDED.website,
            social_url = EXCLUDED.social_url,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(draft.name)
    .bind(draft.address)
    .bind(draft.city_id)
    .bind(draft.phone)
    .bind(draft.secondary_phone)
    .bind(draft.website)
    .bind(draft.social_url)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}
