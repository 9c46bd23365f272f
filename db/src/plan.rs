use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{dtos::plan::PlanDraft, models::plan::Plan};

/// Storefront listing: active plans, cheapest first.
pub async fn list_active_plans<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
) -> Res<Vec<Plan>> {
    sqlx::query_as::<_, Plan>("SELECT * FROM plans WHERE is_active = TRUE ORDER BY price ASC, name ASC")
        .fetch_all(executor)
        .await
        .map_err(AppError::from)
}

pub async fn list_all_plans<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
) -> Res<Vec<Plan>> {
    sqlx::query_as::<_, Plan>("SELECT * FROM plans ORDER BY price ASC, name ASC")
        .fetch_all(executor)
        .await
        .map_err(AppError::from)
}

pub async fn get_plan_by_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    plan_id: Uuid,
) -> Res<Option<Plan>> {
    sqlx::query_as::<_, Plan>("SELECT * FROM plans WHERE id = $1")
        .bind(plan_id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

pub async fn insert_plan<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    draft: PlanDraft,
) -> Res<Plan> {
    sqlx::query_as::<_, Plan>(
        r#"
        INSERT INTO plans (name, description, price, duration_days, photo_limit, listing_limit, is_active)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(draft.name)
    .bind(draft.description)
    .bind(draft.price)
    .bind(draft.duration_days)
    .bind(draft.photo_limit)
    .bind(draft.listing_limit)
    .bind(draft.is_active)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn update_plan<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    plan_id: Uuid,
    draft: PlanDraft,
) -> Res<Option<Plan>> {
    sqlx::query_as::<_, Plan>(
        r#"
        UPDATE plans
        SET name = $1, description = $2, price = $3, duration_days = $4,
            photo_limit = $5, listing_limit = $6, is_active = $7, updated_at = NOW()
        WHERE id = $8
        RETURNING *
        "#,
    )
    .bind(draft.name)
    .bind(draft.description)
    .bind(draft.price)
    .bind(draft.duration_days)
    .bind(draft.photo_limit)
    .bind(draft.listing_limit)
    .bind(draft.is_active)
    .bind(plan_id)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}

/// Bulk visibility toggle. Returns the ids that were updated.
pub async fn set_plans_active<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    plan_ids: &[Uuid],
    is_active: bool,
) -> Res<Vec<Uuid>> {
    sqlx::query_scalar(
        "UPDATE plans SET is_active = $1, updated_at = NOW() WHERE id = ANY($2) RETURNING id",
    )
    .bind(is_active)
    .bind(plan_ids)
    .fetch_all(executor)
    .await
    .map_err(AppError::from)
}
