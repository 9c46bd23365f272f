use chrono::{DateTime, Utc};
use common::error::{AppError, Res};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    dtos::subscription::Enrollment,
    models::{
        plan::Plan,
        subscription::{Subscription, SubscriptionStatus},
    },
};

pub async fn get_subscription_by_user<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<Option<Subscription>> {
    sqlx::query_as::<_, Subscription>("SELECT * FROM subscriptions WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

/// The user's subscription and the plan it references, either possibly absent.
pub async fn get_subscription_with_plan(
    pool: &PgPool,
    user_id: Uuid,
) -> Res<(Option<Subscription>, Option<Plan>)> {
    let Some(subscription) = get_subscription_by_user(pool, user_id).await? else {
        return Ok((None, None));
    };
    let plan = match subscription.plan_id {
        Some(plan_id) => crate::plan::get_plan_by_id(pool, plan_id).await?,
        None => None,
    };
    Ok((Some(subscription), plan))
}

pub async fn get_subscription_by_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    subscription_id: Uuid,
) -> Res<Option<Subscription>> {
    sqlx::query_as::<_, Subscription>("SELECT * FROM subscriptions WHERE id = $1")
        .bind(subscription_id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

pub async fn get_subscription_by_payment_reference<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    reference: &str,
) -> Res<Option<Subscription>> {
    sqlx::query_as::<_, Subscription>("SELECT * FROM subscriptions WHERE payment_reference = $1")
        .bind(reference)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

/// Writes the user's single subscription row, creating it on first use.
/// Concurrent selections resolve last-write-wins.
pub async fn upsert_subscription<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
    enrollment: &Enrollment,
) -> Res<Subscription> {
    sqlx::query_as::<_, Subscription>(
        r#"
        INSERT INTO subscriptions (user_id, plan_id, status, started_at, expires_at)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (user_id) DO UPDATE
        SET plan_id = EXCLUDED.plan_id,
            status = EXCLUDED.status,
            started_at = EXCLUDED.started_at,
            expires_at = EXCLUDED.expires_at,
            payment_reference = NULL,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(enrollment.plan_id)
    .bind(enrollment.status)
    .bind(enrollment.started_at)
    .bind(enrollment.expires_at)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn update_enrollment<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    subscription_id: Uuid,
    enrollment: &Enrollment,
) -> Res<Subscription> {
    sqlx::query_as::<_, Subscription>(
        r#"
        UPDATE subscriptions
        SET plan_id = $1, status = $2, started_at = $3, expires_at = $4, updated_at = NOW()
        WHERE id = $5
        RETURNING *
        "#,
    )
    .bind(enrollment.plan_id)
    .bind(enrollment.status)
    .bind(enrollment.started_at)
    .bind(enrollment.expires_at)
    .bind(subscription_id)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

/// Writes `enrollment` only if the row is still PENDING. `None` when another
/// writer settled it first.
pub async fn settle_pending<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    subscription_id: Uuid,
    enrollment: &Enrollment,
) -> Res<Option<Subscription>> {
    sqlx::query_as::<_, Subscription>(
        r#"
        UPDATE subscriptions
        SET plan_id = $1, status = $2, started_at = $3, expires_at = $4, updated_at = NOW()
        WHERE id = $5 AND status = 'PENDING'
        RETURNING *
        "#,
    )
    .bind(enrollment.plan_id)
    .bind(enrollment.status)
    .bind(enrollment.started_at)
    .bind(enrollment.expires_at)
    .bind(subscription_id)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}

pub async fn set_subscription_status<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    subscription_id: Uuid,
    status: SubscriptionStatus,
) -> Res<()> {
    sqlx::query("UPDATE subscriptions SET status = $1, updated_at = NOW() WHERE id = $2")
        .bind(status)
        .bind(subscription_id)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn set_payment_reference<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    subscription_id: Uuid,
    reference: &str,
) -> Res<()> {
    sqlx::query("UPDATE subscriptions SET payment_reference = $1, updated_at = NOW() WHERE id = $2")
        .bind(reference)
        .bind(subscription_id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Flips overdue ACTIVE subscriptions to EXPIRED and returns their users.
pub async fn expire_overdue_subscriptions<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    now: DateTime<Utc>,
) -> Res<Vec<Uuid>> {
    sqlx::query_scalar(
        r#"
        UPDATE subscriptions
        SET status = 'EXPIRED', updated_at = NOW()
        WHERE status = 'ACTIVE' AND expires_at < $1
        RETURNING user_id
        "#,
    )
    .bind(now)
    .fetch_all(executor)
    .await
    .map_err(AppError::from)
}
