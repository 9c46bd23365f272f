use common::error::{AppError, Res};
use db::{dtos::plan::PlanDraft, models::plan::Plan};
use ledger::BatchOutcome;
use sqlx::PgPool;
use uuid::Uuid;

pub async fn create_plan(pool: &PgPool, draft: PlanDraft) -> Res<Plan> {
    ledger::catalog::validate_plan(&draft)?;
    let plan = db::plan::insert_plan(pool, draft).await?;
    log::info!("Plan {} ({}) created", plan.name, plan.id);
    Ok(plan)
}

/// Replaces a plan's terms. Running subscriptions pick up the new limits;
/// expirations already computed are kept.
pub async fn update_plan(pool: &PgPool, plan_id: Uuid, draft: PlanDraft) -> Res<Plan> {
    ledger::catalog::validate_plan(&draft)?;
    let plan = db::plan::update_plan(pool, plan_id, draft)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Plan {} not found", plan_id)))?;
    log::info!("Plan {} ({}) updated", plan.name, plan.id);
    Ok(plan)
}

/// Shows or hides plans on the storefront. Subscriptions are not touched.
pub async fn set_plans_active(pool: &PgPool, ids: &[Uuid], is_active: bool) -> Res<BatchOutcome> {
    let changed = db::plan::set_plans_active(pool, ids, is_active).await?;
    log::info!(
        "{} plan(s) {}",
        changed.len(),
        if is_active { "activated" } else { "deactivated" }
    );

    let mut outcome = BatchOutcome::default();
    for &id in ids {
        if changed.contains(&id) {
            outcome.apply(id);
        } else {
            outcome.skip(id, None, "plan does not exist");
        }
    }
    Ok(outcome)
}
