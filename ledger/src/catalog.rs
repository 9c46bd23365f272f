use bigdecimal::{BigDecimal, Zero};
use common::error::{AppError, Res};
use db::{dtos::plan::PlanDraft, models::plan::Plan};

/// Checks the invariants a plan must satisfy before it is stored.
pub fn validate_plan(draft: &PlanDraft) -> Res<()> {
    if draft.name.trim().is_empty() {
        return Err(AppError::BadRequest("Plan name is required".to_string()));
    }
    if draft.price < BigDecimal::zero() {
        return Err(AppError::BadRequest("Plan price cannot be negative".to_string()));
    }
    if draft.duration_days <= 0 {
        return Err(AppError::BadRequest(
            "Plan duration must be at least one day".to_string(),
        ));
    }
    if draft.photo_limit < 0 || draft.listing_limit < 0 {
        return Err(AppError::BadRequest(
            "Plan limits cannot be negative".to_string(),
        ));
    }
    Ok(())
}

/// Only storefront plans can be chosen by users.
pub fn ensure_purchasable(plan: &Plan) -> Res<()> {
    if !plan.is_active {
        return Err(AppError::BadRequest(format!(
            "Plan {} is not available for purchase",
            plan.name
        )));
    }
    Ok(())
}
