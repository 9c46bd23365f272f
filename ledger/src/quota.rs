use chrono::{DateTime, Utc};
use common::error::{AppError, Res};
use db::models::plan::Plan;

use crate::enrollment::Standing;

/// Decides whether a new listing may be created.
///
/// A user without a postable subscription is always refused with
/// `PlanRequired`, whatever their listing count. A postable user is refused
/// with `LimitReached` once `countable` reaches the plan's listing limit.
/// Returns the plan whose limits apply to the rest of the submission.
pub fn authorize_new_listing(
    standing: &Standing,
    countable: i64,
    now: DateTime<Utc>,
) -> Res<&Plan> {
    let plan = standing.postable_plan(now)?;
    check_listing_quota(plan, countable)?;
    Ok(plan)
}

pub fn check_listing_quota(plan: &Plan, countable: i64) -> Res<()> {
    if countable >= i64::from(plan.listing_limit) {
        return Err(AppError::LimitReached(format!(
            "Your plan allows {} active or pending listing(s) and you already have {}",
            plan.listing_limit, countable
        )));
    }
    Ok(())
}

/// Gallery photos already stored plus the ones being submitted must fit the plan.
pub fn check_photo_quota(plan: &Plan, existing: i64, submitted: usize) -> Res<()> {
    let total = existing + submitted as i64;
    if total > i64::from(plan.photo_limit) {
        return Err(AppError::LimitReached(format!(
            "Your plan allows {} photo(s) per listing; this submission would bring it to {}",
            plan.photo_limit, total
        )));
    }
    Ok(())
}
