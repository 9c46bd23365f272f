use chrono::{DateTime, Utc};
use common::error::{AppError, Res};
use db::{
    dtos::subscription::Enrollment,
    models::{
        plan::Plan,
        subscription::{Subscription, SubscriptionStatus},
    },
};
use serde::Serialize;

use crate::{catalog, expiry::expiration_from};

/// Message shown whenever an operation needs a usable plan first.
pub const PLAN_REQUIRED_MESSAGE: &str = "You must choose a plan before publishing listings";

/// State written when `plan` is selected at `now`.
///
/// Selecting resets the row to PENDING with no dates. Free plans skip
/// payment and come back ACTIVE for `duration_days` starting now.
pub fn selection(plan: &Plan, now: DateTime<Utc>) -> Res<Enrollment> {
    catalog::ensure_purchasable(plan)?;

    if plan.is_free() {
        return Ok(Enrollment {
            plan_id: Some(plan.id),
            status: SubscriptionStatus::Active,
            started_at: Some(now),
            expires_at: Some(expiration_from(now, plan.duration_days)),
        });
    }

    Ok(Enrollment {
        plan_id: Some(plan.id),
        status: SubscriptionStatus::Pending,
        started_at: None,
        expires_at: None,
    })
}

/// State written when an operator or a confirmed payment activates the row.
/// `None` means nothing to do: already ACTIVE, or no plan to take a duration from.
pub fn activation(
    subscription: &Subscription,
    plan: Option<&Plan>,
    now: DateTime<Utc>,
) -> Option<Enrollment> {
    if subscription.status == SubscriptionStatus::Active {
        return None;
    }
    let plan = plan?;
    Some(Enrollment {
        plan_id: Some(plan.id),
        status: SubscriptionStatus::Active,
        started_at: Some(now),
        expires_at: Some(expiration_from(now, plan.duration_days)),
    })
}

/// State written when a payment is confirmed. Only a PENDING row is settled by
/// a payment; any other status means the payment was already applied (or the
/// row was reset), so replays never grant another period.
pub fn payment_activation(
    subscription: &Subscription,
    plan: Option<&Plan>,
    now: DateTime<Utc>,
) -> Option<Enrollment> {
    if subscription.status != SubscriptionStatus::Pending {
        return None;
    }
    activation(subscription, plan, now)
}

/// Whether the subscription currently allows publishing.
pub fn is_postable(subscription: &Subscription, plan: Option<&Plan>, now: DateTime<Utc>) -> bool {
    let Some(plan) = plan else {
        return false;
    };
    subscription.plan_id == Some(plan.id)
        && plan.is_active
        && subscription.status == SubscriptionStatus::Active
        && subscription.expires_at.is_some_and(|expires| expires > now)
}

/// A user's subscription row joined with its plan, either of which may be absent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Standing {
    pub subscription: Option<Subscription>,
    pub plan: Option<Plan>,
}

impl Standing {
    pub fn new(subscription: Option<Subscription>, plan: Option<Plan>) -> Self {
        Standing { subscription, plan }
    }

    pub fn is_postable(&self, now: DateTime<Utc>) -> bool {
        self.subscription
            .as_ref()
            .is_some_and(|sub| is_postable(sub, self.plan.as_ref(), now))
    }

    /// The plan whose limits apply, or `PlanRequired` if publishing is not allowed.
    pub fn postable_plan(&self, now: DateTime<Utc>) -> Res<&Plan> {
        match &self.plan {
            Some(plan) if self.is_postable(now) => Ok(plan),
            _ => Err(AppError::PlanRequired(PLAN_REQUIRED_MESSAGE.to_string())),
        }
    }
}
