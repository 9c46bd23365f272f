use chrono::{DateTime, Utc};
use common::error::{AppError, Res};
use db::models::{
    plan::Plan,
    subscription::{Subscription, SubscriptionStatus},
};
use ledger::{BatchOutcome, enrollment::Standing};
use sqlx::PgPool;
use uuid::Uuid;

/// Gets the storefront: active plans, cheapest first.
pub async fn list_active_plans(pool: &PgPool) -> Res<Vec<Plan>> {
    db::plan::list_active_plans(pool).await
}

/// Points the user's single subscription at `plan_id`.
///
/// Paid plans are left PENDING until payment is confirmed; free plans come
/// back ACTIVE. Repeated selection overwrites the previous one.
pub async fn select_plan(
    pool: &PgPool,
    user_id: Uuid,
    plan_id: Uuid,
    now: DateTime<Utc>,
) -> Res<(Subscription, Plan)> {
    let plan = db::plan::get_plan_by_id(pool, plan_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Plan {} not found", plan_id)))?;

    let enrollment = ledger::enrollment::selection(&plan, now)?;
    let subscription = db::subscription::upsert_subscription(pool, user_id, &enrollment).await?;

    log::info!(
        "User {} selected plan {} ({})",
        user_id,
        plan.name,
        subscription.status.as_str()
    );
    Ok((subscription, plan))
}

pub async fn current_standing(pool: &PgPool, user_id: Uuid) -> Res<Standing> {
    let (subscription, plan) = db::subscription::get_subscription_with_plan(pool, user_id).await?;
    Ok(Standing::new(subscription, plan))
}

/// Activates one subscription. `Ok(None)` means it was left untouched.
pub async fn activate(
    pool: &PgPool,
    subscription: &Subscription,
    now: DateTime<Utc>,
) -> Res<Option<Subscription>> {
    let plan = match subscription.plan_id {
        Some(plan_id) => db::plan::get_plan_by_id(pool, plan_id).await?,
        None => None,
    };
    let Some(enrollment) = ledger::enrollment::activation(subscription, plan.as_ref(), now) else {
        return Ok(None);
    };
    let updated = db::subscription::update_enrollment(pool, subscription.id, &enrollment).await?;
    log::info!(
        "Subscription {} of user {} active until {:?}",
        updated.id,
        updated.user_id,
        updated.expires_at
    );
    Ok(Some(updated))
}

/// Bulk activation; each id succeeds or is skipped on its own.
pub async fn activate_subscriptions(
    pool: &PgPool,
    ids: &[Uuid],
    now: DateTime<Utc>,
) -> Res<BatchOutcome> {
    let mut outcome = BatchOutcome::default();
    for &id in ids {
        let Some(subscription) = db::subscription::get_subscription_by_id(pool, id).await? else {
            outcome.skip(id, None, "subscription does not exist");
            continue;
        };
        let reason = match subscription.status {
            SubscriptionStatus::Active => "subscription is already active",
            _ => "subscription has no plan",
        };
        match activate(pool, &subscription, now).await? {
            Some(_) => outcome.apply(id),
            None => outcome.skip(id, None, reason),
        }
    }
    Ok(outcome)
}

pub async fn cancel_subscriptions(pool: &PgPool, ids: &[Uuid]) -> Res<BatchOutcome> {
    let mut outcome = BatchOutcome::default();
    for &id in ids {
        match db::subscription::get_subscription_by_id(pool, id).await? {
            None => outcome.skip(id, None, "subscription does not exist"),
            Some(sub) if sub.status == SubscriptionStatus::Cancelled => {
                outcome.skip(id, None, "subscription is already cancelled")
            }
            Some(sub) => {
                db::subscription::set_subscription_status(pool, sub.id, SubscriptionStatus::Cancelled)
                    .await?;
                log::info!("Subscription {} of user {} cancelled", sub.id, sub.user_id);
                outcome.apply(id);
            }
        }
    }
    Ok(outcome)
}

/// Resolves a payment reference to its subscription: the checkout session id
/// stored at checkout time, or the subscription id itself.
pub async fn find_by_reference(pool: &PgPool, reference: &str) -> Res<Option<Subscription>> {
    if let Some(sub) = db::subscription::get_subscription_by_payment_reference(pool, reference).await? {
        return Ok(Some(sub));
    }
    match Uuid::parse_str(reference.trim()) {
        Ok(id) => db::subscription::get_subscription_by_id(pool, id).await,
        Err(_) => Ok(None),
    }
}

/// A confirmed payment activates the PENDING subscription it pays for.
///
/// Anything else is left as it is: a duplicate or replayed confirmation for a
/// subscription that is already active, expired or cancelled never grants
/// another period.
pub async fn confirm_payment(pool: &PgPool, reference: &str, now: DateTime<Utc>) -> Res<Subscription> {
    let subscription = find_by_reference(pool, reference)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No subscription for payment {}", reference)))?;

    let plan = match subscription.plan_id {
        Some(plan_id) => db::plan::get_plan_by_id(pool, plan_id).await?,
        None => None,
    };
    let Some(enrollment) = ledger::enrollment::payment_activation(&subscription, plan.as_ref(), now)
    else {
        log::info!(
            "Payment {} already settled for subscription {} ({})",
            reference,
            subscription.id,
            subscription.status.as_str()
        );
        return Ok(subscription);
    };

    match db::subscription::settle_pending(pool, subscription.id, &enrollment).await? {
        Some(updated) => {
            log::info!(
                "Payment {} activated subscription {} until {:?}",
                reference,
                updated.id,
                updated.expires_at
            );
            Ok(updated)
        }
        None => {
            // a concurrent delivery of the same payment got there first
            db::subscription::get_subscription_by_id(pool, subscription.id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("No subscription for payment {}", reference)))
        }
    }
}
