use chrono::{DateTime, Utc};
use db::models::{
    listing::{Listing, ListingStatus},
    subscription::SubscriptionStatus,
};
use thiserror::Error;

use crate::{enrollment::Standing, expiry::expiration_from};

/// Why a listing was left untouched by a bulk approval.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    #[error("listing does not exist")]
    Missing,

    #[error("listing is not pending approval")]
    NotPending,

    #[error("owner has no subscription")]
    NoSubscription,

    #[error("owner's subscription is not active")]
    SubscriptionInactive,

    #[error("owner's subscription has no plan")]
    NoPlan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Approval {
    pub approved_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Decides one item of a bulk approval.
///
/// The publication window comes from the owner's current plan, regardless of
/// whether that plan is still on the storefront.
pub fn decide(listing: &Listing, owner: &Standing, now: DateTime<Utc>) -> Result<Approval, SkipReason> {
    if listing.status != ListingStatus::PendingApproval {
        return Err(SkipReason::NotPending);
    }
    let subscription = owner.subscription.as_ref().ok_or(SkipReason::NoSubscription)?;
    if subscription.status != SubscriptionStatus::Active {
        return Err(SkipReason::SubscriptionInactive);
    }
    let plan = owner.plan.as_ref().ok_or(SkipReason::NoPlan)?;

    Ok(Approval {
        approved_at: now,
        expires_at: expiration_from(now, plan.duration_days),
    })
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::fixtures;

    #[test]
    fn approval_window_follows_plan_duration() {
        let now = Utc::now();
        let plan = fixtures::plan(99, 180, 5, 10);
        let sub = fixtures::subscription(
            Some(&plan),
            SubscriptionStatus::Active,
            Some(now + Duration::days(10)),
        );
        let owner = Standing::new(Some(sub), Some(plan));
        let listing = fixtures::listing(ListingStatus::PendingApproval, None);

        let approval = decide(&listing, &owner, now).unwrap();
        assert_eq!(approval.approved_at, now);
        assert_eq!(approval.expires_at, now + Duration::days(180));
    }

    #[test]
    fn skips_listings_that_are_not_pending() {
        let listing = fixtures::listing(ListingStatus::Active, None);
        assert_eq!(
            decide(&listing, &Standing::default(), Utc::now()),
            Err(SkipReason::NotPending)
        );
    }

    #[test]
    fn skips_owners_without_active_subscription() {
        let now = Utc::now();
        let listing = fixtures::listing(ListingStatus::PendingApproval, None);
        assert_eq!(
            decide(&listing, &Standing::default(), now),
            Err(SkipReason::NoSubscription)
        );

        let plan = fixtures::plan(99, 30, 5, 10);
        let pending = fixtures::subscription(Some(&plan), SubscriptionStatus::Pending, None);
        let owner = Standing::new(Some(pending), Some(plan));
        assert_eq!(
            decide(&listing, &owner, now),
            Err(SkipReason::SubscriptionInactive)
        );
    }

    #[test]
    fn skips_active_subscription_that_lost_its_plan() {
        let now = Utc::now();
        let listing = fixtures::listing(ListingStatus::PendingApproval, None);
        let orphan = fixtures::subscription(None, SubscriptionStatus::Active, Some(now));
        let owner = Standing::new(Some(orphan), None);
        assert_eq!(decide(&listing, &owner, now), Err(SkipReason::NoPlan));
    }
}
