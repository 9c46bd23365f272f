use chrono::{DateTime, Duration, Utc};
use db::models::{
    listing::{Listing, ListingStatus},
    subscription::{Subscription, SubscriptionStatus},
};

/// End of a validity window of `duration_days` starting at `start`.
pub fn expiration_from(start: DateTime<Utc>, duration_days: i32) -> DateTime<Utc> {
    start + Duration::days(i64::from(duration_days))
}

/// ACTIVE past its expiration. The sweeper resolves these.
pub fn subscription_is_overdue(subscription: &Subscription, now: DateTime<Utc>) -> bool {
    subscription.status == SubscriptionStatus::Active
        && subscription.expires_at.is_some_and(|expires| expires < now)
}

pub fn listing_is_overdue(listing: &Listing, now: DateTime<Utc>) -> bool {
    listing.status == ListingStatus::Active && listing.expires_at.is_some_and(|expires| expires < now)
}

/// Whether the public catalog shows this listing.
pub fn is_publicly_visible(listing: &Listing, now: DateTime<Utc>) -> bool {
    listing.status == ListingStatus::Active && listing.expires_at.is_some_and(|expires| expires > now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn expiration_adds_whole_days() {
        let start = Utc::now();
        assert_eq!(expiration_from(start, 30) - start, Duration::days(30));
    }

    #[test]
    fn only_active_rows_in_the_past_are_overdue() {
        let now = Utc::now();
        let past = Some(now - Duration::hours(1));
        let future = Some(now + Duration::hours(1));

        let overdue = fixtures::subscription(None, SubscriptionStatus::Active, past);
        let current = fixtures::subscription(None, SubscriptionStatus::Active, future);
        let pending = fixtures::subscription(None, SubscriptionStatus::Pending, past);
        let expired = fixtures::subscription(None, SubscriptionStatus::Expired, past);

        assert!(subscription_is_overdue(&overdue, now));
        assert!(!subscription_is_overdue(&current, now));
        assert!(!subscription_is_overdue(&pending, now));
        assert!(!subscription_is_overdue(&expired, now));
    }

    #[test]
    fn listing_without_expiration_is_never_overdue_nor_visible() {
        let now = Utc::now();
        let listing = fixtures::listing(ListingStatus::Active, None);
        assert!(!listing_is_overdue(&listing, now));
        assert!(!is_publicly_visible(&listing, now));
    }

    #[test]
    fn visibility_requires_active_and_future_expiration() {
        let now = Utc::now();
        let future = Some(now + Duration::days(1));
        assert!(is_publicly_visible(&fixtures::listing(ListingStatus::Active, future), now));
        assert!(!is_publicly_visible(
            &fixtures::listing(ListingStatus::PendingApproval, future),
            now
        ));
        assert!(!is_publicly_visible(&fixtures::listing(ListingStatus::Active, Some(now)), now));
    }
}
