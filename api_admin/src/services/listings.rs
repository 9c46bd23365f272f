use chrono::{DateTime, Utc};
use common::error::Res;
use db::models::listing::{Listing, ListingStatus};
use ledger::{
    BatchOutcome,
    approval::{Approval, SkipReason},
    enrollment::Standing,
};
use sqlx::PgPool;
use uuid::Uuid;

/// Approves each pending listing whose owner holds an active subscription.
///
/// Items are decided one at a time: a listing that cannot be approved, or
/// whose lookup fails, is skipped with its reason and never blocks the rest
/// of the batch.
pub async fn approve_listings(pool: &PgPool, ids: &[Uuid], now: DateTime<Utc>) -> Res<BatchOutcome> {
    let mut outcome = BatchOutcome::default();

    for &id in ids {
        let loaded = match load_for_approval(pool, id).await {
            Ok(Some(loaded)) => loaded,
            Ok(None) => {
                outcome.skip(id, None, SkipReason::Missing);
                continue;
            }
            Err(e) => {
                log::error!("Loading listing {} for approval failed: {}", id, e);
                outcome.skip(id, None, "listing could not be processed");
                continue;
            }
        };
        let (listing, owner) = loaded;

        match approve_loaded(pool, &listing, &owner, now).await {
            Ok(Ok(approval)) => {
                log::info!("Listing {} approved until {}", id, approval.expires_at);
                outcome.apply(id);
            }
            Ok(Err(reason)) => {
                log::warn!("Listing {} not approved: {}", id, reason);
                outcome.skip(id, Some(listing.display_name()), reason);
            }
            Err(e) => {
                log::error!("Approving listing {} failed: {}", id, e);
                outcome.skip(id, Some(listing.display_name()), "listing could not be processed");
            }
        }
    }
    Ok(outcome)
}

async fn load_for_approval(pool: &PgPool, id: Uuid) -> Res<Option<(Listing, Standing)>> {
    let Some(listing) = db::listing::get_listing_by_id(pool, id).await? else {
        return Ok(None);
    };
    let (subscription, plan) =
        db::subscription::get_subscription_with_plan(pool, listing.owner_id).await?;
    Ok(Some((listing, Standing::new(subscription, plan))))
}

/// Decides and writes one approval from rows loaded earlier.
///
/// The write only matches a listing that is still pending, so one that moved
/// on since it was loaded is reported as not pending.
pub async fn approve_loaded(
    pool: &PgPool,
    listing: &Listing,
    owner: &Standing,
    now: DateTime<Utc>,
) -> Res<Result<Approval, SkipReason>> {
    let approval = match ledger::approval::decide(listing, owner, now) {
        Ok(approval) => approval,
        Err(reason) => return Ok(Err(reason)),
    };
    let changed =
        db::listing::approve_listing(pool, listing.id, approval.approved_at, approval.expires_at)
            .await?;
    if changed == 0 {
        return Ok(Err(SkipReason::NotPending));
    }
    Ok(Ok(approval))
}

pub async fn reject_listings(pool: &PgPool, ids: &[Uuid]) -> Res<BatchOutcome> {
    let changed = db::listing::transition_listings(
        pool,
        ids,
        ListingStatus::PendingApproval,
        ListingStatus::Rejected,
    )
    .await?;

    let mut outcome = BatchOutcome::default();
    for &id in ids {
        if changed.contains(&id) {
            outcome.apply(id);
        } else {
            outcome.skip(id, None, "listing does not exist or is not pending approval");
        }
    }
    Ok(outcome)
}

pub async fn feature_listings(pool: &PgPool, ids: &[Uuid], featured: bool) -> Res<BatchOutcome> {
    let changed = db::listing::set_featured(pool, ids, featured).await?;

    let mut outcome = BatchOutcome::default();
    for &id in ids {
        if changed.contains(&id) {
            outcome.apply(id);
        } else {
            outcome.skip(id, None, SkipReason::Missing);
        }
    }
    Ok(outcome)
}
