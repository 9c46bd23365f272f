//! Expiration sweeper.
//!
//! Flips ACTIVE subscriptions and listings whose expiration has passed to
//! EXPIRED, then expires the remaining ACTIVE listings of owners whose
//! subscription is EXPIRED. Each step is a single idempotent bulk UPDATE
//! that depends only on stored state, so concurrent or repeated passes
//! converge to the same state and nothing is ever reactivated. The steps are
//! not wrapped in a transaction; a pass that dies half-way is completed by
//! the next one.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use common::error::Res;
use serde::Serialize;
use sqlx::PgPool;
use tokio::task::JoinHandle;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub subscriptions_expired: usize,
    pub listings_expired: u64,
    /// ACTIVE listings expired because their owner's subscription is expired.
    pub listings_cascaded: u64,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.subscriptions_expired == 0 && self.listings_expired == 0 && self.listings_cascaded == 0
    }
}

/// Runs one pass as of `now`.
pub async fn sweep_expirations(pool: &PgPool, now: DateTime<Utc>) -> Res<SweepReport> {
    let expired_owners = db::subscription::expire_overdue_subscriptions(pool, now).await?;
    let listings_expired = db::listing::expire_overdue_listings(pool, now).await?;
    let listings_cascaded = db::listing::expire_listings_of_lapsed_owners(pool).await?;

    let report = SweepReport {
        subscriptions_expired: expired_owners.len(),
        listings_expired,
        listings_cascaded,
    };
    if !report.is_empty() {
        log::info!(
            "Sweep expired {} subscription(s), {} listing(s), {} by cascade",
            report.subscriptions_expired,
            report.listings_expired,
            report.listings_cascaded
        );
    }
    Ok(report)
}

/// Sweep for read paths: failures are logged and never fail the request.
pub async fn sweep_quietly(pool: &PgPool) {
    if let Err(e) = sweep_expirations(pool, Utc::now()).await {
        log::warn!("Expiration sweep failed: {}", e);
    }
}

/// Starts the background sweep. Returns `None` when `interval` is zero.
pub fn spawn_periodic(pool: Arc<PgPool>, interval: Duration) -> Option<JoinHandle<()>> {
    if interval.is_zero() {
        log::info!("Periodic expiration sweep disabled");
        return None;
    }

    log::info!("Periodic expiration sweep every {}s", interval.as_secs());
    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = sweep_expirations(&pool, Utc::now()).await {
                log::error!("Periodic expiration sweep failed: {}", e);
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report() {
        assert!(SweepReport::default().is_empty());
        assert!(
            !SweepReport {
                listings_cascaded: 1,
                ..Default::default()
            }
            .is_empty()
        );
    }

    #[tokio::test]
    async fn zero_interval_disables_task() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        assert!(spawn_periodic(Arc::new(pool), Duration::ZERO).is_none());
    }
}
