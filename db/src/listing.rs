use chrono::{DateTime, Utc};
use common::error::{AppError, Res};
use sqlx::{Executor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    dtos::listing::{CatalogFilter, ListingCreateRequest, ListingDraft},
    models::listing::{Listing, ListingStatus},
};

/// Number of listings per catalog page.
pub const CATALOG_PAGE_SIZE: i64 = 50;

fn push_catalog_conditions(qb: &mut QueryBuilder<'_, Postgres>, filter: &CatalogFilter, now: DateTime<Utc>) {
    qb.push(" WHERE status = 'ACTIVE' AND expires_at > ").push_bind(now);

    if let Some(purpose) = filter.purpose {
        qb.push(" AND purpose = ").push_bind(purpose);
    }
    if let Some(city) = filter.city {
        qb.push(" AND city_id = ").push_bind(city);
    }
    if let Some(neighborhood) = filter.neighborhood {
        qb.push(" AND neighborhood_id = ").push_bind(neighborhood);
    }
    if let Some(agency) = filter.agency {
        qb.push(" AND agency_id = ").push_bind(agency);
    }

    let minimums = [
        ("bedrooms", filter.bedrooms),
        ("suites", filter.suites),
        ("bathrooms", filter.bathrooms),
        ("living_rooms", filter.living_rooms),
        ("kitchens", filter.kitchens),
        ("closets", filter.closets),
        ("area", filter.area),
    ];
    for (column, minimum) in minimums {
        if let Some(minimum) = minimum {
            qb.push(format!(" AND {} >= ", column)).push_bind(minimum);
        }
    }

    if let Some(max_price) = filter.max_price.clone() {
        qb.push(" AND price <= ").push_bind(max_price);
    }
}

/// Counts publicly visible listings matching `filter`.
pub async fn count_catalog<'e, E>(executor: E, filter: &CatalogFilter, now: DateTime<Utc>) -> Res<i64>
where
    E: Executor<'e, Database = Postgres>,
{
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM listings");
    push_catalog_conditions(&mut qb, filter, now);

    qb.build_query_scalar::<i64>()
        .fetch_one(executor)
        .await
        .map_err(AppError::from)
}

/// One page of publicly visible listings, featured first, then newest.
/// `page` is zero-based here.
pub async fn catalog_page<'e, E>(
    executor: E,
    filter: &CatalogFilter,
    now: DateTime<Utc>,
    page: i64,
) -> Res<Vec<Listing>>
where
    E: Executor<'e, Database = Postgres>,
{
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM listings");
    push_catalog_conditions(&mut qb, filter, now);

    qb.push(" ORDER BY featured DESC, created_at DESC LIMIT ")
        .push_bind(CATALOG_PAGE_SIZE)
        .push(" OFFSET ")
        .push_bind(page * CATALOG_PAGE_SIZE);

    qb.build_query_as::<Listing>()
        .fetch_all(executor)
        .await
        .map_err(AppError::from)
}

/// A listing only if it is currently published.
pub async fn get_public_listing<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    listing_id: Uuid,
    now: DateTime<Utc>,
) -> Res<Option<Listing>> {
    sqlx::query_as::<_, Listing>(
        "SELECT * FROM listings WHERE id = $1 AND status = 'ACTIVE' AND expires_at > $2",
    )
    .bind(listing_id)
    .bind(now)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}

pub async fn get_listing_by_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    listing_id: Uuid,
) -> Res<Option<Listing>> {
    sqlx::query_as::<_, Listing>("SELECT * FROM listings WHERE id = $1")
        .bind(listing_id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

pub async fn list_listings_by_owner<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    owner_id: Uuid,
) -> Res<Vec<Listing>> {
    sqlx::query_as::<_, Listing>(
        "SELECT * FROM listings WHERE owner_id = $1 ORDER BY created_at DESC",
    )
    .bind(owner_id)
    .fetch_all(executor)
    .await
    .map_err(AppError::from)
}

/// Listings that count against the owner's plan limit.
pub async fn count_countable_listings<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    owner_id: Uuid,
) -> Res<i64> {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM listings WHERE owner_id = $1 AND status IN ('ACTIVE', 'PENDING_APPROVAL')",
    )
    .bind(owner_id)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn insert_listing<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: ListingCreateRequest,
) -> Res<Listing> {
    let draft = data.draft;
    sqlx::query_as::<_, Listing>(
        r#"
        INSERT INTO listings (
            owner_id, city_id, neighborhood_id, purpose, title, description, address,
            contact_phone, price, bedrooms, suites, bathrooms, living_rooms, kitchens,
            closets, area, agency_id, status
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, 'PENDING_APPROVAL')
        RETURNING *
        "#,
    )
    .bind(data.owner_id)
    .bind(draft.city_id)
    .bind(draft.neighborhood_id)
    .bind(draft.purpose)
    .bind(draft.title)
    .bind(draft.description)
    .bind(draft.address)
    .bind(draft.contact_phone)
    .bind(draft.price)
    .bind(draft.bedrooms)
    .bind(draft.suites)
    .bind(draft.bathrooms)
    .bind(draft.living_rooms)
    .bind(draft.kitchens)
    .bind(draft.closets)
    .bind(draft.area)
    .bind(draft.agency_id)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn update_listing<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    listing_id: Uuid,
    draft: ListingDraft,
) -> Res<Listing> {
    sqlx::query_as::<_, Listing>(
        r#"
        UPDATE listings
        SET city_id = $1, neighborhood_id = $2, purpose = $3, title = $4, description = $5,
            address = $6, contact_phone = $7, price = $8, bedrooms = $9, suites = $10,
            bathrooms = $11, living_rooms = $12, kitchens = $13, closets = $14, area = $15,
            agency_id = $16
        WHERE id = $17
        RETURNING *
        "#,
    )
    .bind(draft.city_id)
    .bind(draft.neighborhood_id)
    .bind(draft.purpose)
    .bind(draft.title)
    .bind(draft.description)
    .bind(draft.address)
    .bind(draft.contact_phone)
    .bind(draft.price)
    .bind(draft.bedrooms)
    .bind(draft.suites)
    .bind(draft.bathrooms)
    .bind(draft.living_rooms)
    .bind(draft.kitchens)
    .bind(draft.closets)
    .bind(draft.area)
    .bind(draft.agency_id)
    .bind(listing_id)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn set_main_photo<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    listing_id: Uuid,
    key: &str,
) -> Res<()> {
    sqlx::query("UPDATE listings SET main_photo_key = $1 WHERE id = $2")
        .bind(key)
        .bind(listing_id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Publishes a PENDING_APPROVAL listing. Returns the number of rows changed,
/// zero when the listing is no longer pending.
pub async fn approve_listing<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    listing_id: Uuid,
    approved_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
) -> Res<u64> {
    let result = sqlx::query(
        r#"
        UPDATE listings
        SET status = 'ACTIVE', approved_at = $1, expires_at = $2
        WHERE id = $3 AND status = 'PENDING_APPROVAL'
        "#,
    )
    .bind(approved_at)
    .bind(expires_at)
    .bind(listing_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

/// Moves listings currently in `from` to `to`. Returns the ids that changed.
pub async fn transition_listings<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    listing_ids: &[Uuid],
    from: ListingStatus,
    to: ListingStatus,
) -> Res<Vec<Uuid>> {
    sqlx::query_scalar(
        "UPDATE listings SET status = $1 WHERE id = ANY($2) AND status = $3 RETURNING id",
    )
    .bind(to)
    .bind(listing_ids)
    .bind(from)
    .fetch_all(executor)
    .await
    .map_err(AppError::from)
}

pub async fn set_featured<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    listing_ids: &[Uuid],
    featured: bool,
) -> Res<Vec<Uuid>> {
    sqlx::query_scalar("UPDATE listings SET featured = $1 WHERE id = ANY($2) RETURNING id")
        .bind(featured)
        .bind(listing_ids)
        .fetch_all(executor)
        .await
        .map_err(AppError::from)
}

pub async fn delete_listing<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    listing_id: Uuid,
) -> Res<()> {
    sqlx::query("DELETE FROM listings WHERE id = $1")
        .bind(listing_id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Flips overdue ACTIVE listings to EXPIRED. Returns the number of rows changed.
pub async fn expire_overdue_listings<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    now: DateTime<Utc>,
) -> Res<u64> {
    let result = sqlx::query(
        "UPDATE listings SET status = 'EXPIRED' WHERE status = 'ACTIVE' AND expires_at < $1",
    )
    .bind(now)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

/// Expires every ACTIVE listing whose owner's subscription is EXPIRED.
///
/// Keyed on the subscription state rather than on what a given pass changed,
/// so a pass interrupted after the subscriptions were flipped is finished by
/// the next one.
pub async fn expire_listings_of_lapsed_owners<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
) -> Res<u64> {
    let result = sqlx::query(
        r#"
        UPDATE listings SET status = 'EXPIRED'
        WHERE status = 'ACTIVE'
          AND owner_id IN (SELECT user_id FROM subscriptions WHERE status = 'EXPIRED')
        "#,
    )
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}
