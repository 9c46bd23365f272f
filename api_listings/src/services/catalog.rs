use chrono::{DateTime, Utc};
use common::error::{AppError, Res};
use db::{dtos::listing::CatalogFilter, listing::CATALOG_PAGE_SIZE};
use sqlx::PgPool;
use storage::ObjectStorage;
use uuid::Uuid;

use crate::dtos::listing::{CatalogPage, ListingDetail, ListingView, PhotoView};

/// Number of pages needed for `total` listings. An empty catalog still has one page.
pub fn total_pages(total: i64) -> i64 {
    ((total + CATALOG_PAGE_SIZE - 1) / CATALOG_PAGE_SIZE).max(1)
}

/// Maps a requested 1-based page onto an existing one.
/// Missing or non-positive pages serve the first page; pages past the end serve the last.
pub fn clamp_page(requested: Option<i64>, total_pages: i64) -> i64 {
    requested.unwrap_or(1).clamp(1, total_pages.max(1))
}

pub async fn browse(
    pool: &PgPool,
    storage: &dyn ObjectStorage,
    filter: &CatalogFilter,
    requested_page: Option<i64>,
    now: DateTime<Utc>,
) -> Res<CatalogPage> {
    let total = db::listing::count_catalog(pool, filter, now).await?;
    let total_pages = total_pages(total);
    let page = clamp_page(requested_page, total_pages);

    let listings = db::listing::catalog_page(pool, filter, now, page - 1)
        .await?
        .into_iter()
        .map(|l| ListingView::new(l, storage))
        .collect();
    let agency = match filter.agency {
        Some(agency_id) => db::agency::get_agency_by_id(pool, agency_id).await?,
        None => None,
    };

    Ok(CatalogPage {
        listings,
        page,
        total_pages,
        total,
        agency,
    })
}

/// A publicly visible listing with its gallery. Anything else is reported missing.
pub async fn detail(
    pool: &PgPool,
    storage: &dyn ObjectStorage,
    listing_id: Uuid,
    now: DateTime<Utc>,
) -> Res<ListingDetail> {
    let listing = db::listing::get_public_listing(pool, listing_id, now)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Listing {} not found", listing_id)))?;
    let gallery = db::photo::list_photos(pool, listing.id)
        .await?
        .iter()
        .map(|p| PhotoView::new(p, storage))
        .collect();

    Ok(ListingDetail {
        view: ListingView::new(listing, storage),
        gallery,
    })
}
