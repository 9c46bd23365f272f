use chrono::{DateTime, Utc};
use common::error::{AppError, Res};
use db::{
    dtos::listing::{ListingCreateRequest, ListingDraft},
    models::listing::Listing,
};
use ledger::enrollment::Standing;
use sqlx::{PgPool, Postgres, Transaction};
use storage::{
    ObjectStorage,
    keys::{ImageSlot, image_key},
};
use uuid::Uuid;

use crate::services::form::{ListingForm, Upload};

/// A written listing plus the gallery files that could not be stored.
#[derive(Debug)]
pub struct Saved {
    pub listing: Listing,
    pub warnings: Vec<String>,
}

pub async fn standing_of(pool: &PgPool, user_id: Uuid) -> Res<Standing> {
    let (subscription, plan) = db::subscription::get_subscription_with_plan(pool, user_id).await?;
    Ok(Standing::new(subscription, plan))
}

/// Loads a listing the caller owns.
pub async fn owned_listing(pool: &PgPool, owner_id: Uuid, listing_id: Uuid) -> Res<Listing> {
    let listing = db::listing::get_listing_by_id(pool, listing_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Listing {} not found", listing_id)))?;
    if listing.owner_id != owner_id {
        return Err(AppError::Forbidden(
            "You do not have permission to change this listing".to_string(),
        ));
    }
    Ok(listing)
}

/// A neighborhood must belong to the chosen city.
pub async fn validate_location(pool: &PgPool, draft: &ListingDraft) -> Res<()> {
    let Some(neighborhood_id) = draft.neighborhood_id else {
        return Ok(());
    };
    let Some(city_id) = draft.city_id else {
        return Err(AppError::BadRequest(
            "Choose a city before choosing a neighborhood".to_string(),
        ));
    };
    let neighborhoods = db::location::list_neighborhoods(pool, city_id).await?;
    if neighborhoods.iter().any(|n| n.id == neighborhood_id) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Neighborhood {} is not in city {}",
            neighborhood_id, city_id
        )))
    }
}

/// Listings can only be published under the owner's own agency.
pub async fn validate_agency(pool: &PgPool, owner_id: Uuid, draft: &ListingDraft) -> Res<()> {
    let Some(agency_id) = draft.agency_id else {
        return Ok(());
    };
    match db::agency::get_agency_by_id(pool, agency_id).await? {
        Some(agency) if agency.user_id == Some(owner_id) => Ok(()),
        _ => Err(AppError::BadRequest(format!(
            "Agency {} is not yours to publish under",
            agency_id
        ))),
    }
}

async fn put_upload(
    storage: &dyn ObjectStorage,
    key_prefix: &str,
    slot: ImageSlot,
    listing_id: Uuid,
    upload: Upload,
) -> Res<String> {
    let key = image_key(key_prefix, slot, listing_id, &upload.filename);
    storage
        .put(&key, upload.bytes, &upload.content_type)
        .await
        .map_err(|e| {
            log::warn!("Upload of {} to {} failed: {}", upload.filename, key, e);
            AppError::Storage(format!("Failed to upload {}", upload.filename))
        })
}

/// Stores gallery images one by one. Failures are collected as warnings.
pub async fn upload_gallery(
    pool: &PgPool,
    storage: &dyn ObjectStorage,
    key_prefix: &str,
    listing_id: Uuid,
    uploads: Vec<Upload>,
) -> Res<Vec<String>> {
    let mut failed = Vec::new();
    for upload in uploads {
        let filename = upload.filename.clone();
        match put_upload(storage, key_prefix, ImageSlot::Gallery, listing_id, upload).await {
            Ok(key) => {
                db::photo::insert_photo(pool, listing_id, &key).await?;
            }
            Err(_) => failed.push(filename),
        }
    }

    if failed.is_empty() {
        Ok(Vec::new())
    } else {
        Ok(vec![format!(
            "Some gallery photos failed to upload: {}",
            failed.join(", ")
        )])
    }
}

/// Creates a listing awaiting approval.
///
/// The subscription gate and both limits are checked before anything is
/// written. The row and its main photo are committed together: if the main
/// photo cannot be stored the listing does not exist afterwards.
pub async fn create_listing(
    pool: &PgPool,
    storage: &dyn ObjectStorage,
    key_prefix: &str,
    owner_id: Uuid,
    form: ListingForm,
    now: DateTime<Utc>,
) -> Res<Saved> {
    let standing = standing_of(pool, owner_id).await?;
    let countable = db::listing::count_countable_listings(pool, owner_id).await?;
    let plan = ledger::quota::authorize_new_listing(&standing, countable, now)?;
    ledger::quota::check_photo_quota(plan, 0, form.gallery.len())?;
    validate_location(pool, &form.draft).await?;
    validate_agency(pool, owner_id, &form.draft).await?;

    let ListingForm {
        draft,
        main_photo,
        gallery,
    } = form;

    let mut tx = pool.begin().await?;
    let mut listing =
        db::listing::insert_listing(&mut *tx, ListingCreateRequest { owner_id, draft }).await?;
    let main_key = match main_photo {
        Some(upload) => Some(put_upload(storage, key_prefix, ImageSlot::Main, listing.id, upload).await?),
        None => None,
    };
    let committed = attach_main_photo(tx, listing.id, main_key.as_deref()).await;
    discard_on_error(storage, main_key.as_deref(), committed).await?;
    listing.main_photo_key = main_key;

    log::info!("User {} created listing {}", owner_id, listing.id);
    let warnings = upload_gallery(pool, storage, key_prefix, listing.id, gallery).await?;
    Ok(Saved { listing, warnings })
}

/// Rewrites the owner-editable fields of a listing. Its status is unchanged.
///
/// A replacement main photo is stored before the row is touched, so a failed
/// upload leaves the listing as it was.
pub async fn update_listing(
    pool: &PgPool,
    storage: &dyn ObjectStorage,
    key_prefix: &str,
    owner_id: Uuid,
    listing_id: Uuid,
    form: ListingForm,
    now: DateTime<Utc>,
) -> Res<Saved> {
    let current = owned_listing(pool, owner_id, listing_id).await?;
    let standing = standing_of(pool, owner_id).await?;
    let plan = standing.postable_plan(now)?;
    let existing = db::photo::count_photos(pool, listing_id).await?;
    ledger::quota::check_photo_quota(plan, existing, form.gallery.len())?;
    validate_location(pool, &form.draft).await?;
    validate_agency(pool, owner_id, &form.draft).await?;

    let ListingForm {
        draft,
        main_photo,
        gallery,
    } = form;

    let new_main = match main_photo {
        Some(upload) => Some(put_upload(storage, key_prefix, ImageSlot::Main, listing_id, upload).await?),
        None => None,
    };

    let written = rewrite_listing(pool, listing_id, draft, new_main.as_deref()).await;
    let listing = discard_on_error(storage, new_main.as_deref(), written).await?;

    if let (Some(_), Some(old)) = (&new_main, &current.main_photo_key) {
        discard_object(storage, old).await;
    }

    log::info!("User {} updated listing {}", owner_id, listing_id);
    let warnings = upload_gallery(pool, storage, key_prefix, listing_id, gallery).await?;
    Ok(Saved { listing, warnings })
}

/// Deletes a listing with its photos. Stored images are removed afterwards on
/// a best-effort basis.
pub async fn delete_listing(
    pool: &PgPool,
    storage: &dyn ObjectStorage,
    owner_id: Uuid,
    listing_id: Uuid,
) -> Res<()> {
    let listing = owned_listing(pool, owner_id, listing_id).await?;
    let photos = db::photo::list_photos(pool, listing_id).await?;

    db::listing::delete_listing(pool, listing_id).await?;
    log::info!("User {} deleted listing {}", owner_id, listing_id);

    let keys = listing
        .main_photo_key
        .iter()
        .chain(photos.iter().map(|p| &p.image_key));
    for key in keys {
        discard_object(storage, key).await;
    }
    Ok(())
}

/// Removes one gallery photo. The stored object goes first; if that fails
/// the row is kept so the photo can be retried.
pub async fn delete_photo(
    pool: &PgPool,
    storage: &dyn ObjectStorage,
    owner_id: Uuid,
    photo_id: Uuid,
) -> Res<Uuid> {
    let (photo, photo_owner) = db::photo::get_photo_with_owner(pool, photo_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Photo {} not found", photo_id)))?;
    if photo_owner != owner_id {
        return Err(AppError::Forbidden(
            "You do not have permission to delete this photo".to_string(),
        ));
    }

    storage.delete(&photo.image_key).await.map_err(|e| {
        log::warn!("Deleting {} from storage failed: {}", photo.image_key, e);
        AppError::Storage("Failed to delete the photo from storage".to_string())
    })?;
    db::photo::delete_photo(pool, photo_id).await?;
    Ok(photo.listing_id)
}

async fn attach_main_photo(
    mut tx: Transaction<'_, Postgres>,
    listing_id: Uuid,
    key: Option<&str>,
) -> Res<()> {
    if let Some(key) = key {
        db::listing::set_main_photo(&mut *tx, listing_id, key).await?;
    }
    tx.commit().await?;
    Ok(())
}

async fn rewrite_listing(
    pool: &PgPool,
    listing_id: Uuid,
    draft: ListingDraft,
    main_key: Option<&str>,
) -> Res<Listing> {
    let mut tx = pool.begin().await?;
    let mut listing = db::listing::update_listing(&mut *tx, listing_id, draft).await?;
    if let Some(key) = main_key {
        db::listing::set_main_photo(&mut *tx, listing_id, key).await?;
        listing.main_photo_key = Some(key.to_string());
    }
    tx.commit().await?;
    Ok(listing)
}

/// Removes a freshly stored object when the write that should reference it failed.
async fn discard_on_error<T>(storage: &dyn ObjectStorage, key: Option<&str>, result: Res<T>) -> Res<T> {
    if let (Err(_), Some(key)) = (&result, key) {
        discard_object(storage, key).await;
    }
    result
}

async fn discard_object(storage: &dyn ObjectStorage, key: &str) {
    if let Err(e) = storage.delete(key).await {
        log::warn!("Could not remove orphaned object {}: {}", key, e);
    }
}
