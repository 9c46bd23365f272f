use common::error::{AppError, Res};
use db::{dtos::agency::AgencyDraft, models::agency::Agency};
use sqlx::PgPool;
use uuid::Uuid;

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn web_address(field: &str, value: Option<String>) -> Res<Option<String>> {
    let Some(value) = trimmed(value) else {
        return Ok(None);
    };
    match url::Url::parse(&value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(Some(value)),
        _ => Err(AppError::BadRequest(format!(
            "{} must be an http or https address",
            field
        ))),
    }
}

/// Trims the profile and checks its web addresses. A name is required.
pub fn normalize(draft: AgencyDraft) -> Res<AgencyDraft> {
    let name = draft.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("Agency name is required".to_string()));
    }
    Ok(AgencyDraft {
        name,
        address: trimmed(draft.address),
        city_id: draft.city_id,
        phone: trimmed(draft.phone),
        secondary_phone: trimmed(draft.secondary_phone),
        website: web_address("website", draft.website)?,
        social_url: web_address("social_url", draft.social_url)?,
    })
}

pub async fn profile(pool: &PgPool, user_id: Uuid) -> Res<Agency> {
    db::agency::get_agency_by_user(pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("You have no agency profile".to_string()))
}

/// Creates the caller's agency profile or rewrites it.
pub async fn save_profile(pool: &PgPool, user_id: Uuid, draft: AgencyDraft) -> Res<Agency> {
    let draft = normalize(draft)?;
    let city = match draft.city_id {
        Some(city_id) => db::location::get_city_by_id(pool, city_id).await?.map(|_| city_id),
        None => None,
    };
    if city != draft.city_id {
        return Err(AppError::BadRequest("The agency's city does not exist".to_string()));
    }
    let agency = db::agency::upsert_agency_for_user(pool, user_id, draft).await?;
    log::info!("User {} saved agency profile {}", user_id, agency.id);
    Ok(agency)
}
