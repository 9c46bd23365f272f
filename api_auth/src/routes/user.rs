use std::sync::Arc;

use actix_web::{HttpResponse, get, post, put, web};
use common::{error::Res, http::Success, jwt::JwtClaims};
use sqlx::PgPool;

use crate::{
    dtos::auth::{PasswordChangeRequest, ProfileUpdateRequest},
    services,
};

/// Endpoint to retrieve the current authenticated user's information.
///
/// # Output
/// - Success: Returns a JSON object with the user's profile information
/// - Error: Returns 401 Unauthorized if no valid token is provided or 404 Not Found if user doesn't exist
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch('/api/dashboard/me', {
///   headers: { 'Authorization': `Bearer ${localStorage.getItem('authToken')}` }
/// });
/// ```
#[get("/me")]
pub async fn get_me(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<HttpResponse> {
    let pg_pool: &PgPool = &pool;
    let user = services::user::get_user_by_id(pg_pool, claims.user_id).await?;
    Success::ok(user)
}

/// Updates the current user's name.
///
/// # Frontend Example
/// ```javascript
/// await fetch('/api/dashboard/me', {
///   method: 'PUT',
///   headers: {
///     'Content-Type': 'application/json',
///     'Authorization': `Bearer ${localStorage.getItem('authToken')}`
///   },
///   body: JSON.stringify({ first_name: 'Maria', last_name: 'Souza' })
/// });
/// ```
#[put("/me")]
pub async fn put_me(
    claims: web::ReqData<JwtClaims>,
    req: web::Json<ProfileUpdateRequest>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<HttpResponse> {
    let pg_pool: &PgPool = &pool;
    let user = services::user::update_profile(pg_pool, claims.user_id, &req).await?;
    Success::ok(user)
}

/// Changes the current user's password. The current password is required.
///
/// # Output
/// - Success: 204 No Content
/// - Error: 400 when the current password is wrong or the new one is too short
#[post("/me/password")]
pub async fn post_password(
    claims: web::ReqData<JwtClaims>,
    req: web::Json<PasswordChangeRequest>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<HttpResponse> {
    let pg_pool: &PgPool = &pool;
    services::user::change_password(pg_pool, claims.user_id, &req).await?;
    Success::no_content()
}
