use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier},
};
use common::error::{AppError, Res};
use db::models::user::User;
use sqlx::PgPool;

use crate::{dtos::auth::LoginRequest, services::user::normalize_email};

/// Authenticates existing user.
/// Unknown email and wrong password both yield 401 with the same message.
pub async fn authenticate_user(pool: &PgPool, login_data: &LoginRequest) -> Res<User> {
    let email = normalize_email(&login_data.email);
    let Some((user, credentials)) = db::user::get_user_with_password_hash(pool, &email).await?
    else {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    };

    if verify_password(&login_data.password, &credentials.password_hash)? {
        Ok(user)
    } else {
        Err(AppError::Unauthorized("Invalid credentials".to_string()))
    }
}

pub fn verify_password(password: &str, stored_hash: &str) -> Res<bool> {
    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|e| AppError::Internal(format!("Stored password hash is malformed: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
