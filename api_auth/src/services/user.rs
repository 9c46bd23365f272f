use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use common::error::{AppError, Res};
use db::{
    dtos::user::UserCreateRequest,
    models::user::{AuthCredentials, User},
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    dtos::auth::{PasswordChangeRequest, ProfileUpdateRequest, RegisterRequest},
    services::auth::verify_password,
};

const MIN_PASSWORD_LENGTH: usize = 8;

pub async fn exists_user_by_email(pool: &PgPool, email: &str) -> Res<bool> {
    db::user::exists_user_by_email(pool, email).await
}

pub async fn get_user_by_id(pool: &PgPool, user_id: Uuid) -> Res<User> {
    db::user::get_user_by_id(pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
}

/// Emails are compared case-insensitively by storing them lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_registration(req: &RegisterRequest) -> Res<()> {
    let email = normalize_email(&req.email);
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
        _ => return Err(AppError::BadRequest("A valid email is required".to_string())),
    }
    validate_password(&req.password)?;
    if req.first_name.trim().is_empty() || req.last_name.trim().is_empty() {
        return Err(AppError::BadRequest("First and last name are required".to_string()));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Res<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::BadRequest(format!(
            "Password must have at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

pub fn hash_password(password: &str) -> Res<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Inserts user record and credentials to the database.
pub async fn create_user_with_credentials(pool: &PgPool, req: &RegisterRequest) -> Res<User> {
    let password_hash = hash_password(&req.password)?;
    let mut tx = pool.begin().await?;

    let user = db::user::insert_user(
        &mut *tx,
        UserCreateRequest {
            email: normalize_email(&req.email),
            first_name: req.first_name.trim().to_string(),
            last_name: req.last_name.trim().to_string(),
        },
    )
    .await?;

    db::user::insert_user_with_credentials(
        &mut *tx,
        AuthCredentials {
            user_id: user.id,
            password_hash,
        },
    )
    .await?;

    tx.commit().await?;
    log::info!("Registered user {}", user.id);
    Ok(user)
}

pub async fn update_profile(pool: &PgPool, user_id: Uuid, req: &ProfileUpdateRequest) -> Res<User> {
    let first_name = req.first_name.trim();
    let last_name = req.last_name.trim();
    if first_name.is_empty() || last_name.is_empty() {
        return Err(AppError::BadRequest("First and last name are required".to_string()));
    }
    db::user::update_user_names(pool, user_id, first_name, last_name)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
}

/// Replaces the password after checking the current one.
pub async fn change_password(pool: &PgPool, user_id: Uuid, req: &PasswordChangeRequest) -> Res<()> {
    let stored = db::user::get_password_hash(pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
    if !verify_password(&req.current_password, &stored)? {
        return Err(AppError::BadRequest("Current password is incorrect".to_string()));
    }
    validate_password(&req.new_password)?;

    let password_hash = hash_password(&req.new_password)?;
    db::user::update_password_hash(pool, user_id, &password_hash).await?;
    log::info!("User {} changed their password", user_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RegisterRequest {
        RegisterRequest {
            email: " Maria@Example.com ".to_string(),
            password: "correct horse".to_string(),
            first_name: "Maria".to_string(),
            last_name: "Silva".to_string(),
        }
    }

    #[test]
    fn normalizes_email() {
        assert_eq!(normalize_email(" Maria@Example.com "), "maria@example.com");
    }

    #[test]
    fn accepts_well_formed_registration() {
        assert!(validate_registration(&request()).is_ok());
    }

    #[test]
    fn rejects_bad_email_short_password_and_blank_names() {
        let mut bad_email = request();
        bad_email.email = "maria".to_string();
        assert!(validate_registration(&bad_email).is_err());

        let mut short = request();
        short.password = "1234567".to_string();
        assert!(validate_registration(&short).is_err());

        let mut blank = request();
        blank.last_name = " ".to_string();
        assert!(validate_registration(&blank).is_err());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("secret-password").unwrap();
        let b = hash_password("secret-password").unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("$argon2"));
    }
}
