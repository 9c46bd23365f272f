use std::{env, sync::OnceLock};

use bigdecimal::BigDecimal;
use chrono::Utc;
use db::{
    dtos::{plan::PlanDraft, user::UserCreateRequest},
    models::{plan::Plan, subscription::Subscription, user::User},
};
use sqlx::PgPool;
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

fn split_db_url(url: &str) -> Result<(String, String), String> {
    let (base, query) = match url.split_once('?') {
        Some((base, query)) => (base.to_string(), Some(query)),
        None => (url.to_string(), None),
    };

    let db_start = base
        .rfind('/')
        .ok_or_else(|| "invalid database url".to_string())?;
    if db_start + 1 >= base.len() {
        return Err("database name is empty".to_string());
    }

    let db_name = base[db_start + 1..].to_string();
    let mut admin_url = format!("{}postgres", &base[..db_start + 1]);
    if let Some(query) = query {
        admin_url = format!("{admin_url}?{query}");
    }

    Ok((admin_url, db_name))
}

static TEST_DB_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

pub struct TestDb {
    pub pool: PgPool,
    _guard: MutexGuard<'static, ()>,
}

/// Recreates the database named by `TEST_DATABASE_URL` and migrates it.
pub async fn init_test_db() -> TestDb {
    dotenvy::dotenv().ok();
    let test_url = env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
    let (admin_url, db_name) = split_db_url(&test_url).expect("invalid TEST_DATABASE_URL format");

    let lock = TEST_DB_LOCK.get_or_init(|| Mutex::new(()));
    let guard = lock.lock().await;

    let admin_pool = PgPool::connect(&admin_url).await.expect("connect admin db");
    let quoted_name = format!("\"{}\"", db_name.replace('"', "\"\""));
    sqlx::query(&format!("DROP DATABASE IF EXISTS {quoted_name} WITH (FORCE)"))
        .execute(&admin_pool)
        .await
        .expect("drop test db");
    sqlx::query(&format!("CREATE DATABASE {quoted_name}"))
        .execute(&admin_pool)
        .await
        .expect("create test db");
    admin_pool.close().await;

    let pool = PgPool::connect(&test_url).await.expect("connect test db");
    db::migrate(&pool).await.expect("migrations");
    TestDb { pool, _guard: guard }
}

pub async fn user(pool: &PgPool) -> User {
    db::user::insert_user(
        pool,
        UserCreateRequest {
            email: format!("{}@example.com", Uuid::new_v4()),
            first_name: "Carlos".to_string(),
            last_name: "Pereira".to_string(),
        },
    )
    .await
    .expect("insert user")
}

pub async fn plan(pool: &PgPool, price: i64, duration_days: i32, listing_limit: i32, photo_limit: i32) -> Plan {
    db::plan::insert_plan(
        pool,
        PlanDraft {
            name: format!("Plan {}/{}", listing_limit, photo_limit),
            description: None,
            price: BigDecimal::from(price),
            duration_days,
            photo_limit,
            listing_limit,
            is_active: true,
        },
    )
    .await
    .expect("insert plan")
}

/// Enrolls `user_id` in a free plan the way plan selection does.
pub async fn subscribe_free(pool: &PgPool, user_id: Uuid, plan: &Plan) -> Subscription {
    let enrollment = ledger::enrollment::selection(plan, Utc::now()).expect("selection");
    db::subscription::upsert_subscription(pool, user_id, &enrollment)
        .await
        .expect("upsert subscription")
}
