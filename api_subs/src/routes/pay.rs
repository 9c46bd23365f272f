use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, post, web};
use chrono::Utc;
use common::{
    env_config::Config,
    error::{AppError, Res},
    http::Success,
};
use sqlx::PgPool;

use crate::services::{
    self,
    pay::WebhookAction,
};

/// Handles Stripe webhook events for plan payments.
///
/// # Output
/// - Success: Returns 200 OK once the event is processed or ignored
/// - Error: 400 for a missing or invalid signature, 404 when the paid
///   session matches no subscription
///
/// # Note
/// Called by Stripe's servers, never by the frontend. Configure it under
/// Developers → Webhooks as `https://yourapp.com/api/pay/webhook` listening to
/// `checkout.session.completed` and `checkout.session.async_payment_succeeded`,
/// and set the signing secret as STRIPE_WEBHOOK_SECRET.
#[post("/webhook")]
pub async fn post_webhook(
    payload: String,
    req: HttpRequest,
    config: web::Data<Arc<Config>>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<HttpResponse> {
    let signature = match req.headers().get("stripe-signature") {
        Some(signature) => signature.to_str().unwrap_or(""),
        None => return Err(AppError::BadRequest("Stripe signature missing".to_string())),
    };

    let event = services::pay::construct_event(&payload, signature, &config.stripe.webhook_secret)?;
    if let WebhookAction::ConfirmPayment(reference) = services::pay::process_webhook_event(event) {
        let pg_pool: &PgPool = &pool;
        services::sub::confirm_payment(pg_pool, &reference, Utc::now()).await?;
    }

    Success::ok("Webhook processed successfully")
}

#[cfg(test)]
mod tests {
    use actix_web::{App, http::StatusCode, test};
    use sqlx::postgres::PgPoolOptions;

    use super::*;

    fn test_config() -> Config {
        Config::from_lookup(|key| match key {
            "ENVIRONMENT" => Some("development".to_string()),
            "DATABASE_URL" => Some("postgres://localhost/unused".to_string()),
            "JWT_SECRET" => Some("secret".to_string()),
            "STORAGE_BUCKET" => Some("photos".to_string()),
            "STRIPE_WEBHOOK_SECRET" => Some("whsec_test".to_string()),
            _ => None,
        })
        .unwrap()
    }

    #[actix_web::test]
    async fn webhook_without_valid_signature_is_rejected() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Arc::new(test_config())))
                .app_data(web::Data::new(Arc::new(pool)))
                .service(web::scope("/pay").service(post_webhook)),
        )
        .await;

        let unsigned = test::TestRequest::post()
            .uri("/pay/webhook")
            .set_payload("{}")
            .to_request();
        let res = test::call_service(&app, unsigned).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let forged = test::TestRequest::post()
            .uri("/pay/webhook")
            .insert_header(("stripe-signature", "t=1,v1=deadbeef"))
            .set_payload("{}")
            .to_request();
        let res = test::call_service(&app, forged).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
