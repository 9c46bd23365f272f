use std::str::FromStr;

use bigdecimal::{BigDecimal, ToPrimitive};
use common::{
    env_config::StripeConfig,
    error::{AppError, Res},
};
use db::models::{plan::Plan, subscription::Subscription};
use stripe::{
    CheckoutSession, CheckoutSessionMode, CheckoutSessionPaymentStatus, Client,
    CreateCheckoutSession, CreateCheckoutSessionLineItems, CreateCheckoutSessionLineItemsPriceData,
    CreateCheckoutSessionLineItemsPriceDataProductData, Currency, Event, EventObject, EventType,
    Webhook,
};

/// Converts a decimal price to the smallest currency unit.
pub fn amount_in_cents(price: &BigDecimal) -> Res<i64> {
    (price * BigDecimal::from(100))
        .round(0)
        .to_i64()
        .filter(|cents| *cents >= 0)
        .ok_or_else(|| AppError::Internal(format!("Price {} cannot be charged", price)))
}

/// Opens a one-off checkout for `plan`, tagged with the subscription id.
pub async fn create_checkout(
    client: &Client,
    config: &StripeConfig,
    plan: &Plan,
    subscription: &Subscription,
    customer_email: Option<&str>,
) -> Res<CheckoutSession> {
    let currency = Currency::from_str(&config.currency)
        .map_err(|_| AppError::Internal(format!("Unsupported currency {}", config.currency)))?;
    let reference = subscription.id.to_string();

    let params = CreateCheckoutSession {
        line_items: Some(vec![CreateCheckoutSessionLineItems {
            price_data: Some(CreateCheckoutSessionLineItemsPriceData {
                currency,
                product_data: Some(CreateCheckoutSessionLineItemsPriceDataProductData {
                    name: plan.name.clone(),
                    description: plan.description.clone(),
                    ..Default::default()
                }),
                unit_amount: Some(amount_in_cents(&plan.price)?),
                ..Default::default()
            }),
            quantity: Some(1),
            ..Default::default()
        }]),
        mode: Some(CheckoutSessionMode::Payment),
        client_reference_id: Some(reference.as_str()),
        customer_email,
        success_url: Some(config.success_url.as_str()),
        cancel_url: Some(config.cancel_url.as_str()),
        ..Default::default()
    };
    CheckoutSession::create(client, params)
        .await
        .map_err(AppError::from)
}

/// Creates an event for the webhook based on the request payload and signature.
/// Requires a webhook secret key.
pub fn construct_event(payload: &str, signature: &str, webhook_secret: &str) -> Res<Event> {
    match Webhook::construct_event(payload, signature, webhook_secret) {
        Ok(event) => Ok(event),
        Err(e) => {
            log::error!("Error constructing webhook event: {}", e);
            Err(AppError::BadRequest(format!("Webhook Error: {}", e)))
        }
    }
}

/// What a webhook event asks of the ledger.
#[derive(Debug, PartialEq)]
pub enum WebhookAction {
    /// Payment for the session settled; the value is the session id.
    ConfirmPayment(String),
    Ignore,
}

/// Maps gateway events to ledger actions.
///
/// Card payments settle with `checkout.session.completed`; delayed methods
/// (boleto, pix) complete unpaid and settle later with
/// `checkout.session.async_payment_succeeded`.
pub fn process_webhook_event(event: Event) -> WebhookAction {
    log::info!("Processing webhook event: {}", event.type_);

    match (event.type_, event.data.object) {
        (EventType::CheckoutSessionCompleted, EventObject::CheckoutSession(session)) => {
            if session.payment_status == CheckoutSessionPaymentStatus::Unpaid {
                log::info!("Checkout session {} completed awaiting payment", session.id);
                WebhookAction::Ignore
            } else {
                WebhookAction::ConfirmPayment(session.id.to_string())
            }
        }
        (EventType::CheckoutSessionAsyncPaymentSucceeded, EventObject::CheckoutSession(session)) => {
            WebhookAction::ConfirmPayment(session.id.to_string())
        }
        (EventType::CheckoutSessionAsyncPaymentFailed, EventObject::CheckoutSession(session)) => {
            log::warn!("Delayed payment failed for checkout session {}", session.id);
            WebhookAction::Ignore
        }
        (event_type, _) => {
            log::info!("Unhandled event type: {}", event_type);
            WebhookAction::Ignore
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cents_are_rounded_from_decimal_price() {
        assert_eq!(amount_in_cents(&BigDecimal::from_str("49.90").unwrap()).unwrap(), 4990);
        assert_eq!(amount_in_cents(&BigDecimal::from_str("0").unwrap()).unwrap(), 0);
        assert_eq!(amount_in_cents(&BigDecimal::from_str("19.999").unwrap()).unwrap(), 2000);
    }

    #[test]
    fn negative_price_cannot_be_charged() {
        assert!(amount_in_cents(&BigDecimal::from(-5)).is_err());
    }

    #[test]
    fn bad_signature_is_rejected() {
        let err = construct_event("{}", "t=1,v1=deadbeef", "whsec_test").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
