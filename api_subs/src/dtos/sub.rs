use db::models::{plan::Plan, subscription::Subscription};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct SelectPlanRequest {
    pub plan_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct SelectPlanResponse {
    pub subscription: Subscription,
    /// Present for paid plans: where the browser must go to pay.
    pub checkout_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CurrentSubscriptionResponse {
    pub subscription: Option<Subscription>,
    pub plan: Option<Plan>,
    pub postable: bool,
}

#[derive(Debug, Serialize)]
pub struct PlansResponse {
    pub plans: Vec<Plan>,
}
