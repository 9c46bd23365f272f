use bigdecimal::BigDecimal;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PlanDraft {
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub duration_days: i32,
    #[serde(default = "default_photo_limit")]
    pub photo_limit: i32,
    #[serde(default = "default_listing_limit")]
    pub listing_limit: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_photo_limit() -> i32 {
    5
}

fn default_listing_limit() -> i32 {
    1
}

fn default_active() -> bool {
    true
}
