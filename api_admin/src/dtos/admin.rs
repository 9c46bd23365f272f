use ledger::BatchOutcome;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Selection of rows a bulk action applies to.
#[derive(Debug, Deserialize)]
pub struct IdsRequest {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct FeatureRequest {
    pub ids: Vec<Uuid>,
    #[serde(default = "default_featured")]
    pub featured: bool,
}

fn default_featured() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct ConfirmPaymentRequest {
    /// Checkout session id or subscription id.
    pub reference: String,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    #[serde(flatten)]
    pub outcome: BatchOutcome,
    pub warnings: Vec<String>,
}

impl From<BatchOutcome> for BatchResponse {
    fn from(outcome: BatchOutcome) -> Self {
        let warnings = outcome.warnings();
        BatchResponse { outcome, warnings }
    }
}
