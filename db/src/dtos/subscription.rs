use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::subscription::SubscriptionStatus;

/// The mutable part of a subscription row, written as a whole.
#[derive(Debug, Clone, PartialEq)]
pub struct Enrollment {
    pub plan_id: Option<Uuid>,
    pub status: SubscriptionStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}
