use serde::Deserialize;

/// Editable agency profile.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AgencyDraft {
    pub name: String,
    pub address: Option<String>,
    pub city_id: Option<i32>,
    pub phone: Option<String>,
    pub secondary_phone: Option<String>,
    pub website: Option<String>,
    pub social_url: Option<String>,
}
