use serde::Serialize;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct City {
    pub id: i32,
    pub name: String,
    pub state: String,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Neighborhood {
    pub id: i32,
    pub city_id: i32,
    pub name: String,
}
