use bigdecimal::BigDecimal;
use chrono::{DateTime, Duration, Utc};
use db::models::{
    listing::{Listing, ListingStatus},
    plan::Plan,
    subscription::{Subscription, SubscriptionStatus},
};
use uuid::Uuid;

pub fn plan(price: i64, duration_days: i32, listing_limit: i32, photo_limit: i32) -> Plan {
    let now = Utc::now();
    Plan {
        id: Uuid::new_v4(),
        name: format!("Plan {}", price),
        description: None,
        price: BigDecimal::from(price),
        duration_days,
        photo_limit,
        listing_limit,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn subscription(
    plan: Option<&Plan>,
    status: SubscriptionStatus,
    expires_at: Option<DateTime<Utc>>,
) -> Subscription {
    let now = Utc::now();
    Subscription {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        plan_id: plan.map(|p| p.id),
        status,
        started_at: expires_at.map(|_| now - Duration::days(1)),
        expires_at,
        payment_reference: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn listing(status: ListingStatus, expires_at: Option<DateTime<Utc>>) -> Listing {
    Listing {
        id: Uuid::new_v4(),
        owner_id: Uuid::new_v4(),
        city_id: None,
        neighborhood_id: None,
        agency_id: None,
        purpose: None,
        title: Some("Apartment downtown".to_string()),
        description: None,
        address: None,
        contact_phone: None,
        price: None,
        bedrooms: 2,
        suites: 0,
        bathrooms: 1,
        living_rooms: 1,
        kitchens: 1,
        closets: 0,
        area: 70,
        main_photo_key: None,
        status,
        featured: false,
        created_at: Utc::now(),
        approved_at: None,
        expires_at,
    }
}
