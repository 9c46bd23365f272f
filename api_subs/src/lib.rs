use actix_web::web::{self};

pub mod routes {
    pub mod pay;
    pub mod plan;
    pub mod sub;
}

pub mod services {
    pub mod pay;
    pub mod sub;
}

pub mod dtos {
    pub mod sub;
}

/// Public storefront.
pub fn mount_plans() -> actix_web::Scope {
    web::scope("/plans").service(routes::plan::get_plans)
}

/// Subscription management for the authenticated user.
pub fn mount_subs() -> actix_web::Scope {
    web::scope("/sub")
        .service(routes::sub::post_select)
        .service(routes::sub::get_current)
}

/// Gateway callbacks. Must stay outside the auth guard.
pub fn mount_webhook() -> actix_web::Scope {
    web::scope("/pay").service(routes::pay::post_webhook)
}
