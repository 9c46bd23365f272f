//! Administrative operations. Every route here must be mounted behind the
//! admin guard.

use actix_web::web::{self};

pub mod routes {
    pub mod listings;
    pub mod plans;
    pub mod subscriptions;
    pub mod sweep;
}

pub mod services {
    pub mod listings;
    pub mod plans;
}

pub mod dtos {
    pub mod admin;
}

pub fn mount_admin() -> actix_web::Scope {
    web::scope("/admin")
        .service(routes::plans::get_plans)
        .service(routes::plans::post_plan)
        .service(routes::plans::post_activate_plans)
        .service(routes::plans::post_deactivate_plans)
        .service(routes::plans::put_plan)
        .service(routes::subscriptions::post_activate)
        .service(routes::subscriptions::post_cancel)
        .service(routes::subscriptions::post_confirm)
        .service(routes::listings::post_approve)
        .service(routes::listings::post_reject)
        .service(routes::listings::post_feature)
        .service(routes::sweep::post_sweep)
}
