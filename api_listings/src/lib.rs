use actix_web::web::{self};

pub mod routes {
    pub mod agency;
    pub mod catalog;
    pub mod location;
    pub mod owner;
}

pub mod services {
    pub mod agency;
    pub mod catalog;
    pub mod form;
    pub mod owner;
}

pub mod dtos {
    pub mod listing;
}

/// Public catalog and listing detail.
pub fn mount_catalog() -> actix_web::Scope {
    web::scope("/listings")
        .service(routes::catalog::get_catalog)
        .service(routes::catalog::get_listing)
}

pub fn mount_locations() -> actix_web::Scope {
    web::scope("/locations")
        .service(routes::location::get_cities)
        .service(routes::location::get_neighborhoods)
}

pub fn mount_agencies() -> actix_web::Scope {
    web::scope("/agencies").service(routes::agency::get_agencies)
}

/// The authenticated user's agency profile. Mount behind the auth guard.
pub fn mount_agency_profile() -> actix_web::Scope {
    web::scope("/agency")
        .service(routes::agency::get_my_agency)
        .service(routes::agency::put_my_agency)
}

/// The authenticated owner's listings. Mount behind the auth guard.
pub fn mount_owner() -> actix_web::Scope {
    web::scope("/listings")
        .service(routes::owner::get_my_listings)
        .service(routes::owner::post_listing)
        .service(routes::owner::delete_photo)
        .service(routes::owner::put_listing)
        .service(routes::owner::delete_listing)
}
