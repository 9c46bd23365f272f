use actix_cors::Cors;
use actix_web::http::header::{self, LOCATION};

pub fn middleware(origin: &str) -> Cors {
    Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ])
        .allowed_origin(origin)
        // plan-required responses point the browser at the storefront
        .expose_headers(&[LOCATION])
        .max_age(3600)
}
