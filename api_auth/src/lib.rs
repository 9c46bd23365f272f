use actix_web::web;
use middleware::auth::AuthGuard;

pub mod middleware {
    pub mod auth;
}

mod routes {
    pub(crate) mod auth;
    pub(crate) mod user;
}

mod services {
    pub(crate) mod auth;
    pub(crate) mod user;
}

mod dtos {
    pub(crate) mod auth;
}

/// Requires a valid bearer token; handlers behind it can take `ReqData<JwtClaims>`.
pub fn auth_middleware() -> AuthGuard {
    AuthGuard::authenticated()
}

/// Requires a valid bearer token issued to an administrator.
pub fn admin_middleware() -> AuthGuard {
    AuthGuard::admin()
}

pub fn mount_auth() -> actix_web::Scope {
    web::scope("/auth")
        .service(routes::auth::post_register)
        .service(routes::auth::post_login)
}

/// Routes registered inside the authenticated dashboard scope.
pub fn configure_user(cfg: &mut web::ServiceConfig) {
    cfg.service(routes::user::get_me)
        .service(routes::user::put_me)
        .service(routes::user::post_password);
}
