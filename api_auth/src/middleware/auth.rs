use std::{future::Future, pin::Pin, rc::Rc};

use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use common::{error::AppError, jwt};
use futures::future::{Ready, ok};

/// Rejects requests without valid claims, optionally requiring an admin.
pub struct AuthGuard {
    require_admin: bool,
}

impl AuthGuard {
    pub fn authenticated() -> Self {
        AuthGuard {
            require_admin: false,
        }
    }

    pub fn admin() -> Self {
        AuthGuard {
            require_admin: true,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = Error;
    type Transform = AuthGuardService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthGuardService {
            service: Rc::new(service),
            require_admin: self.require_admin,
        })
    }
}

pub struct AuthGuardService<S> {
    service: Rc<S>,
    require_admin: bool,
}

impl<S, B> Service<ServiceRequest> for AuthGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = Rc::clone(&self.service);
        let require_admin = self.require_admin;

        Box::pin(async move {
            let claims = match jwt::get_jwt_claims_or_error(&req) {
                Ok(claims) => claims,
                Err(response) => return Ok(req.into_response(response)),
            };

            if require_admin && !claims.is_admin {
                log::warn!("User {} tried to reach {} without admin rights", claims.user_id, req.path());
                let response = AppError::Forbidden("Administrator access required".to_string())
                    .to_http_response();
                return Ok(req.into_response(response));
            }

            // plain claims make `web::ReqData<JwtClaims>` available to handlers
            req.extensions_mut().insert(claims);
            srv.call(req).await.map(|res| res.map_into_boxed_body())
        })
    }
}
