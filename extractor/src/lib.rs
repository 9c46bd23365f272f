use common::env_config::JwtConfig;
use middleware::extractor::ExtractionMiddleware;

pub mod middleware {
    pub mod extractor;
}

/// Decodes bearer tokens for every request; guards decide what to do with them.
pub fn middleware(jwt_config: &JwtConfig) -> ExtractionMiddleware {
    ExtractionMiddleware::new(jwt_config.secret.clone())
}
