mod cors;

use std::{sync::Arc, time::Duration};

use actix_web::{
    App, HttpServer,
    web::{self},
};
use common::env_config::Config;
use storage::{ObjectStorage, S3Storage};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // get env vars
    let config = Config::from_env().expect("Invalid configuration");
    let is_production = config.is_production();
    let origin = config.cors_allowed_origin.clone();

    // init logger
    if config.console_logging_enabled {
        logger::setup(&config).expect("Failed to set up logger");
    }

    // init db connection
    let pool = db::setup(&config.database_url, is_production)
        .await
        .expect("Failed to set up database");

    // object storage for listing images
    let storage: Arc<dyn ObjectStorage> = Arc::new(S3Storage::connect(&config.storage).await);

    // expire overdue subscriptions and listings in the background as well
    let _sweep_task = sweeper::spawn_periodic(
        pool.clone(),
        Duration::from_secs(config.sweep_interval_secs),
    );

    log::info!(
        "Listening on {}:{} ({} workers)",
        config.server_host,
        config.server_port,
        config.num_workers
    );

    let config = Arc::new(config);
    let config_data = config.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config_data.clone()))
            .app_data(web::Data::new(storage.clone()))
            .wrap(limiter::global_middleware(config_data.rate_limit_per_second)) // 4th
            .wrap(logger::middleware(config_data.console_logging_enabled)) // 3rd
            .wrap(extractor::middleware(&config_data.jwt_config)) // 2nd
            .wrap(cors::middleware(&origin)) // 1st
            .service(
                web::scope("/api")
                    .service(api_auth::mount_auth())
                    .service(api_subs::mount_plans())
                    .service(api_subs::mount_webhook())
                    .service(api_listings::mount_catalog())
                    .service(api_listings::mount_locations())
                    .service(api_listings::mount_agencies())
                    .service(
                        web::scope("/dashboard")
                            .wrap(api_auth::auth_middleware())
                            .configure(api_auth::configure_user)
                            .service(api_subs::mount_subs())
                            .service(api_listings::mount_owner())
                            .service(api_listings::mount_agency_profile()),
                    )
                    .service(api_admin::mount_admin().wrap(api_auth::admin_middleware())),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .workers(config.num_workers)
    .run()
    .await
}
