use std::io;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{
    http::header,
    middleware::{Compress, DefaultHeaders, Logger},
    web, App, HttpServer,
};
use env_logger::Env;
use log::{error, info};

use trip_planner_api::{
    config::AppConfig, db, middleware::rate_limit::RateLimit, routes, state::AppState,
};

fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("X-Content-Type-Options", "nosniff"))
        .add(("X-Frame-Options", "DENY"))
        .add(("Referrer-Policy", "no-referrer"))
        .add(("X-DNS-Prefetch-Control", "off"))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }

    env_logger::init_from_env(Env::default().default_filter_or("info"));
    info!("Application starting...");

    let config = AppConfig::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let client = db::mongo::create_mongo_client(&config.mongodb_uri)
        .await
        .map_err(|e| {
            error!("Failed to connect to MongoDB: {}", e);
            io::Error::new(io::ErrorKind::ConnectionRefused, e.to_string())
        })?;

    let host = config.host.clone();
    let port = config.port;
    let frontend_url = config.frontend_url.clone();
    let rate_limit_max = config.rate_limit_max;
    let rate_limit_window = Duration::from_secs(config.rate_limit_window_secs);

    let state = web::Data::new(AppState::new(config, client));

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&frontend_url)
            .allow_any_method()
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(Compress::default())
            .wrap(security_headers())
            .wrap(cors)
            .app_data(state.clone())
            .app_data(routes::json_config())
            .app_data(routes::query_config())
            .service(
                web::scope("/api")
                    .wrap(RateLimit::new(rate_limit_max, rate_limit_window))
                    .configure(routes::configure),
            )
    })
    .bind((host, port))?
    .run()
    .await
}
