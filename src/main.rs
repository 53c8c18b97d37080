//! Fleet Rental Backend Server
//!
//! Booking lifecycle, car availability and billing for a car rental fleet.

use actix_cors::Cors;
use actix_web::{
    error::InternalError, http::header, web, App, HttpResponse, HttpServer, ResponseError,
};
use fleet_api::{
    configure_availability, configure_bookings, configure_catalog, configure_fleet, health_check,
};
use fleet_core::{config::CorsConfig, AppConfig, AppError, SystemClock};
use fleet_db::{create_pool, run_migrations, PgRentalStore};
use fleet_services::{
    BookingService, Catalog, FleetAvailability, InvoiceEmitter, LoggingNotifier,
    PlainTextRenderer,
};
use std::env;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Configure API routes
fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health_check))
            // Booking lifecycle and invoices
            .configure(configure_bookings::<PgRentalStore>)
            // Free-car search and fleet overview
            .configure(configure_availability::<PgRentalStore>)
            // Hubs and add-ons
            .configure(configure_catalog::<PgRentalStore>)
            // Rate table and car registration
            .configure(configure_fleet),
    );
}

/// Initialize tracing/logging
fn init_tracing() {
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "fleet_rental={lvl},fleet_api={lvl},fleet_services={lvl},fleet_db={lvl},actix_web=info,sqlx=warn",
            lvl = log_level
        ))
    });

    let registry = tracing_subscriber::registry().with(env_filter);

    if env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        registry.with(fmt::layer().json()).init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
    }
}

fn build_cors(config: &CorsConfig) -> Cors {
    let cors = if config.allowed_origins.is_empty() {
        Cors::default().allow_any_origin()
    } else {
        config
            .allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allowed_methods(vec!["GET", "POST", "PUT", "OPTIONS"])
        .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
        .max_age(3600)
}

fn startup_error(context: &str, err: impl std::fmt::Display) -> io::Error {
    error!("{}: {}", context, err);
    io::Error::other(format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    info!("Starting Fleet Rental Backend v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load().map_err(|e| startup_error("Invalid configuration", e))?;

    info!("Connecting to database...");
    let pool = create_pool(&config.database)
        .await
        .map_err(|e| startup_error("Failed to create database pool", e))?;

    if config.database.run_migrations {
        run_migrations(&pool)
            .await
            .map_err(|e| startup_error("Failed to apply migrations", e))?;
    }

    let store = Arc::new(PgRentalStore::new(pool.clone()));

    let clock = Arc::new(SystemClock);

    let bookings = web::Data::new(BookingService::new(
        store.clone(),
        Arc::new(LoggingNotifier),
        clock.clone(),
        config.rental.clone(),
    ));
    let availability = web::Data::new(FleetAvailability::new(store.clone(), clock));
    let catalog = web::Data::new(Catalog::new(store.clone()));
    let invoices = web::Data::new(InvoiceEmitter::new(
        store,
        Arc::new(PlainTextRenderer),
        config.rental.currency.clone(),
    ));
    let pool = web::Data::new(pool);

    let bind_addr = config.server_addr();
    info!(
        "Starting HTTP server on {} with {} workers",
        bind_addr, config.server.workers
    );

    let cors_config = config.cors.clone();

    HttpServer::new(move || {
        App::new()
            .app_data(pool.clone())
            .app_data(bookings.clone())
            .app_data(availability.clone())
            .app_data(catalog.clone())
            .app_data(invoices.clone())
            // Malformed bodies and queries use the same error body as AppError
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                let message = err.to_string();
                InternalError::from_response(
                    err,
                    AppError::Validation(message).error_response(),
                )
                .into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                let message = err.to_string();
                InternalError::from_response(
                    err,
                    AppError::Validation(message).error_response(),
                )
                .into()
            }))
            .wrap(build_cors(&cors_config))
            .wrap(TracingLogger::default())
            .configure(configure_routes)
            .route(
                "/",
                web::get().to(|| async {
                    HttpResponse::Found()
                        .append_header(("Location", "/api/v1/health"))
                        .finish()
                }),
            )
    })
    .workers(config.server.workers)
    .client_request_timeout(Duration::from_secs(config.server.timeout_secs))
    .bind(&bind_addr)?
    .run()
    .await
}
