//! Folium Server - Library Circulation System
//!
//! A Rust REST API server for library circulation management.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folium_server::{api, config::AppConfig, repository::Repository, services::Services, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("folium_server={},tower_http=debug", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Folium Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(repository, config.auth.clone(), config.email.clone());

    // First start on an empty database needs an account to log in with
    services
        .readers
        .ensure_default_admin()
        .await
        .expect("Failed to seed default admin account");

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .route("/auth/login", post(api::auth::login))
        .route("/auth/me", get(api::auth::me))
        // Books (catalog)
        .route("/books", get(api::books::list_books))
        .route("/books", post(api::books::create_book))
        .route("/books/:id", get(api::books::get_book))
        .route("/books/:id", put(api::books::update_book))
        .route("/books/:id", delete(api::books::delete_book))
        .route("/books/:id/reservations", get(api::reservations::book_queue))
        .route(
            "/books/:id/process-availability",
            post(api::reservations::process_availability),
        )
        // Readers
        .route("/readers", get(api::readers::list_readers))
        .route("/readers", post(api::readers::create_reader))
        .route("/readers/:id", get(api::readers::get_reader))
        .route("/readers/:id", put(api::readers::update_reader))
        .route("/readers/:id", delete(api::readers::delete_reader))
        .route("/readers/:id/borrows", get(api::borrows::get_reader_borrows))
        .route("/readers/:id/fines", get(api::fines::get_reader_fines))
        .route(
            "/readers/:id/reservations",
            get(api::reservations::get_reader_reservations),
        )
        // Borrows
        .route("/borrows", post(api::borrows::create_borrow))
        .route("/borrows/:id", get(api::borrows::get_borrow))
        .route("/borrows/:id/return", post(api::borrows::return_borrow))
        .route("/borrows/:id/renew", post(api::borrows::renew_borrow))
        // Fines
        .route("/fines", post(api::fines::create_fine))
        .route("/fines/:id/pay", put(api::fines::pay_fine))
        .route("/fines/assess", post(api::fines::assess_fine))
        // Reservations
        .route("/reservations", get(api::reservations::list_reservations))
        .route("/reservations", post(api::reservations::create_reservation))
        .route("/reservations/check", get(api::reservations::check_reservation))
        .route("/reservations/auto-cancel", post(api::reservations::auto_cancel))
        .route("/reservations/:id/notify", post(api::reservations::notify_reservation))
        .route("/reservations/:id/received", post(api::reservations::confirm_received))
        .route("/reservations/:id/cancel", post(api::reservations::cancel_reservation))
        // Settings
        .route("/settings", get(api::settings::get_settings))
        .route("/settings", put(api::settings::update_settings))
        // Statistics
        .route("/stats", get(api::stats::get_stats))
        .with_state(state.clone());

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
