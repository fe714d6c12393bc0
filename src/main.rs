//! Diploma Pro Backend
//!
//! REST and Server-Sent Events backend for the Diploma Pro student resource
//! app, with SQLite as the document store.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod forms;
mod models;
mod push;
mod views;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use config::Config;
use db::Repository;
use forms::FormGates;
use push::PushHub;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub push: Arc<PushHub>,
    pub forms: Arc<FormGates>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let fmt_layer = if config.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Starting Diploma Pro Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);
    tracing::info!("Notice retention: {}", config.notice_retention);

    if config.admin_key.is_none() {
        tracing::warn!("No admin key configured (DIPLOMA_ADMIN_KEY). Publishing is open to anyone!");
    }

    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    let state = AppState {
        repo,
        push: Arc::new(PushHub::new()),
        forms: Arc::new(FormGates::new()),
        config: Arc::new(config.clone()),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Publishing routes
    let admin_routes = Router::new()
        .route("/resources", post(api::create_resource))
        .route("/jobs", post(api::create_job))
        .route("/notices", post(api::create_notice))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::admin_key_layer,
        ));

    let api_routes = Router::new()
        // Catalog
        .route("/home", get(api::home_feed))
        .route("/departments", get(api::list_departments))
        .route("/departments/{id}/semesters", get(api::list_semesters))
        // Resources
        .route("/resources", get(api::list_resources))
        .route(
            "/departments/{id}/{semester}/resources",
            get(api::list_department_resources),
        )
        .route(
            "/departments/{id}/{semester}/resources/live",
            get(api::live_department_resources),
        )
        // Jobs
        .route("/jobs", get(api::list_jobs))
        .route("/jobs/live", get(api::live_jobs))
        // Notices
        .route("/notices", get(api::list_notices))
        .route("/notices/live", get(api::live_notices))
        // Push
        .route("/push/tokens", post(api::register_push_token))
        .route("/push/stream", get(api::push_stream))
        // Client preferences
        .route("/clients/{client_id}/settings", get(api::get_client_settings))
        .route("/clients/{client_id}/settings/theme", put(api::update_theme))
        .route(
            "/clients/{client_id}/notices/unread",
            get(api::get_unread_badge),
        )
        .route(
            "/clients/{client_id}/notices/unread/live",
            get(api::live_unread_badge),
        )
        .route(
            "/clients/{client_id}/notices/open",
            post(api::open_notice_drawer),
        )
        .nest("/admin", admin_routes);

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
