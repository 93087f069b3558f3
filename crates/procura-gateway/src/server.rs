//! HTTP server assembly using Axum.

use axum::routing::{get, post, put};
use axum::Router;
use procura_core::config::AuthConfig;
use procura_core::ProcuraConfig;
use procura_store::PortalDb;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::routes;

/// Shared state for the gateway server. The store is the sole shared mutable
/// resource; every handler takes the lock for the duration of one operation.
pub struct AppState {
    pub db: Mutex<PortalDb>,
    pub auth: AuthConfig,
    pub start_time: std::time::Instant,
}

/// Build the Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::api_root))
        .route("/health", get(routes::health_check))
        // Vendors
        .route("/api/vendors/register", post(routes::vendors::register))
        .route("/api/vendors/login", post(routes::vendors::login))
        .route("/api/vendors/change-password", put(routes::vendors::change_password))
        .route("/api/vendors/change-email", put(routes::vendors::change_email))
        .route("/api/vendors/upload-photo", put(routes::vendors::upload_photo))
        // Admin
        .route("/api/admin/login", post(routes::admin::login))
        .route("/api/admin/vendors", get(routes::admin::list_vendors))
        .route("/api/admin/vendors/{id}", put(routes::admin::update_vendor_status))
        .route("/api/admin/change-password", put(routes::admin::change_password))
        .route("/api/admin/change-email", put(routes::admin::change_email))
        .route("/api/admin/upload-photo", put(routes::admin::upload_photo))
        // Tenders
        .route(
            "/api/tenders",
            get(routes::tenders::list_tenders).post(routes::tenders::create_tender),
        )
        .route(
            "/api/tenders/{id}",
            get(routes::tenders::get_tender)
                .put(routes::tenders::update_tender)
                .delete(routes::tenders::delete_tender),
        )
        .route("/api/tenders/{id}/bids", get(routes::tenders::tender_bids))
        // Bids
        .route("/api/bids", post(routes::bids::submit_bid))
        .route("/api/bids/my-bids", get(routes::bids::my_bids))
        .route("/api/bids/{id}", put(routes::bids::update_bid_status))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn start(config: &ProcuraConfig) -> anyhow::Result<()> {
    if let Some(parent) = config.storage.db_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let db = PortalDb::open(&config.storage.db_path)?;

    let state = Arc::new(AppState {
        db: Mutex::new(db),
        auth: config.auth.clone(),
        start_time: std::time::Instant::now(),
    });

    let app = build_router(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🌐 Procura gateway listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
