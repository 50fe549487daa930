//! JSON HTTP API over a shared session.

pub mod error;
pub mod routes;

use crate::acquisition::http_client::HttpClient;
use crate::session::Session;
use anyhow::{Context, Result};
use axum::{
    routing::{get, patch, post, put},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// State shared across handlers.
pub struct AppState {
    pub session: Mutex<Session>,
    pub client: HttpClient,
}

impl AppState {
    pub fn new(session: Session, client: HttpClient) -> Arc<Self> {
        Arc::new(Self {
            session: Mutex::new(session),
            client,
        })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(routes::health_check))
        .route("/api/catalog", get(routes::catalog))
        .route("/api/sitemap", get(routes::sitemap))
        // Websites
        .route(
            "/api/websites",
            get(routes::list_websites).post(routes::create_website),
        )
        .route(
            "/api/websites/:id",
            patch(routes::update_website).delete(routes::delete_website),
        )
        .route(
            "/api/websites/:id/pages",
            get(routes::list_pages).post(routes::add_page),
        )
        .route("/api/websites/:id/import", post(routes::import))
        .route("/api/websites/:id/progress", get(routes::progress))
        .route("/api/websites/:id/issues", get(routes::list_issues))
        .route("/api/websites/:id/export", get(routes::export))
        // Pages
        .route("/api/pages/:id/checklist", get(routes::checklist))
        .route("/api/pages/:id/results/:test_type", put(routes::record_result))
        .route("/api/pages/:id/issues", post(routes::log_issue))
        // Issues
        .route("/api/issues/:id", patch(routes::set_issue_status))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Serve the API on an already bound listener until the task is dropped.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> Result<()> {
    let addr = listener.local_addr().context("listener has no address")?;
    info!("Listening on http://{addr}");
    axum::serve(listener, router(state))
        .await
        .context("server error")
}
