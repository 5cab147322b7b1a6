// rest/mod.rs — Public REST API server.
//
// Endpoints:
//   GET    /api/v1/health
//   POST   /api/v1/auth/register
//   POST   /api/v1/auth/login
//   POST   /api/v1/data/generate
//   GET    /api/v1/datasets
//   GET    /api/v1/datasets/{id}
//   PUT    /api/v1/datasets/{id}
//   DELETE /api/v1/datasets/{id}
//   GET    /api/v1/datasets/{id}/export?format=json|csv

pub mod routes;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::AppContext;

pub async fn start_rest_server(ctx: Arc<AppContext>) -> Result<()> {
    let bind = format!("{}:{}", ctx.config.bind_address, ctx.config.port);
    let addr: SocketAddr = bind.parse()?;

    let router = build_router(ctx);

    info!("REST API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        // Health (no auth)
        .route("/api/v1/health", get(routes::health::health))
        // Auth
        .route("/api/v1/auth/register", post(routes::auth::register))
        .route("/api/v1/auth/login", post(routes::auth::login))
        // Generation + datasets
        .route("/api/v1/data/generate", post(routes::datasets::generate))
        .route("/api/v1/datasets", get(routes::datasets::list_datasets))
        .route(
            "/api/v1/datasets/{id}",
            get(routes::datasets::get_dataset)
                .put(routes::datasets::update_dataset)
                .delete(routes::datasets::delete_dataset),
        )
        .route(
            "/api/v1/datasets/{id}/export",
            get(routes::datasets::export_dataset),
        )
        // The browser frontend is served separately.
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}
