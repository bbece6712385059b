//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: beer use cases and store selection
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: transfer representations and request validation
//! - `mapper.rs`: entity <-> transfer representation
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use beerstock_infra::AppConfig;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod mapper;
pub mod routes;
pub mod services;

/// Build the full HTTP router from configuration (entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let services = services::build_services(&config.storage).await?;
    Ok(build_router(Arc::new(services)))
}

/// Build the router around already-wired services.
pub fn build_router(services: Arc<AppServices>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::trace_requests))
                .layer(Extension(services)),
        )
}

pub use services::AppServices;
