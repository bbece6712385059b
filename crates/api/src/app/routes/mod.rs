use axum::Router;

pub mod beers;
pub mod system;

/// Base path of the beer catalog endpoints.
pub const BEERS_PATH: &str = "/api/v1/beers";

/// Router for all catalog endpoints.
pub fn router() -> Router {
    Router::new().nest(BEERS_PATH, beers::router())
}
