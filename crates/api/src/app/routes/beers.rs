use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};

use beerstock_inventory::BeerId;

use crate::app::dto::{BeerDto, QuantityDto};
use crate::app::errors;
use crate::app::services::AppServices;

/// `GET /{key}` looks up by name while `DELETE /{key}` and the adjustment
/// routes take an id; axum needs one parameter name per path segment.
pub fn router() -> Router {
    Router::new()
        .route("/", get(list_beers).post(create_beer))
        .route("/:key", get(find_by_name).delete(delete_by_id))
        .route("/:key/increment", patch(increment))
        .route("/:key/decrement", patch(decrement))
}

pub async fn create_beer(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<BeerDto>, JsonRejection>,
) -> axum::response::Response {
    let Json(dto) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    if let Err(e) = dto.validate() {
        return errors::domain_error_to_response(e);
    }

    match services.beers().create_beer(dto).await {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn find_by_name(
    Extension(services): Extension<Arc<AppServices>>,
    Path(name): Path<String>,
) -> axum::response::Response {
    match services.beers().find_by_name(&name).await {
        Ok(beer) => (StatusCode::OK, Json(beer)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_beers(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.beers().list_all().await {
        Ok(beers) => (StatusCode::OK, Json(beers)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_by_id(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: BeerId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.beers().delete_by_id(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn increment(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<QuantityDto>, JsonRejection>,
) -> axum::response::Response {
    let (id, quantity) = match parse_adjustment(&id, body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.beers().increment(id, quantity).await {
        Ok(beer) => (StatusCode::OK, Json(beer)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn decrement(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<QuantityDto>, JsonRejection>,
) -> axum::response::Response {
    let (id, quantity) = match parse_adjustment(&id, body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.beers().decrement(id, quantity).await {
        Ok(beer) => (StatusCode::OK, Json(beer)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

fn parse_adjustment(
    id: &str,
    body: Result<Json<QuantityDto>, JsonRejection>,
) -> Result<(BeerId, u32), axum::response::Response> {
    let id: BeerId = id.parse().map_err(errors::domain_error_to_response)?;
    let Json(dto) = body.map_err(errors::json_rejection_to_response)?;
    let quantity = dto.validate().map_err(errors::domain_error_to_response)?;
    Ok((id, quantity))
}
