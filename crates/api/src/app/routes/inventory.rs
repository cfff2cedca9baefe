use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Extension, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    response::IntoResponse,
    routing::{get, post},
};

use brujula_inventory::RESULT_LIMIT;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/search", post(search))
        .route("/highlights", get(highlights))
}

/// The inventory tool as the model sees it: always 200 with grounding text,
/// upstream failures included.
pub async fn tool_search(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<dto::InventorySearchRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match payload {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    let text = services.inventory_tool().run(&body.query).await;
    Json(dto::ToolTextResponse { text }).into_response()
}

pub async fn search(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<dto::InventorySearchRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match payload {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    let outcome = services.search().search(&body.query).await;
    match outcome {
        Ok(result) => Json(dto::InventorySearchResponse::new(body.query, result)).into_response(),
        Err(e) => errors::hub_error_to_response(e),
    }
}

pub async fn highlights(
    Extension(services): Extension<Arc<AppServices>>,
    params: Result<Query<dto::HighlightsQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => return errors::query_rejection_to_response(rejection),
    };
    let limit = params.limit.unwrap_or(RESULT_LIMIT);
    match services.search().highlights(limit).await {
        Ok(products) => Json(dto::HighlightsResponse { products }).into_response(),
        Err(e) => errors::hub_error_to_response(e),
    }
}
