use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use brujula_ai::ChatInput;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::RequestContext;

pub async fn chat_flow(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<ChatInput>, JsonRejection>,
) -> axum::response::Response {
    let Json(input) = match payload {
        Ok(input) => input,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    let Some(flow) = services.chat() else {
        return errors::json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "chat_unavailable",
            "no language model is configured",
        );
    };

    match flow.run(&input).await {
        Ok(result) => Json(dto::ChatResponse { result }).into_response(),
        Err(e) => {
            tracing::warn!(request_id = %ctx.request_id(), error = %e, "chat flow failed");
            errors::ai_error_to_response(e)
        }
    }
}
