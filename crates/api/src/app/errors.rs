use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use brujula_ai::AiError;
use brujula_core::{ErrorKind, HubError};

pub fn hub_error_to_response(err: HubError) -> axum::response::Response {
    match err.kind() {
        ErrorKind::Validation => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", err.message())
        }
        ErrorKind::UpstreamUnavailable => {
            json_error(StatusCode::BAD_GATEWAY, "upstream_unavailable", err.message())
        }
    }
}

pub fn ai_error_to_response(err: AiError) -> axum::response::Response {
    match err {
        AiError::InvalidInput(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_input", msg),
        AiError::InferenceFailed(msg) => json_error(StatusCode::BAD_GATEWAY, "inference_failed", msg),
        AiError::Internal(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg)
        }
    }
}

/// Malformed or missing JSON body, with axum's status (400/415/422).
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(rejection.status(), "invalid_body", rejection.body_text())
}

pub fn query_rejection_to_response(rejection: QueryRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_query", rejection.body_text())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
