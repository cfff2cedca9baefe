use std::time::Instant;

use axum::{
    http::{HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::{Instrument, info, info_span};

use crate::context::RequestContext;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Open a span per request carrying a fresh request id, and echo the id back
/// in the `x-request-id` response header.
pub async fn request_context(mut req: Request<axum::body::Body>, next: Next) -> Response {
    let ctx = RequestContext::new();
    req.extensions_mut().insert(ctx);

    let span = info_span!(
        "request",
        request_id = %ctx.request_id(),
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        let started = Instant::now();
        let mut response = next.run(req).await;

        info!(
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request finished"
        );

        if let Ok(value) = HeaderValue::from_str(&ctx.request_id().to_string()) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response
    }
    .instrument(span)
    .await
}
