//! Route middleware.

use std::time::Instant;

use axum::{
    body::Body,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};

use crate::http::envelope::ApiError;
use crate::http::handlers::read_payload;
use crate::observability::metrics;
use crate::records::validate_payload;

/// Validate a record body before the handler runs.
///
/// On success the validated [`crate::records::RecordFields`] are attached to
/// the request extensions and the original body is passed through untouched.
pub async fn validate_record(request: Request, next: Next) -> Result<Response, ApiError> {
    let (parts, bytes, payload) = read_payload(request).await?;
    let fields = validate_payload(&payload).map_err(|errors| {
        tracing::debug!(path = %parts.uri.path(), ?errors, "Record validation failed");
        ApiError::Validation(errors)
    })?;

    let mut request = Request::from_parts(parts, Body::from(bytes));
    request.extensions_mut().insert(fields);
    Ok(next.run(request).await)
}

/// Record request count and latency per matched route.
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| request.uri().path().to_owned());

    let response = next.run(request).await;
    metrics::record_request(&method, &route, response.status().as_u16(), start);
    response
}
