//! Record endpoint handlers.
//!
//! Handlers only orchestrate: parse the id, call the store, shape the
//! envelope. Field validation for update (and, optionally, create) runs
//! earlier in [`crate::http::middleware::validate_record`], which hands the
//! validated fields over as a request extension.

use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, Path, Request, State},
    http::{header::CONTENT_TYPE, request::Parts, HeaderMap},
    Extension, Form,
};

use crate::http::envelope::{ApiError, ApiResponse};
use crate::http::server::AppState;
use crate::records::{FormPayload, Record, RecordFields, RecordId, RecordPayload};
use crate::store::RecordStore;

/// Request body parsed into a loosely-typed record payload.
///
/// Rejects anything that is not a JSON object or a URL-encoded form with the
/// uniform envelope.
#[derive(Debug)]
pub struct RecordBody(pub RecordPayload);

impl<S> FromRequest<S> for RecordBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let (_, _, payload) = read_payload(req).await?;
        Ok(RecordBody(payload))
    }
}

/// Buffer the body and decode it, handing back the parts and raw bytes so the
/// request can be rebuilt.
///
/// Body limit rejections keep their status (413).
pub(crate) async fn read_payload(
    req: Request,
) -> Result<(Parts, Bytes, RecordPayload), ApiError> {
    let (parts, body) = req.into_parts();
    let bytes = Bytes::from_request(Request::from_parts(parts.clone(), body), &()).await?;
    tracing::debug!(body = %String::from_utf8_lossy(&bytes), "Record payload");

    let payload = if is_form(&parts.headers) {
        let req = Request::from_parts(parts.clone(), Body::from(bytes.clone()));
        let Form(form) = Form::<FormPayload>::from_request(req, &())
            .await
            .map_err(|_| ApiError::EmptyBody)?;
        RecordPayload::from(form)
    } else {
        RecordPayload::parse(&bytes).map_err(|_| ApiError::EmptyBody)?
    };
    Ok((parts, bytes, payload))
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"))
}

/// GET /api/test
pub async fn api_test() -> ApiResponse<()> {
    ApiResponse::alive("API is working correctly")
}

/// GET /api/records
pub async fn list_records(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Record>>, ApiError> {
    let records = state.store.list().await.map_err(ApiError::Read)?;
    Ok(ApiResponse::list(records))
}

/// POST /api/records, unvalidated: absent fields get placeholder values.
pub async fn create_record(
    State(state): State<AppState>,
    RecordBody(payload): RecordBody,
) -> Result<ApiResponse<Record>, ApiError> {
    if payload.is_empty() {
        return Err(ApiError::EmptyBody);
    }
    insert(&state, payload.into_fields_with_defaults()).await
}

/// POST /api/records behind the validation middleware.
pub async fn create_validated_record(
    State(state): State<AppState>,
    Extension(fields): Extension<RecordFields>,
) -> Result<ApiResponse<Record>, ApiError> {
    insert(&state, fields).await
}

async fn insert(state: &AppState, fields: RecordFields) -> Result<ApiResponse<Record>, ApiError> {
    let record = state.store.insert(fields).await.map_err(ApiError::Write)?;
    tracing::info!(record_id = %record.id, "Record created");
    Ok(ApiResponse::created("Record created successfully", record))
}

/// GET /api/records/{id}
pub async fn get_record(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<ApiResponse<Record>, ApiError> {
    let id = parse_id(state.store.as_ref(), &raw_id)?;
    let record = state
        .store
        .get(&id)
        .await
        .map_err(ApiError::Read)?
        .ok_or(ApiError::NotFound)?;
    Ok(ApiResponse::ok(record))
}

/// PUT /api/records/{id}: full replacement with validated fields.
pub async fn update_record(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Extension(fields): Extension<RecordFields>,
) -> Result<ApiResponse<Record>, ApiError> {
    let id = parse_id(state.store.as_ref(), &raw_id)?;
    let record = state
        .store
        .replace(&id, fields)
        .await
        .map_err(ApiError::Write)?
        .ok_or(ApiError::NotFound)?;
    tracing::info!(record_id = %record.id, "Record updated");
    Ok(ApiResponse::updated("Record updated successfully", record))
}

/// DELETE /api/records/{id}
pub async fn delete_record(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<ApiResponse<()>, ApiError> {
    let id = parse_id(state.store.as_ref(), &raw_id)?;
    state
        .store
        .delete(&id)
        .await
        .map_err(ApiError::Read)?
        .ok_or(ApiError::NotFound)?;
    tracing::info!(record_id = %id, "Record deleted");
    Ok(ApiResponse::message("Record deleted successfully"))
}

/// Fallback for unknown paths.
pub async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}

fn parse_id(store: &dyn RecordStore, raw: &str) -> Result<RecordId, ApiError> {
    store.parse_id(raw).ok_or(ApiError::InvalidId)
}
