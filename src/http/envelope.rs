//! Uniform response envelope.
//!
//! Every endpoint answers with
//! `{ success, message?, count?, data?, errors?, timestamp? }`. Success bodies
//! are built through [`ApiResponse`]; failures through [`ApiError`], which owns
//! the mapping from error kind to HTTP status.

use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::StoreError;

/// The JSON body shared by every response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl<T> Envelope<T> {
    fn success() -> Self {
        Self {
            success: true,
            message: None,
            count: None,
            data: None,
            errors: None,
            timestamp: None,
        }
    }
}

impl Envelope<()> {
    fn failure(message: String, errors: Option<Vec<String>>) -> Self {
        Self {
            success: false,
            message: Some(message),
            count: None,
            data: None,
            errors,
            timestamp: None,
        }
    }
}

/// A successful response: status plus envelope.
#[derive(Debug)]
pub struct ApiResponse<T> {
    status: StatusCode,
    body: Envelope<T>,
}

impl<T> ApiResponse<T> {
    /// 200 with `data` and no message.
    pub fn ok(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            body: Envelope {
                data: Some(data),
                ..Envelope::success()
            },
        }
    }

    /// 200 with a message and `data`.
    pub fn updated(message: &str, data: T) -> Self {
        Self {
            status: StatusCode::OK,
            body: Envelope {
                message: Some(message.to_string()),
                data: Some(data),
                ..Envelope::success()
            },
        }
    }

    /// 201 with a message and `data`.
    pub fn created(message: &str, data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            body: Envelope {
                message: Some(message.to_string()),
                data: Some(data),
                ..Envelope::success()
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn envelope(&self) -> &Envelope<T> {
        &self.body
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// 200 with `count` and the full sequence.
    pub fn list(items: Vec<T>) -> Self {
        Self {
            status: StatusCode::OK,
            body: Envelope {
                count: Some(items.len()),
                data: Some(items),
                ..Envelope::success()
            },
        }
    }
}

impl ApiResponse<()> {
    /// 200 with only a message.
    pub fn message(message: &str) -> Self {
        Self {
            status: StatusCode::OK,
            body: Envelope {
                message: Some(message.to_string()),
                ..Envelope::success()
            },
        }
    }

    /// 200 with a message and the current server time.
    pub fn alive(message: &str) -> Self {
        Self {
            status: StatusCode::OK,
            body: Envelope {
                message: Some(message.to_string()),
                timestamp: Some(Utc::now()),
                ..Envelope::success()
            },
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Every way a request can fail.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid ID format")]
    InvalidId,

    #[error("Empty request body or invalid JSON format")]
    EmptyBody,

    /// The transport could not deliver the body (too large, aborted, ...).
    #[error("{message}")]
    Body { status: StatusCode, message: String },

    #[error("Validation failed")]
    Validation(Vec<String>),

    #[error("Record not found")]
    NotFound,

    #[error("Route not found")]
    RouteNotFound,

    /// Store failure on a write (create, update).
    #[error("{0}")]
    Write(#[source] StoreError),

    /// Store failure on a read or delete.
    #[error("{0}")]
    Read(#[source] StoreError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidId
            | ApiError::EmptyBody
            | ApiError::Validation(_)
            | ApiError::Write(_) => StatusCode::BAD_REQUEST,
            ApiError::Body { status, .. } => *status,
            ApiError::NotFound | ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::Read(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The failure envelope for this error.
    pub fn envelope(&self) -> Envelope<()> {
        let errors = match self {
            ApiError::Validation(errors) => Some(errors.clone()),
            _ => None,
        };
        Envelope::failure(self.to_string(), errors)
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        ApiError::Body {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            ApiError::Write(e) | ApiError::Read(e) => {
                tracing::error!(status = status.as_u16(), error = %e, "Record store error");
            }
            _ => tracing::debug!(status = status.as_u16(), error = %self, "Request rejected"),
        }
        (status, Json(self.envelope())).into_response()
    }
}
