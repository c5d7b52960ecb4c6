//! HTTP error replies.
//!
//! Every failure is answered with the same JSON shape as a successful save,
//! `{"success": false, "error": "..."}`, so clients have one reply type to parse.

use crate::store::StoreError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use booklist_ledger::SaveResponse;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Request body is not a ledger document.
    #[error("Lỗi decode JSON: {0}")]
    BadRequest(String),
    /// The data file could not be read or written.
    #[error("{context}: {source}")]
    Storage {
        context: &'static str,
        source: StoreError,
    },
}

impl ApiError {
    pub fn storage(context: &'static str, source: StoreError) -> Self {
        Self::Storage { context, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, "request rejected");
        }
        (status, Json(SaveResponse::failure(self.to_string()))).into_response()
    }
}
