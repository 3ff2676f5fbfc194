//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// The request could not be extracted (malformed JSON, path or query).
  #[error("{message}")]
  Rejected {
    status:  StatusCode,
    message: String,
  },

  #[error(transparent)]
  Core(#[from] barangay_core::Error),

  #[error(transparent)]
  Media(#[from] barangay_media::Error),
}

impl ApiError {
  fn status(&self) -> StatusCode {
    use barangay_core::Error as Core;
    use barangay_media::Error as Media;

    match self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Rejected { status, .. } => *status,
      ApiError::Core(e) => match e {
        Core::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        Core::IllegalTransition { .. } => StatusCode::CONFLICT,
        Core::ResidentNotFound(_) => StatusCode::NOT_FOUND,
        Core::UnknownStatusCode(_) => StatusCode::BAD_REQUEST,
        Core::Network(_) => StatusCode::SERVICE_UNAVAILABLE,
        Core::RemoteRejected(_) => StatusCode::BAD_GATEWAY,
        Core::Conflict(_) => StatusCode::CONFLICT,
      },
      ApiError::Media(e) => match e {
        Media::InvalidPath(_) => StatusCode::BAD_REQUEST,
        Media::NotFound(_) => StatusCode::NOT_FOUND,
        Media::Expired | Media::BadSignature => StatusCode::FORBIDDEN,
        Media::InvalidSecret | Media::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
      },
    }
  }
}

macro_rules! from_rejection {
  ($($rejection:ty),+) => {
    $(
      impl From<$rejection> for ApiError {
        fn from(rejection: $rejection) -> Self {
          ApiError::Rejected {
            status:  rejection.status(),
            message: rejection.body_text(),
          }
        }
      }
    )+
  };
}

from_rejection!(JsonRejection, PathRejection, QueryRejection);

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
