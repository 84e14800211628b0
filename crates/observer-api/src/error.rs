//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by the tracker or an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// The stored history is inconsistent (out of order or foreign records).
  #[error("data integrity error: {0}")]
  Integrity(#[source] observer_core::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("chart error: {0}")]
  Render(#[from] observer_chart::Error),
}

impl ApiError {
  pub(crate) fn store(error: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(error))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Integrity(_) | ApiError::Store(_) | ApiError::Render(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    };
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone as _, Utc};

  use super::*;

  #[test]
  fn statuses_follow_the_error_kind() {
    let at = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
    let cases = [
      (ApiError::NotFound("guild 1".into()), StatusCode::NOT_FOUND),
      (ApiError::BadRequest("nope".into()), StatusCode::BAD_REQUEST),
      (
        ApiError::Integrity(observer_core::Error::OutOfOrder {
          index:    1,
          previous: at,
          current:  at,
        }),
        StatusCode::INTERNAL_SERVER_ERROR,
      ),
      (
        ApiError::store(std::io::Error::other("disk")),
        StatusCode::INTERNAL_SERVER_ERROR,
      ),
    ];

    for (error, expected) in cases {
      assert_eq!(error.into_response().status(), expected);
    }
  }
}
