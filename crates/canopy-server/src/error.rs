use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use canopy_export::ExportError;
use serde_json::json;
use thiserror::Error;

/// Error taxonomy of the export endpoint.
///
/// `NotFoundOrDenied` deliberately collapses "no permission" and "workspace
/// does not exist" so the response never reveals whether a workspace exists
/// to a caller who cannot access it.
#[derive(Debug, Error)]
pub enum ApiError {
  /// No valid session.
  #[error("unauthorized")]
  Unauthorized,

  /// Valid session, but no permission record for the workspace.
  #[error("workspace not found or access denied")]
  NotFoundOrDenied,

  /// Aggregation failed; detail stays server-side.
  #[error("export failed: {0}")]
  Export(#[from] ExportError),
}

impl From<canopy_store::Error> for ApiError {
  fn from(error: canopy_store::Error) -> Self {
    Self::Export(error.into())
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
      Self::NotFoundOrDenied => (
        StatusCode::NOT_FOUND,
        "Workspace not found or access denied",
      ),
      Self::Export(_) => (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Failed to export workspace",
      ),
    };

    (status, Json(json!({ "error": message }))).into_response()
  }
}
