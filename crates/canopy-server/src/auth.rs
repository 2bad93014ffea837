use axum::http::{HeaderMap, header};
use canopy_store::{Permission, Session, Store};
use chrono::Utc;
use tracing::debug;

use crate::error::ApiError;

/// Resolve the bearer session from the request headers.
///
/// Missing, unknown and expired tokens all surface as `Unauthorized`.
pub async fn authenticate(store: &dyn Store, headers: &HeaderMap) -> Result<Session, ApiError> {
  let token = bearer_token(headers).ok_or(ApiError::Unauthorized)?;

  let session = store
    .get_session(token)
    .await?
    .ok_or(ApiError::Unauthorized)?;

  if session.expires_at <= Utc::now() {
    debug!(user_id = %session.user_id, "session expired");
    return Err(ApiError::Unauthorized);
  }

  Ok(session)
}

/// Verify the user holds a permission record for the workspace.
///
/// Callers must not fetch any workspace data before this succeeds. A
/// missing record and a missing workspace are indistinguishable by design.
pub async fn check_access(
  store: &dyn Store,
  user_id: &str,
  workspace_id: &str,
) -> Result<Permission, ApiError> {
  store
    .get_workspace_permission(user_id, workspace_id)
    .await?
    .ok_or(ApiError::NotFoundOrDenied)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(header::AUTHORIZATION)?
    .to_str()
    .ok()?
    .strip_prefix("Bearer ")
}
