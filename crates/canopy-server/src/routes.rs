use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::get;
use axum::{Json, Router};
use canopy_export::{ExportBundle, aggregate, build_bundle};
use canopy_store::Store;
use chrono::Utc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{Instrument, error, info, info_span};

use crate::auth;
use crate::error::ApiError;

/// Shared state of the export server.
#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn Store>,
}

impl AppState {
  pub fn new(store: Arc<dyn Store>) -> Self {
    Self { store }
  }
}

/// Build the export router.
pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/workspaces/:workspace_id/export", get(export_workspace))
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive())
    .with_state(state)
}

/// `GET /workspaces/{workspace_id}/export`
///
/// Access is confirmed before any workspace data is read. The whole request
/// runs inside a span carrying the workspace id, so concurrent exports never
/// share logging context.
async fn export_workspace(
  State(state): State<AppState>,
  Path(workspace_id): Path<String>,
  headers: HeaderMap,
) -> Result<Json<ExportBundle>, ApiError> {
  let span = info_span!("workspace_export", workspace_id = %workspace_id);
  let started = Instant::now();

  async move {
    let store = state.store.as_ref();

    let session = auth::authenticate(store, &headers).await?;
    auth::check_access(store, &session.user_id, &workspace_id).await?;

    let records = aggregate(store, &workspace_id).await.inspect_err(|e| {
      error!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        error = %e,
        "workspace export failed"
      );
    })?;
    let bundle = build_bundle(records, Utc::now());

    info!(
      elapsed_ms = started.elapsed().as_millis() as u64,
      workflows = bundle.workflows.len(),
      folders = bundle.folders.len(),
      "exported workspace"
    );

    Ok(Json(bundle))
  }
  .instrument(span)
  .await
}
