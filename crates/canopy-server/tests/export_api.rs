//! End-to-end tests for the export endpoint against an in-memory store.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use canopy_server::{AppState, router};
use canopy_store::{
  Error, FolderRow, NormalizedState, Permission, PermissionType, Session, Store, WorkflowRow,
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{Map, Value, json};
use sqlx::types::Json;
use tower::ServiceExt;

#[derive(Default)]
struct MemoryStore {
  sessions: Vec<Session>,
  permissions: Vec<Permission>,
  workflows: Vec<WorkflowRow>,
  folders: Vec<FolderRow>,
  states: HashMap<String, NormalizedState>,
  fail_reads: bool,
  data_fetched: AtomicBool,
}

#[async_trait]
impl Store for MemoryStore {
  async fn get_session(&self, token: &str) -> Result<Option<Session>, Error> {
    Ok(self.sessions.iter().find(|s| s.token == token).cloned())
  }

  async fn get_workspace_permission(
    &self,
    user_id: &str,
    workspace_id: &str,
  ) -> Result<Option<Permission>, Error> {
    Ok(
      self
        .permissions
        .iter()
        .find(|p| p.user_id == user_id && p.workspace_id == workspace_id)
        .cloned(),
    )
  }

  async fn list_workflows(&self, workspace_id: &str) -> Result<Vec<WorkflowRow>, Error> {
    self.data_fetched.store(true, Ordering::SeqCst);
    if self.fail_reads {
      return Err(Error::Database(sqlx::Error::PoolClosed));
    }
    Ok(
      self
        .workflows
        .iter()
        .filter(|w| w.workspace_id == workspace_id)
        .cloned()
        .collect(),
    )
  }

  async fn list_folders(&self, workspace_id: &str) -> Result<Vec<FolderRow>, Error> {
    self.data_fetched.store(true, Ordering::SeqCst);
    if self.fail_reads {
      return Err(Error::Database(sqlx::Error::PoolClosed));
    }
    Ok(
      self
        .folders
        .iter()
        .filter(|f| f.workspace_id == workspace_id)
        .cloned()
        .collect(),
    )
  }

  async fn load_normalized_states(
    &self,
    workflow_ids: &[String],
  ) -> Result<HashMap<String, NormalizedState>, Error> {
    self.data_fetched.store(true, Ordering::SeqCst);
    Ok(
      self
        .states
        .iter()
        .filter(|(id, _)| workflow_ids.contains(id))
        .map(|(id, state)| (id.clone(), state.clone()))
        .collect(),
    )
  }
}

fn session(token: &str, user_id: &str) -> Session {
  Session {
    token: token.to_string(),
    user_id: user_id.to_string(),
    expires_at: Utc::now() + Duration::hours(1),
  }
}

fn permission(user_id: &str, workspace_id: &str) -> Permission {
  Permission {
    user_id: user_id.to_string(),
    workspace_id: workspace_id.to_string(),
    permission_type: PermissionType::Admin,
  }
}

fn workflow_row(id: &str, workspace_id: &str) -> WorkflowRow {
  WorkflowRow {
    id: id.to_string(),
    workspace_id: workspace_id.to_string(),
    name: format!("workflow {id}"),
    description: None,
    color: "#3972F6".to_string(),
    folder_id: None,
    is_deployed: false,
    deployed_at: None,
    variables: Json(json!({})),
  }
}

async fn send(store: MemoryStore, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
  let store = Arc::new(store);
  let app = router(AppState::new(store));

  let mut request = Request::builder().uri(uri);
  if let Some(token) = token {
    request = request.header("authorization", format!("Bearer {token}"));
  }

  let response = app
    .oneshot(request.body(Body::empty()).unwrap())
    .await
    .unwrap();

  let status = response.status();
  let bytes = response.into_body().collect().await.unwrap().to_bytes();
  let body: Value = serde_json::from_slice(&bytes).unwrap();
  (status, body)
}

#[tokio::test]
async fn missing_session_is_unauthorized() {
  let store = MemoryStore::default();
  let (status, body) = send(store, "/workspaces/ws-a/export", None).await;

  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(body, json!({ "error": "Unauthorized" }));
}

#[tokio::test]
async fn expired_session_is_unauthorized() {
  let mut expired = session("tok-1", "user-1");
  expired.expires_at = Utc::now() - Duration::hours(1);
  let store = MemoryStore {
    sessions: vec![expired],
    ..MemoryStore::default()
  };

  let (status, body) = send(store, "/workspaces/ws-a/export", Some("tok-1")).await;

  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(body, json!({ "error": "Unauthorized" }));
}

#[tokio::test]
async fn missing_permission_is_not_found_and_fetches_no_data() {
  let store = MemoryStore {
    sessions: vec![session("tok-1", "user-1")],
    workflows: vec![workflow_row("w1", "ws-a")],
    ..MemoryStore::default()
  };
  let store = Arc::new(store);
  let app = router(AppState::new(store.clone()));

  let response = app
    .oneshot(
      Request::builder()
        .uri("/workspaces/ws-a/export")
        .header("authorization", "Bearer tok-1")
        .body(Body::empty())
        .unwrap(),
    )
    .await
    .unwrap();

  assert_eq!(response.status(), StatusCode::NOT_FOUND);
  let bytes = response.into_body().collect().await.unwrap().to_bytes();
  let body: Value = serde_json::from_slice(&bytes).unwrap();
  assert_eq!(body, json!({ "error": "Workspace not found or access denied" }));

  // Access is checked before any workspace data is read.
  assert!(!store.data_fetched.load(Ordering::SeqCst));
}

#[tokio::test]
async fn aggregation_failure_returns_generic_500() {
  let store = MemoryStore {
    sessions: vec![session("tok-1", "user-1")],
    permissions: vec![permission("user-1", "ws-a")],
    fail_reads: true,
    ..MemoryStore::default()
  };

  let (status, body) = send(store, "/workspaces/ws-a/export", Some("tok-1")).await;

  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(body, json!({ "error": "Failed to export workspace" }));
}

#[tokio::test]
async fn exports_workspace_bundle() {
  let mut blocks = Map::new();
  blocks.insert("a".to_string(), json!(1));
  let mut states = HashMap::new();
  states.insert(
    "w1".to_string(),
    NormalizedState {
      blocks,
      ..NormalizedState::default()
    },
  );

  let store = MemoryStore {
    sessions: vec![session("tok-1", "user-1")],
    permissions: vec![permission("user-1", "ws-a")],
    workflows: vec![workflow_row("w1", "ws-a"), workflow_row("w2", "ws-a")],
    folders: vec![FolderRow {
      id: "f1".to_string(),
      workspace_id: "ws-a".to_string(),
      name: "root".to_string(),
      parent_id: None,
    }],
    states,
    ..MemoryStore::default()
  };

  let (status, body) = send(store, "/workspaces/ws-a/export", Some("tok-1")).await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["workflows"].as_array().unwrap().len(), 2);
  assert_eq!(body["workflows"][0]["workflow"]["id"], json!("w1"));
  assert_eq!(body["workflows"][0]["state"]["blocks"], json!({ "a": 1 }));
  assert_eq!(body["workflows"][1]["state"]["blocks"], json!({}));
  assert_eq!(body["workflows"][1]["state"]["edges"], json!([]));
  assert_eq!(body["workflows"][1]["state"]["loops"], json!({}));
  assert_eq!(body["workflows"][1]["state"]["parallels"], json!({}));
  assert_eq!(
    body["folders"],
    json!([{ "id": "f1", "name": "root", "parentId": null }])
  );
}

#[tokio::test]
async fn other_workspace_rows_stay_out_of_the_bundle() {
  let store = MemoryStore {
    sessions: vec![session("tok-1", "user-1")],
    permissions: vec![permission("user-1", "ws-a")],
    workflows: vec![workflow_row("w1", "ws-a"), workflow_row("w9", "ws-b")],
    ..MemoryStore::default()
  };

  let (status, body) = send(store, "/workspaces/ws-a/export", Some("tok-1")).await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["workflows"].as_array().unwrap().len(), 1);
  assert_eq!(body["workflows"][0]["workflow"]["id"], json!("w1"));
}
