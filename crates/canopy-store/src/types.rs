use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use sqlx::types::Json;

/// Permission level a user holds on a workspace.
///
/// Export only requires that a record exists; the level is carried for
/// callers that need to distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum PermissionType {
  Admin,
  Write,
  Read,
}

/// An authenticated session as stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Session {
  pub token: String,
  pub user_id: String,
  pub expires_at: DateTime<Utc>,
}

/// A user's permission record for a workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Permission {
  pub user_id: String,
  pub workspace_id: String,
  pub permission_type: PermissionType,
}

/// A workflow as stored in the database.
///
/// `variables` is a JSON object mapping variable id to a variable record;
/// the mapping's order carries no meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct WorkflowRow {
  pub id: String,
  pub workspace_id: String,
  pub name: String,
  pub description: Option<String>,
  pub color: String,
  pub folder_id: Option<String>,
  pub is_deployed: bool,
  pub deployed_at: Option<DateTime<Utc>>,
  pub variables: Json<Value>,
}

/// A workflow folder as stored in the database.
///
/// `parent_id` is null for top-level folders, otherwise it references
/// another folder in the same workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FolderRow {
  pub id: String,
  pub workspace_id: String,
  pub name: String,
  pub parent_id: Option<String>,
}

/// Workflow run state reconstructed from the normalized tables.
///
/// All four containers are always present once a record exists; a workflow
/// with no normalized rows at all has no record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedState {
  pub blocks: Map<String, Value>,
  pub edges: Vec<Value>,
  pub loops: Map<String, Value>,
  pub parallels: Map<String, Value>,
}
