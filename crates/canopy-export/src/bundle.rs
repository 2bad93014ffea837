use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The transmission unit of a workspace export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportBundle {
  pub workflows: Vec<WorkflowEntry>,
  pub folders: Vec<FolderEntry>,
}

/// One workflow in the bundle: the projected record, its resolved run
/// state, and its variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowEntry {
  pub workflow: WorkflowSummary,
  pub state: StateSnapshot,
  pub variables: Vec<Variable>,
}

/// Projection of a workflow record. Deployment fields live under
/// [`StateSnapshot`], not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSummary {
  pub id: String,
  pub name: String,
  pub description: Option<String>,
  pub color: String,
  pub folder_id: Option<String>,
}

/// A workflow's run state as exported.
///
/// All four containers are always populated, either from normalized storage
/// or from the default-state policy. `last_saved` is stamped to export time
/// in epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
  pub blocks: Map<String, Value>,
  pub edges: Vec<Value>,
  pub loops: Map<String, Value>,
  pub parallels: Map<String, Value>,
  pub last_saved: i64,
  pub is_deployed: bool,
  pub deployed_at: Option<DateTime<Utc>>,
}

/// A workflow variable projected to exactly these four fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
  pub id: String,
  pub name: String,
  #[serde(rename = "type")]
  pub kind: String,
  pub value: Value,
}

/// Projection of a folder record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderEntry {
  pub id: String,
  pub name: String,
  pub parent_id: Option<String>,
}
