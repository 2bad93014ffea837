use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::aggregate::WorkspaceRecords;
use crate::bundle::{ExportBundle, FolderEntry, Variable, WorkflowEntry, WorkflowSummary};
use crate::state::RunState;

/// Merge aggregated records into the export bundle.
///
/// Pure projection: performs no I/O and produces one entry per fetched
/// workflow and folder, never dropping rows. Workflows without a normalized
/// record go through the same merge path as the rest, with the default-state
/// policy applied by [`RunState::into_snapshot`].
pub fn build_bundle(records: WorkspaceRecords, exported_at: DateTime<Utc>) -> ExportBundle {
  let WorkspaceRecords {
    workflows,
    folders,
    mut states,
  } = records;

  let workflows = workflows
    .into_iter()
    .map(|workflow| {
      let state =
        RunState::resolve(states.remove(&workflow.id)).into_snapshot(&workflow, exported_at);
      let variables = project_variables(&workflow.variables.0);

      WorkflowEntry {
        workflow: WorkflowSummary {
          id: workflow.id,
          name: workflow.name,
          description: workflow.description,
          color: workflow.color,
          folder_id: workflow.folder_id,
        },
        state,
        variables,
      }
    })
    .collect();

  let folders = folders
    .into_iter()
    .map(|folder| FolderEntry {
      id: folder.id,
      name: folder.name,
      parent_id: folder.parent_id,
    })
    .collect();

  ExportBundle { workflows, folders }
}

/// Project the workflow's variable mapping to the exported list.
///
/// Takes the mapping's values in iteration order and keeps exactly id,
/// name, type and value; anything else a variable record carries is
/// dropped.
fn project_variables(variables: &Value) -> Vec<Variable> {
  let Some(entries) = variables.as_object() else {
    return Vec::new();
  };

  entries.values().map(project_variable).collect()
}

fn project_variable(value: &Value) -> Variable {
  Variable {
    id: field_string(value, "id"),
    name: field_string(value, "name"),
    kind: field_string(value, "type"),
    value: value.get("value").cloned().unwrap_or(Value::Null),
  }
}

fn field_string(value: &Value, key: &str) -> String {
  value
    .get(key)
    .and_then(Value::as_str)
    .unwrap_or_default()
    .to_string()
}
