use std::collections::HashMap;

use canopy_store::{FolderRow, NormalizedState, Store, WorkflowRow};
use tracing::debug;

use crate::error::ExportError;

/// Everything fetched for one export operation, before projection.
#[derive(Debug, Default)]
pub struct WorkspaceRecords {
  pub workflows: Vec<WorkflowRow>,
  pub folders: Vec<FolderRow>,
  pub states: HashMap<String, NormalizedState>,
}

/// Fetch all records needed to export a workspace.
///
/// The workflow and folder reads are independent and run concurrently. The
/// normalized-state lookup depends on the fetched workflow ids and runs
/// after the workflow read, as one bulk operation for the whole id list.
pub async fn aggregate(
  store: &dyn Store,
  workspace_id: &str,
) -> Result<WorkspaceRecords, ExportError> {
  let (workflows, folders) = tokio::try_join!(
    store.list_workflows(workspace_id),
    store.list_folders(workspace_id),
  )?;

  let workflow_ids: Vec<String> = workflows.iter().map(|w| w.id.clone()).collect();
  let states = store.load_normalized_states(&workflow_ids).await?;

  debug!(
    workflows = workflows.len(),
    folders = folders.len(),
    normalized = states.len(),
    "aggregated workspace records"
  );

  Ok(WorkspaceRecords {
    workflows,
    folders,
    states,
  })
}
