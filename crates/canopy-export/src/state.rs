use canopy_store::{NormalizedState, WorkflowRow};
use chrono::{DateTime, Utc};

use crate::bundle::StateSnapshot;

/// What normalized storage holds for one workflow.
///
/// The two variants make the default-state policy a single code path:
/// every caller resolves the storage lookup into a `RunState` and lets
/// [`RunState::into_snapshot`] decide what the exported state looks like.
#[derive(Debug, Clone, PartialEq)]
pub enum RunState {
  /// The workflow has a normalized record.
  Normalized(NormalizedState),
  /// The workflow was never persisted in normalized form.
  Missing,
}

impl RunState {
  /// Resolve a bulk-lookup result for one workflow id.
  pub fn resolve(state: Option<NormalizedState>) -> Self {
    match state {
      Some(state) => Self::Normalized(state),
      None => Self::Missing,
    }
  }

  /// Merge this run state with the workflow record into the exported
  /// snapshot.
  ///
  /// The `Missing` arm yields empty containers; both arms stamp
  /// `last_saved` to the export time and copy the deployment fields from
  /// the workflow record.
  pub fn into_snapshot(self, workflow: &WorkflowRow, exported_at: DateTime<Utc>) -> StateSnapshot {
    let state = match self {
      Self::Normalized(state) => state,
      Self::Missing => NormalizedState::default(),
    };

    StateSnapshot {
      blocks: state.blocks,
      edges: state.edges,
      loops: state.loops,
      parallels: state.parallels,
      last_saved: exported_at.timestamp_millis(),
      is_deployed: workflow.is_deployed,
      deployed_at: workflow.deployed_at,
    }
  }
}
