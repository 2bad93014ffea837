//! Canopy Store
//!
//! This crate provides the storage trait and implementations for workspace
//! data. Data is persisted to a database (SQLite).
//!
//! The [`Store`] trait defines the read operations the export pipeline
//! needs:
//! - Looking up sessions and workspace permissions
//! - Listing the workflows and folders of a workspace
//! - Bulk-loading normalized workflow state for a set of workflow ids
//!
//! Normalized state lives in separate tables (blocks, edges, subflows)
//! rather than in the workflow record itself; a workflow without any rows in
//! those tables has simply never been persisted in normalized form.

mod sqlite;
mod types;

pub use sqlite::SqliteStore;
pub use types::{
  FolderRow, NormalizedState, Permission, PermissionType, Session, WorkflowRow,
};

use std::collections::HashMap;

use async_trait::async_trait;

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// A database error occurred.
  #[error("database error: {0}")]
  Database(#[from] sqlx::Error),
}

/// Storage trait for workspace export reads.
///
/// All operations are read-only snapshots; nothing in this trait creates,
/// mutates, or deletes rows.
#[async_trait]
pub trait Store: Send + Sync {
  /// Look up a session by its bearer token.
  async fn get_session(&self, token: &str) -> Result<Option<Session>, Error>;

  /// Look up a user's permission record for a workspace.
  async fn get_workspace_permission(
    &self,
    user_id: &str,
    workspace_id: &str,
  ) -> Result<Option<Permission>, Error>;

  /// List all workflows belonging to a workspace.
  async fn list_workflows(&self, workspace_id: &str) -> Result<Vec<WorkflowRow>, Error>;

  /// List all folders belonging to a workspace.
  async fn list_folders(&self, workspace_id: &str) -> Result<Vec<FolderRow>, Error>;

  /// Bulk-load normalized state for the given workflow ids.
  ///
  /// Returns a mapping that contains an entry only for workflow ids with at
  /// least one normalized row; ids without normalized state are absent. The
  /// implementation must issue a bounded number of queries regardless of how
  /// many ids are passed.
  async fn load_normalized_states(
    &self,
    workflow_ids: &[String],
  ) -> Result<HashMap<String, NormalizedState>, Error>;
}
