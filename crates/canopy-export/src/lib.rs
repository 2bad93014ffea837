//! Canopy Export
//!
//! This crate builds the canonical export bundle for a workspace. The
//! pipeline has two halves:
//!
//! - [`aggregate`] fetches the workspace's workflows and folders and
//!   bulk-loads normalized run state for the fetched workflow ids.
//! - [`build_bundle`] merges those records into the wire schema, applying
//!   the default-state policy for workflows that were never persisted in
//!   normalized form.
//!
//! The bundle is a projection: building it never creates, mutates, or
//! deletes anything in storage, and the result lives only for the duration
//! of one export operation.

mod aggregate;
mod builder;
mod bundle;
mod error;
mod state;

pub use aggregate::{WorkspaceRecords, aggregate};
pub use builder::build_bundle;
pub use bundle::{ExportBundle, FolderEntry, StateSnapshot, Variable, WorkflowEntry, WorkflowSummary};
pub use error::ExportError;
pub use state::RunState;
