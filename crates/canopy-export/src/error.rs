use thiserror::Error;

/// Error type for the export pipeline.
///
/// Aggregation is all-or-nothing: any storage failure fails the whole
/// export, never a partial bundle.
#[derive(Debug, Error)]
pub enum ExportError {
  #[error("storage error: {0}")]
  Store(#[from] canopy_store::Error),
}
