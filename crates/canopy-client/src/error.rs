use thiserror::Error;

/// Error type for the export orchestrator.
///
/// Every variant restores the orchestrator to idle before it reaches the
/// caller; none of them are retried automatically.
#[derive(Debug, Error)]
pub enum ClientError {
  /// Transport-level failure talking to the export endpoint.
  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),

  /// The export endpoint answered with a non-success status.
  #[error("export endpoint returned {status}: {message}")]
  Status { status: u16, message: String },

  /// The archive assembler failed.
  #[error(transparent)]
  Archive(#[from] ArchiveError),

  /// Writing the downloaded archive failed.
  #[error("failed to write archive: {0}")]
  Io(#[from] std::io::Error),
}

/// Error type for archive assembly.
#[derive(Debug, Error)]
pub enum ArchiveError {
  #[error("zip error: {0}")]
  Zip(#[from] zip::result::ZipError),

  #[error("serialization error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}
