//! Canopy Client
//!
//! Client-side coordinator for workspace export. The
//! [`ExportOrchestrator`] fetches the bundle from the export endpoint,
//! hands it to an [`ArchiveAssembler`], and writes the resulting archive to
//! the download directory.
//!
//! Each orchestrator instance guarantees at most one in-flight export: a
//! second call while one is running is a no-op. The latch is scoped to the
//! instance, so two independent orchestrators can still export concurrently.

mod archive;
mod error;
mod orchestrator;

pub use archive::{ArchiveAssembler, BUNDLE_FORMAT_VERSION, ZipAssembler};
pub use error::{ArchiveError, ClientError};
pub use orchestrator::{ExportOrchestrator, ExportOutcome, ExportedArchive, sanitize_name};
