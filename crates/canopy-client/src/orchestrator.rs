use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use canopy_export::ExportBundle;
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info};

use crate::archive::ArchiveAssembler;
use crate::error::ClientError;

/// Outcome of one [`ExportOrchestrator::export`] call.
#[derive(Debug)]
pub enum ExportOutcome {
  /// The export ran to completion and the archive was written.
  Completed(ExportedArchive),
  /// Another export was already in flight on this instance; nothing was
  /// requested.
  AlreadyInFlight,
}

/// The archive written by a completed export.
#[derive(Debug)]
pub struct ExportedArchive {
  pub path: PathBuf,
  pub file_name: String,
  pub workflows: usize,
  pub folders: usize,
}

/// Client-side export coordinator.
///
/// Moves through `Idle -> Exporting -> Idle` per call; the return to idle
/// happens on every exit path, success or failure, so a failed export never
/// blocks the next attempt. The latch is scoped to this instance only.
pub struct ExportOrchestrator<A: ArchiveAssembler> {
  http: reqwest::Client,
  base_url: String,
  token: Option<String>,
  download_dir: PathBuf,
  assembler: A,
  exporting: AtomicBool,
}

impl<A: ArchiveAssembler> ExportOrchestrator<A> {
  pub fn new(
    base_url: impl Into<String>,
    token: Option<String>,
    download_dir: PathBuf,
    assembler: A,
  ) -> Self {
    Self {
      http: reqwest::Client::new(),
      base_url: base_url.into(),
      token,
      download_dir,
      assembler,
      exporting: AtomicBool::new(false),
    }
  }

  /// Export a workspace and write the archive to the download directory.
  ///
  /// Issues exactly one request to the export endpoint per completed
  /// `Idle -> Exporting -> Idle` cycle. If an export is already running on
  /// this instance the call returns [`ExportOutcome::AlreadyInFlight`]
  /// without issuing anything. Failures are propagated, never retried.
  pub async fn export(
    &self,
    workspace_id: &str,
    workspace_name: &str,
  ) -> Result<ExportOutcome, ClientError> {
    let Some(_guard) = FlightGuard::acquire(&self.exporting) else {
      debug!(workspace_id, "export already in flight, ignoring");
      return Ok(ExportOutcome::AlreadyInFlight);
    };

    info!(workspace_id, "exporting workspace");
    let bundle = self.fetch_bundle(workspace_id).await?;

    let bytes = self
      .assembler
      .assemble(workspace_name, &bundle.workflows, &bundle.folders)?;

    let file_name = archive_file_name(workspace_name, Utc::now().timestamp_millis());
    let path = self.download_dir.join(&file_name);
    tokio::fs::write(&path, &bytes).await?;

    info!(
      workflows = bundle.workflows.len(),
      folders = bundle.folders.len(),
      file = %file_name,
      "workspace exported"
    );

    Ok(ExportOutcome::Completed(ExportedArchive {
      path,
      file_name,
      workflows: bundle.workflows.len(),
      folders: bundle.folders.len(),
    }))
  }

  async fn fetch_bundle(&self, workspace_id: &str) -> Result<ExportBundle, ClientError> {
    let url = format!(
      "{}/workspaces/{workspace_id}/export",
      self.base_url.trim_end_matches('/')
    );

    let mut request = self.http.get(&url);
    if let Some(token) = &self.token {
      request = request.bearer_auth(token);
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
      let message = response
        .json::<ErrorBody>()
        .await
        .map(|body| body.error)
        .unwrap_or_else(|_| status.to_string());
      return Err(ClientError::Status {
        status: status.as_u16(),
        message,
      });
    }

    Ok(response.json().await?)
  }
}

#[derive(Deserialize)]
struct ErrorBody {
  error: String,
}

/// Holds the `Exporting` state; releases it when dropped, so every exit
/// path of `export` restores idle.
struct FlightGuard<'a> {
  latch: &'a AtomicBool,
}

impl<'a> FlightGuard<'a> {
  fn acquire(latch: &'a AtomicBool) -> Option<Self> {
    latch
      .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
      .ok()
      .map(|_| Self { latch })
  }
}

impl Drop for FlightGuard<'_> {
  fn drop(&mut self) {
    self.latch.store(false, Ordering::Release);
  }
}

/// Replace every character outside the ASCII alphanumeric range with `-`.
pub fn sanitize_name(name: &str) -> String {
  name
    .chars()
    .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
    .collect()
}

fn archive_file_name(workspace_name: &str, epoch_millis: i64) -> String {
  format!("{}-{epoch_millis}.zip", sanitize_name(workspace_name))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sanitize_replaces_each_special_character() {
    assert_eq!(sanitize_name("My Workspace!@#"), "My-Workspace---");
    assert_eq!(sanitize_name("plain123"), "plain123");
    assert_eq!(sanitize_name(""), "");
  }

  #[test]
  fn archive_file_name_matches_download_convention() {
    assert_eq!(
      archive_file_name("My Workspace!@#", 1_700_000_000_000),
      "My-Workspace---1700000000000.zip"
    );
  }

  #[test]
  fn flight_guard_releases_on_drop() {
    let latch = AtomicBool::new(false);

    {
      let _guard = FlightGuard::acquire(&latch).expect("latch should be free");
      assert!(FlightGuard::acquire(&latch).is_none());
    }

    assert!(FlightGuard::acquire(&latch).is_some());
  }
}
