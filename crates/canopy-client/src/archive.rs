use std::io::{Cursor, Write};

use canopy_export::{FolderEntry, WorkflowEntry};
use serde::Serialize;
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::error::ArchiveError;

/// Format version written into the archive manifest.
pub const BUNDLE_FORMAT_VERSION: u32 = 1;

/// Turns an export bundle into binary archive bytes.
///
/// Implementations must be deterministic enough that a paired import
/// routine can reconstruct the workflow and folder hierarchy, including
/// folder nesting via `parentId`, from the produced bytes.
pub trait ArchiveAssembler: Send + Sync {
  fn assemble(
    &self,
    workspace_name: &str,
    workflows: &[WorkflowEntry],
    folders: &[FolderEntry],
  ) -> Result<Vec<u8>, ArchiveError>;
}

#[derive(Serialize)]
struct BundleManifest<'a> {
  format_version: u32,
  workspace: &'a str,
  workflow_count: usize,
  folder_count: usize,
}

/// Zip-backed assembler.
///
/// Layout:
///
/// ```text
/// MANIFEST.json          format version, workspace name, counts
/// folders.json           full folder list, nesting via parentId
/// workflows/<id>.json    one entry per workflow: workflow, state, variables
/// ```
///
/// Entry timestamps are fixed and iteration order is preserved, so the same
/// bundle always produces the same bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipAssembler;

impl ArchiveAssembler for ZipAssembler {
  fn assemble(
    &self,
    workspace_name: &str,
    workflows: &[WorkflowEntry],
    folders: &[FolderEntry],
  ) -> Result<Vec<u8>, ArchiveError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
      .compression_method(CompressionMethod::Deflated)
      .last_modified_time(zip::DateTime::default());

    let manifest = BundleManifest {
      format_version: BUNDLE_FORMAT_VERSION,
      workspace: workspace_name,
      workflow_count: workflows.len(),
      folder_count: folders.len(),
    };
    writer.start_file("MANIFEST.json", options)?;
    writer.write_all(&serde_json::to_vec_pretty(&manifest)?)?;

    writer.start_file("folders.json", options)?;
    writer.write_all(&serde_json::to_vec_pretty(folders)?)?;

    for entry in workflows {
      writer.start_file(format!("workflows/{}.json", entry.workflow.id), options)?;
      writer.write_all(&serde_json::to_vec_pretty(entry)?)?;
    }

    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
  }
}

#[cfg(test)]
mod tests {
  use std::io::Read;

  use canopy_export::{StateSnapshot, Variable, WorkflowSummary};
  use serde_json::{Map, Value, json};
  use zip::ZipArchive;

  use super::*;

  fn workflow_entry(id: &str, folder_id: Option<&str>) -> WorkflowEntry {
    WorkflowEntry {
      workflow: WorkflowSummary {
        id: id.to_string(),
        name: format!("workflow {id}"),
        description: None,
        color: "#3972F6".to_string(),
        folder_id: folder_id.map(str::to_string),
      },
      state: StateSnapshot {
        blocks: Map::new(),
        edges: Vec::new(),
        loops: Map::new(),
        parallels: Map::new(),
        last_saved: 1_700_000_000_000,
        is_deployed: false,
        deployed_at: None,
      },
      variables: vec![Variable {
        id: "v1".to_string(),
        name: "count".to_string(),
        kind: "number".to_string(),
        value: json!(3),
      }],
    }
  }

  fn read_entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> Value {
    let mut file = archive.by_name(name).expect("missing archive entry");
    let mut contents = String::new();
    file.read_to_string(&mut contents).unwrap();
    serde_json::from_str(&contents).unwrap()
  }

  #[test]
  fn archive_carries_manifest_folders_and_workflows() {
    let folders = vec![
      FolderEntry {
        id: "f1".to_string(),
        name: "root".to_string(),
        parent_id: None,
      },
      FolderEntry {
        id: "f2".to_string(),
        name: "nested".to_string(),
        parent_id: Some("f1".to_string()),
      },
    ];
    let workflows = vec![workflow_entry("w1", Some("f2"))];

    let bytes = ZipAssembler
      .assemble("My Workspace", &workflows, &folders)
      .unwrap();
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();

    let manifest = read_entry(&mut archive, "MANIFEST.json");
    assert_eq!(manifest["format_version"], json!(BUNDLE_FORMAT_VERSION));
    assert_eq!(manifest["workspace"], json!("My Workspace"));
    assert_eq!(manifest["workflow_count"], json!(1));

    let folders_doc = read_entry(&mut archive, "folders.json");
    assert_eq!(folders_doc[1]["parentId"], json!("f1"));

    let workflow_doc = read_entry(&mut archive, "workflows/w1.json");
    assert_eq!(workflow_doc["workflow"]["folderId"], json!("f2"));
    assert_eq!(workflow_doc["variables"][0]["type"], json!("number"));
  }

  #[test]
  fn same_bundle_produces_identical_bytes() {
    let workflows = vec![workflow_entry("w1", None)];
    let folders = Vec::new();

    let first = ZipAssembler.assemble("ws", &workflows, &folders).unwrap();
    let second = ZipAssembler.assemble("ws", &workflows, &folders).unwrap();
    assert_eq!(first, second);
  }
}
