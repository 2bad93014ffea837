use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use canopy_client::{ExportOrchestrator, ExportOutcome, ZipAssembler};
use canopy_server::AppState;
use canopy_store::SqliteStore;

/// Canopy - workspace export service and client
#[derive(Parser)]
#[command(name = "canopy")]
#[command(version, about, long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Run the workspace export server
  Serve {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8080")]
    addr: SocketAddr,

    /// SQLite database URL
    #[arg(long, default_value = "sqlite://canopy.db?mode=rwc")]
    database_url: String,
  },

  /// Export a workspace from a running server into a zip archive
  Export {
    /// Base URL of the export server
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    server: String,

    /// Bearer token of the session
    #[arg(long)]
    token: Option<String>,

    /// Workspace id to export
    #[arg(long)]
    workspace: String,

    /// Workspace name, used for the archive file name
    #[arg(long)]
    name: String,

    /// Directory the archive is written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
  },
}

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let cli = Cli::parse();

  match cli.command {
    Commands::Serve { addr, database_url } => {
      let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .connect(&database_url)
        .await
        .context("failed to open database")?;
      let store = SqliteStore::new(pool);
      store.migrate().await.context("failed to run migrations")?;

      canopy_server::serve(addr, AppState::new(Arc::new(store)))
        .await
        .context("export server failed")?;
    }

    Commands::Export {
      server,
      token,
      workspace,
      name,
      out_dir,
    } => {
      let orchestrator = ExportOrchestrator::new(server, token, out_dir, ZipAssembler);

      match orchestrator.export(&workspace, &name).await? {
        ExportOutcome::Completed(archive) => {
          println!(
            "exported {} workflows and {} folders to {}",
            archive.workflows,
            archive.folders,
            archive.path.display()
          );
        }
        ExportOutcome::AlreadyInFlight => {
          println!("an export is already running");
        }
      }
    }
  }

  Ok(())
}
