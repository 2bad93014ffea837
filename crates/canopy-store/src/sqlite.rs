use std::collections::HashMap;

use serde_json::Value;
use sqlx::types::Json;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use crate::{Error, FolderRow, NormalizedState, Permission, Session, Store, WorkflowRow};

/// SQLite-based store implementation.
pub struct SqliteStore {
  pool: SqlitePool,
}

impl SqliteStore {
  /// Create a new SQLite store with the given connection pool.
  pub fn new(pool: SqlitePool) -> Self {
    Self { pool }
  }

  /// Run database migrations.
  pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(&self.pool).await
  }
}

/// Row shape shared by the blocks and edges tables.
#[derive(FromRow)]
struct StateRow {
  workflow_id: String,
  id: String,
  data: Json<Value>,
}

#[derive(FromRow)]
struct SubflowRow {
  workflow_id: String,
  id: String,
  kind: String,
  data: Json<Value>,
}

/// Fetch all rows of a normalized table for the given workflow ids with a
/// single `IN` query.
async fn fetch_in<R>(
  pool: &SqlitePool,
  select: &str,
  workflow_ids: &[String],
) -> Result<Vec<R>, sqlx::Error>
where
  R: for<'r> FromRow<'r, sqlx::sqlite::SqliteRow> + Send + Unpin,
{
  let mut builder = QueryBuilder::<Sqlite>::new(select);
  builder.push(" WHERE workflow_id IN (");
  let mut ids = builder.separated(", ");
  for id in workflow_ids {
    ids.push_bind(id);
  }
  builder.push(") ORDER BY workflow_id, id");

  builder.build_query_as::<R>().fetch_all(pool).await
}

#[async_trait::async_trait]
impl Store for SqliteStore {
  async fn get_session(&self, token: &str) -> Result<Option<Session>, Error> {
    let session = sqlx::query_as(
      r#"
            SELECT token, user_id, expires_at
            FROM sessions
            WHERE token = ?
            "#,
    )
    .bind(token)
    .fetch_optional(&self.pool)
    .await?;

    Ok(session)
  }

  async fn get_workspace_permission(
    &self,
    user_id: &str,
    workspace_id: &str,
  ) -> Result<Option<Permission>, Error> {
    let permission = sqlx::query_as(
      r#"
            SELECT user_id, workspace_id, permission_type
            FROM workspace_permissions
            WHERE user_id = ? AND workspace_id = ?
            "#,
    )
    .bind(user_id)
    .bind(workspace_id)
    .fetch_optional(&self.pool)
    .await?;

    Ok(permission)
  }

  async fn list_workflows(&self, workspace_id: &str) -> Result<Vec<WorkflowRow>, Error> {
    let workflows = sqlx::query_as(
            r#"
            SELECT id, workspace_id, name, description, color, folder_id, is_deployed, deployed_at, variables
            FROM workflows
            WHERE workspace_id = ?
            ORDER BY id
            "#,
        )
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await?;

    Ok(workflows)
  }

  async fn list_folders(&self, workspace_id: &str) -> Result<Vec<FolderRow>, Error> {
    let folders = sqlx::query_as(
      r#"
            SELECT id, workspace_id, name, parent_id
            FROM workflow_folders
            WHERE workspace_id = ?
            ORDER BY id
            "#,
    )
    .bind(workspace_id)
    .fetch_all(&self.pool)
    .await?;

    Ok(folders)
  }

  async fn load_normalized_states(
    &self,
    workflow_ids: &[String],
  ) -> Result<HashMap<String, NormalizedState>, Error> {
    let mut states: HashMap<String, NormalizedState> = HashMap::new();
    if workflow_ids.is_empty() {
      return Ok(states);
    }

    // Three queries total, independent of the number of workflows.
    let blocks: Vec<StateRow> = fetch_in(
      &self.pool,
      "SELECT workflow_id, id, data FROM workflow_blocks",
      workflow_ids,
    )
    .await?;
    let edges: Vec<StateRow> = fetch_in(
      &self.pool,
      "SELECT workflow_id, id, data FROM workflow_edges",
      workflow_ids,
    )
    .await?;
    let subflows: Vec<SubflowRow> = fetch_in(
      &self.pool,
      "SELECT workflow_id, id, kind, data FROM workflow_subflows",
      workflow_ids,
    )
    .await?;

    for row in blocks {
      let state = states.entry(row.workflow_id).or_default();
      state.blocks.insert(row.id, row.data.0);
    }
    for row in edges {
      let state = states.entry(row.workflow_id).or_default();
      state.edges.push(row.data.0);
    }
    for row in subflows {
      let state = states.entry(row.workflow_id).or_default();
      match row.kind.as_str() {
        "loop" => {
          state.loops.insert(row.id, row.data.0);
        }
        "parallel" => {
          state.parallels.insert(row.id, row.data.0);
        }
        _ => {}
      }
    }

    Ok(states)
  }
}
