use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;

use crate::routes::{AppState, router};

/// Bind and serve the export API until the task is dropped.
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
  let app = router(state);
  let listener = TcpListener::bind(addr).await?;

  info!(%addr, "export server listening");
  axum::serve(listener, app).await
}
