//! Canopy Server
//!
//! HTTP surface for workspace export. One route is exposed:
//!
//! `GET /workspaces/{workspace_id}/export`
//!
//! The handler checks access before touching any workspace data, then
//! aggregates workflows, folders and normalized run state into the export
//! bundle. Failures are shaped into the fixed response bodies; internal
//! detail only ever reaches the request-scoped log span.
//!
//! Requests are handled statelessly; the only shared state is the
//! [`canopy_store::Store`] handle.

mod auth;
mod error;
mod routes;
mod server;

pub use auth::{authenticate, check_access};
pub use error::ApiError;
pub use routes::{AppState, router};
pub use server::serve;
