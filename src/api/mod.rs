//! HTTP API for taskpilot.
//!
//! ## Endpoints
//!
//! - `POST /api/command` - Interpret a free-text command and execute it
//! - `GET /api/tasks` - List tasks, optionally filtered by `?status=`
//! - `POST /api/tasks` - Create a task directly
//! - `PUT /api/tasks/{id}` - Update a task's status or rename it
//! - `DELETE /api/tasks` - Delete all tasks matching a description
//! - `GET /api/health` - Health check

mod routes;
pub mod types;

pub use routes::{serve, AppState};
pub use types::*;
