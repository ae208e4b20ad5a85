//! API request and response types.

use serde::{Deserialize, Serialize};

use crate::store::Task;

/// Request to interpret and execute a free-text command.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandRequest {
    /// The natural-language command, e.g. "Mark buy milk as done"
    pub command: String,
}

/// Request to create a task directly.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    /// The task description
    pub description: String,

    /// Optional due date (YYYY-MM-DD)
    #[serde(default)]
    pub due_date: Option<String>,

    /// Optional due time (HH:MM)
    #[serde(default)]
    pub due_time: Option<String>,
}

/// Request to update a task's status or description.
///
/// Exactly one field is used per request; `status` wins when both are
/// present.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    /// New status: "pending" or "completed"
    #[serde(default)]
    pub status: Option<String>,

    /// New description for the task
    #[serde(default)]
    pub new_description: Option<String>,
}

/// Request to delete tasks by description.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteTaskRequest {
    /// Description of the task(s) to remove
    pub description: String,
}

/// Query parameters for listing tasks.
#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    /// Optional status filter: "pending" or "completed"
    pub status: Option<String>,
}

/// Tasks listing response.
#[derive(Debug, Clone, Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
}

/// Generic message response.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}
