//! In-memory task store.
//!
//! A single `TaskStore` owns the authoritative task list for the process.
//! All access goes through one `RwLock`, so a push can never interleave
//! with a filter-rewrite. Nothing is persisted: the list lives and dies
//! with the process.
//!
//! # Invariants
//! - Task ids are assigned from a monotonic counter and never reused.
//! - Tasks are kept in insertion order; `list` returns them in that order.
//! - Description matching is case-insensitive full-string equality.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Unique identifier for a task.
///
/// # Properties
/// - Monotonically increasing within the process lifetime
/// - Immutable once assigned, never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(u64);

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a task.
///
/// A task is created `Pending`; status only ever toggles between the two
/// variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Completed,
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "completed" => Ok(TaskStatus::Completed),
            other => Err(format!("invalid status '{}'", other)),
        }
    }
}

/// A single to-do item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_time: Option<String>,
}

/// The authoritative in-memory task list.
pub struct TaskStore {
    tasks: RwLock<Vec<Task>>,
    next_id: AtomicU64,
}

impl TaskStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn allocate_id(&self) -> TaskId {
        TaskId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Append a new pending task and return it.
    ///
    /// Repeated calls with the same description always append a new task;
    /// there is no implicit dedup.
    pub async fn create(
        &self,
        description: String,
        due_date: Option<String>,
        due_time: Option<String>,
    ) -> Task {
        let task = Task {
            id: self.allocate_id(),
            description,
            status: TaskStatus::Pending,
            due_date,
            due_time,
        };
        self.tasks.write().await.push(task.clone());
        task
    }

    /// List tasks in insertion order, optionally filtered by status.
    pub async fn list(&self, status: Option<TaskStatus>) -> Vec<Task> {
        let tasks = self.tasks.read().await;
        match status {
            Some(wanted) => tasks
                .iter()
                .filter(|t| t.status == wanted)
                .cloned()
                .collect(),
            None => tasks.clone(),
        }
    }

    /// Mark the first pending task with a matching description as completed.
    ///
    /// A task that is already completed does not match, even if its
    /// description does.
    pub async fn complete(&self, description: &str) -> Option<Task> {
        let needle = description.to_lowercase();
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .iter_mut()
            .find(|t| t.status == TaskStatus::Pending && t.description.to_lowercase() == needle)?;
        task.status = TaskStatus::Completed;
        Some(task.clone())
    }

    /// Set the status of a task by id.
    pub async fn update_status(&self, id: TaskId, status: TaskStatus) -> Option<Task> {
        let mut tasks = self.tasks.write().await;
        let task = tasks.iter_mut().find(|t| t.id == id)?;
        task.status = status;
        Some(task.clone())
    }

    /// Change the description of a task by id. Identity and status are
    /// unchanged.
    pub async fn rename(&self, id: TaskId, new_description: String) -> Option<Task> {
        let mut tasks = self.tasks.write().await;
        let task = tasks.iter_mut().find(|t| t.id == id)?;
        task.description = new_description;
        Some(task.clone())
    }

    /// Change the description of the first task matching `description`
    /// case-insensitively. Identity and status are unchanged.
    pub async fn rename_by_description(
        &self,
        description: &str,
        new_description: String,
    ) -> Option<Task> {
        let needle = description.to_lowercase();
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .iter_mut()
            .find(|t| t.description.to_lowercase() == needle)?;
        task.description = new_description;
        Some(task.clone())
    }

    /// Remove every task whose description matches case-insensitively.
    ///
    /// Unlike `complete` and `rename_by_description` this affects all
    /// matches, not just the first. Returns the number of tasks removed.
    pub async fn delete_by_description(&self, description: &str) -> usize {
        let needle = description.to_lowercase();
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|t| t.description.to_lowercase() != needle);
        before - tasks.len()
    }
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}
