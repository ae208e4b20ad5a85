//! Structured operation execution against the task store.

use std::sync::Arc;

use super::{ResultEnvelope, TaskAction};
use crate::store::TaskStore;

/// Resolves structured operations against the task store and reports
/// each outcome as a [`ResultEnvelope`].
///
/// Create and list always succeed. Complete and rename act on the first
/// case-insensitive description match; delete removes every match. The
/// first-match/all-matches split is part of the observable contract.
pub struct CommandExecutor {
    store: Arc<TaskStore>,
}

impl CommandExecutor {
    /// Create an executor over the given store.
    pub fn new(store: Arc<TaskStore>) -> Self {
        Self { store }
    }

    /// Execute one operation and report its outcome.
    pub async fn execute(&self, action: TaskAction) -> ResultEnvelope {
        match action {
            TaskAction::CreateTask {
                description,
                due_date,
                due_time,
            } => {
                let task = self.store.create(description, due_date, due_time).await;
                tracing::info!("Created task {} '{}'", task.id, task.description);
                ResultEnvelope::success("createTask").with_task(task)
            }

            TaskAction::CompleteTask { description } => {
                match self.store.complete(&description).await {
                    Some(task) => {
                        tracing::info!("Completed task {}", task.id);
                        ResultEnvelope::success("completeTask").with_task(task)
                    }
                    None => ResultEnvelope::failed(
                        "completeTask",
                        format!(
                            "No pending task named '{}' was found; it may not exist or may already be completed.",
                            description
                        ),
                    ),
                }
            }

            TaskAction::DeleteTask { description } => {
                let removed = self.store.delete_by_description(&description).await;
                if removed > 0 {
                    tracing::info!("Deleted {} task(s) named '{}'", removed, description);
                    ResultEnvelope::success("deleteTask")
                        .with_message(format!("Deleted {} task(s) named '{}'.", removed, description))
                } else {
                    ResultEnvelope::failed(
                        "deleteTask",
                        format!("No task named '{}' was found.", description),
                    )
                }
            }

            TaskAction::ListTasks { status } => {
                let tasks = self.store.list(status).await;
                ResultEnvelope::success("listTasks").with_tasks(tasks)
            }

            TaskAction::RenameTask {
                description,
                new_description,
            } => {
                match self
                    .store
                    .rename_by_description(&description, new_description)
                    .await
                {
                    Some(task) => {
                        tracing::info!("Renamed task {} to '{}'", task.id, task.description);
                        ResultEnvelope::success("renameTask")
                            .with_task(task)
                            .with_message("Task renamed.")
                    }
                    None => ResultEnvelope::failed(
                        "renameTask",
                        format!("No task named '{}' was found to rename.", description),
                    ),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::EnvelopeData;
    use crate::store::TaskStatus;

    fn executor() -> (Arc<TaskStore>, CommandExecutor) {
        let store = Arc::new(TaskStore::new());
        let executor = CommandExecutor::new(Arc::clone(&store));
        (store, executor)
    }

    fn create(description: &str) -> TaskAction {
        TaskAction::CreateTask {
            description: description.to_string(),
            due_date: None,
            due_time: None,
        }
    }

    #[tokio::test]
    async fn test_create_envelope_shape() {
        let (_, executor) = executor();

        let envelope = executor.execute(create("Buy milk")).await;
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["action"], "createTask");
        assert_eq!(value["status"], "success");
        assert_eq!(value["data"]["description"], "Buy milk");
        assert_eq!(value["data"]["status"], "pending");
        assert!(value["data"]["id"].is_u64());
        assert!(value.get("message").is_none());
    }

    #[tokio::test]
    async fn test_complete_unknown_task_fails() {
        let (_, executor) = executor();

        let envelope = executor
            .execute(TaskAction::CompleteTask {
                description: "buy milk".to_string(),
            })
            .await;

        assert!(!envelope.is_success());
        assert_eq!(envelope.action, "completeTask");
        assert!(envelope.message.unwrap().contains("buy milk"));
    }

    #[tokio::test]
    async fn test_complete_already_completed_task_fails() {
        let (store, executor) = executor();
        store.create("Buy milk".to_string(), None, None).await;
        store.complete("Buy milk").await;

        let envelope = executor
            .execute(TaskAction::CompleteTask {
                description: "Buy milk".to_string(),
            })
            .await;

        assert!(!envelope.is_success());
    }

    #[tokio::test]
    async fn test_delete_removes_every_match() {
        let (store, executor) = executor();
        executor.execute(create("Call mom")).await;
        executor.execute(create("Call mom")).await;

        let envelope = executor
            .execute(TaskAction::DeleteTask {
                description: "Call mom".to_string(),
            })
            .await;

        assert!(envelope.is_success());
        assert!(envelope.message.unwrap().contains("2"));
        assert!(store.list(None).await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_unknown_task_fails_with_message() {
        let (_, executor) = executor();

        let envelope = executor
            .execute(TaskAction::DeleteTask {
                description: "Call mom".to_string(),
            })
            .await;

        assert!(!envelope.is_success());
        assert!(envelope.message.is_some());
    }

    #[tokio::test]
    async fn test_list_filters_completed_tasks() {
        let (store, executor) = executor();
        executor.execute(create("a")).await;
        executor.execute(create("b")).await;
        executor.execute(create("c")).await;
        store.complete("b").await;

        let envelope = executor
            .execute(TaskAction::ListTasks {
                status: Some(TaskStatus::Completed),
            })
            .await;

        assert!(envelope.is_success());
        match envelope.data {
            Some(EnvelopeData::Tasks(tasks)) => {
                assert_eq!(tasks.len(), 1);
                assert_eq!(tasks[0].description, "b");
            }
            other => panic!("expected task listing, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_never_mutates() {
        let (store, executor) = executor();
        executor.execute(create("a")).await;

        let before = store.list(None).await;
        executor
            .execute(TaskAction::ListTasks { status: None })
            .await;
        assert_eq!(store.list(None).await, before);
    }

    #[tokio::test]
    async fn test_rename_first_match_keeps_id_and_status() {
        let (store, executor) = executor();
        let created = match executor.execute(create("Buy milk")).await.data {
            Some(EnvelopeData::Task(task)) => task,
            other => panic!("expected task, got {:?}", other),
        };

        let envelope = executor
            .execute(TaskAction::RenameTask {
                description: "buy milk".to_string(),
                new_description: "Buy oat milk".to_string(),
            })
            .await;

        assert!(envelope.is_success());
        match envelope.data {
            Some(EnvelopeData::Task(task)) => {
                assert_eq!(task.id, created.id);
                assert_eq!(task.status, TaskStatus::Pending);
                assert_eq!(task.description, "Buy oat milk");
            }
            other => panic!("expected task, got {:?}", other),
        }
        assert_eq!(store.list(None).await.len(), 1);
    }

    #[tokio::test]
    async fn test_rename_unknown_task_fails() {
        let (_, executor) = executor();

        let envelope = executor
            .execute(TaskAction::RenameTask {
                description: "Buy milk".to_string(),
                new_description: "Buy oat milk".to_string(),
            })
            .await;

        assert!(!envelope.is_success());
        assert!(envelope.message.unwrap().contains("Buy milk"));
    }

    #[tokio::test]
    async fn test_identical_descriptions_get_distinct_ids() {
        let (_, executor) = executor();

        let first = executor.execute(create("Call mom")).await;
        let second = executor.execute(create("Call mom")).await;

        let (first, second) = match (first.data, second.data) {
            (Some(EnvelopeData::Task(a)), Some(EnvelopeData::Task(b))) => (a, b),
            other => panic!("expected two tasks, got {:?}", other),
        };
        assert_ne!(first.id, second.id);
    }
}
