//! Uniform result envelope for executed operations.

use serde::Serialize;

use crate::store::Task;

/// Outcome of an executed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Failed,
}

/// Payload attached to an envelope: a single task or a task listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EnvelopeData {
    Task(Task),
    Tasks(Vec<Task>),
}

/// The uniform response shape returned after executing an operation.
///
/// Constructed once per operation and never mutated afterwards. Failed
/// envelopes always carry a human-readable `message` naming the cause.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultEnvelope {
    pub action: &'static str,
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<EnvelopeData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ResultEnvelope {
    /// Create a success envelope for the named action.
    pub fn success(action: &'static str) -> Self {
        Self {
            action,
            status: OutcomeStatus::Success,
            data: None,
            message: None,
        }
    }

    /// Create a failed envelope with a message.
    pub fn failed(action: &'static str, message: impl Into<String>) -> Self {
        Self {
            action,
            status: OutcomeStatus::Failed,
            data: None,
            message: Some(message.into()),
        }
    }

    /// Envelope for a command whose intent could not be determined.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::failed("unknown", message)
    }

    /// Attach a single task payload.
    pub fn with_task(mut self, task: Task) -> Self {
        self.data = Some(EnvelopeData::Task(task));
        self
    }

    /// Attach a task listing payload.
    pub fn with_tasks(mut self, tasks: Vec<Task>) -> Self {
        self.data = Some(EnvelopeData::Tasks(tasks));
        self
    }

    /// Attach a message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Whether the operation succeeded.
    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_omits_absent_fields() {
        let envelope = ResultEnvelope::success("listTasks").with_tasks(Vec::new());
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["action"], "listTasks");
        assert_eq!(value["status"], "success");
        assert!(value["data"].is_array());
        assert!(value.get("message").is_none());
    }

    #[test]
    fn test_failed_envelope_carries_message() {
        let envelope = ResultEnvelope::failed("completeTask", "Task not found");
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["status"], "failed");
        assert_eq!(value["message"], "Task not found");
        assert!(value.get("data").is_none());
    }

    #[test]
    fn test_unknown_envelope_shape() {
        let envelope = ResultEnvelope::unknown("Could not determine intent");
        assert_eq!(envelope.action, "unknown");
        assert!(!envelope.is_success());
    }
}
