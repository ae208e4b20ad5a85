//! Free-text command interpretation.
//!
//! Translates one natural-language command into exactly one
//! [`TaskAction`] by handing the model a fixed set of five tool
//! definitions and forcing a tool call. The returned call is then
//! re-validated locally against the same schema; the external provider's
//! conformance guarantee is never trusted on its own. Any deviation --
//! no call, an unknown tool name, malformed or fabricated arguments --
//! is an [`InterpretError`].
//!
//! One attempt per command, no retries. Interpretation never touches the
//! task store.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use super::TaskAction;
use crate::llm::{ChatMessage, FunctionDefinition, LlmClient, Role, ToolDefinition};
use crate::store::TaskStatus;

/// Failure to derive a structured operation from a command.
#[derive(Debug, Error)]
pub enum InterpretError {
    #[error("Command is empty")]
    EmptyCommand,

    #[error("Language model request failed: {0}")]
    Llm(anyhow::Error),

    #[error("Model returned no tool call")]
    NoToolCall,

    #[error("Model selected unknown tool '{0}'")]
    UnknownTool(String),

    #[error("Invalid arguments for '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },
}

/// System prompt for command interpretation.
const SYSTEM_PROMPT: &str = "\
You are the command parser for a to-do list application. Translate the \
user's command into exactly one tool call.

Rules:
- createTask adds a new task. Include dueDate or dueTime ONLY when the \
command states a date or time explicitly; never guess or default them.
- completeTask marks a task as done, identified by its description.
- deleteTask removes a task, identified by its description.
- listTasks shows tasks. Set status only when the command restricts the \
listing to pending or completed tasks.
- renameTask changes a task's description.
- Use task descriptions exactly as the user worded them.
- If the command does not match any tool, do not pick one arbitrarily.";

/// Translates free-text commands into structured operations.
pub struct CommandInterpreter {
    llm: Arc<dyn LlmClient>,
    model: String,
}

impl CommandInterpreter {
    /// Create an interpreter backed by the given client and model.
    pub fn new(llm: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }

    /// Interpret one free-text command into exactly one operation.
    pub async fn interpret(&self, command: &str) -> Result<TaskAction, InterpretError> {
        let command = command.trim();
        if command.is_empty() {
            return Err(InterpretError::EmptyCommand);
        }

        let messages = vec![
            ChatMessage::new(Role::System, SYSTEM_PROMPT),
            ChatMessage::new(Role::User, format!("Command: {}", command)),
        ];
        let tools = tool_definitions();

        let response = self
            .llm
            .chat_completion(&self.model, &messages, Some(&tools))
            .await
            .map_err(InterpretError::Llm)?;

        if let Some(usage) = &response.usage {
            tracing::debug!(
                "Interpretation used {} tokens ({} prompt, {} completion)",
                usage.total_tokens,
                usage.prompt_tokens,
                usage.completion_tokens
            );
        }

        let call = response
            .tool_calls
            .into_iter()
            .flatten()
            .next()
            .ok_or(InterpretError::NoToolCall)?;

        validate_call(&call.function.name, &call.function.arguments)
    }
}

/// Re-validate a returned tool call against the operation schema.
///
/// This is the local half of the schema constraint: the provider is told
/// to conform, and this function rejects anything that does not.
fn validate_call(name: &str, arguments: &str) -> Result<TaskAction, InterpretError> {
    match name {
        "createTask" => {
            let args: CreateTaskArgs = parse_args(name, arguments)?;
            let description = non_empty(name, "description", args.description)?;
            if let Some(date) = &args.due_date {
                validate_due_date(name, date)?;
            }
            if let Some(time) = &args.due_time {
                validate_due_time(name, time)?;
            }
            Ok(TaskAction::CreateTask {
                description,
                due_date: args.due_date,
                due_time: args.due_time,
            })
        }
        "completeTask" => {
            let args: DescriptionArgs = parse_args(name, arguments)?;
            Ok(TaskAction::CompleteTask {
                description: non_empty(name, "description", args.description)?,
            })
        }
        "deleteTask" => {
            let args: DescriptionArgs = parse_args(name, arguments)?;
            Ok(TaskAction::DeleteTask {
                description: non_empty(name, "description", args.description)?,
            })
        }
        "listTasks" => {
            let args: ListTasksArgs = parse_args(name, arguments)?;
            Ok(TaskAction::ListTasks {
                status: args.status,
            })
        }
        "renameTask" => {
            let args: RenameTaskArgs = parse_args(name, arguments)?;
            Ok(TaskAction::RenameTask {
                description: non_empty(name, "description", args.description)?,
                new_description: non_empty(name, "newDescription", args.new_description)?,
            })
        }
        other => Err(InterpretError::UnknownTool(other.to_string())),
    }
}

/// Argument payload for `createTask`.
///
/// `deny_unknown_fields` keeps a drifting provider from smuggling extra
/// fields past validation.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct CreateTaskArgs {
    description: String,
    #[serde(default)]
    due_date: Option<String>,
    #[serde(default)]
    due_time: Option<String>,
}

/// Argument payload for `completeTask` and `deleteTask`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DescriptionArgs {
    description: String,
}

/// Argument payload for `listTasks`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ListTasksArgs {
    #[serde(default)]
    status: Option<TaskStatus>,
}

/// Argument payload for `renameTask`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct RenameTaskArgs {
    description: String,
    new_description: String,
}

fn parse_args<T: DeserializeOwned>(tool: &str, raw: &str) -> Result<T, InterpretError> {
    // Providers may send an empty arguments string for no-argument calls.
    let raw = if raw.trim().is_empty() { "{}" } else { raw };
    serde_json::from_str(raw).map_err(|e| InterpretError::InvalidArguments {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}

fn non_empty(tool: &str, field: &str, value: String) -> Result<String, InterpretError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(InterpretError::InvalidArguments {
            tool: tool.to_string(),
            reason: format!("'{}' must not be empty", field),
        });
    }
    Ok(trimmed.to_string())
}

fn validate_due_date(tool: &str, value: &str) -> Result<(), InterpretError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| InterpretError::InvalidArguments {
            tool: tool.to_string(),
            reason: format!("'dueDate' must be YYYY-MM-DD, got '{}'", value),
        })
}

fn validate_due_time(tool: &str, value: &str) -> Result<(), InterpretError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map(|_| ())
        .map_err(|_| InterpretError::InvalidArguments {
            tool: tool.to_string(),
            reason: format!("'dueTime' must be HH:MM, got '{}'", value),
        })
}

/// The five tool definitions sent with every interpretation request.
///
/// Field names, types, and optionality mirror [`TaskAction`] exactly;
/// each optional field's description tells the model to omit it unless
/// the command states it.
fn tool_definitions() -> Vec<ToolDefinition> {
    fn function(name: &str, description: &str, parameters: serde_json::Value) -> ToolDefinition {
        ToolDefinition {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: name.to_string(),
                description: description.to_string(),
                parameters,
            },
        }
    }

    vec![
        function(
            "createTask",
            "Add a new task to the to-do list.",
            json!({
                "type": "object",
                "properties": {
                    "description": {
                        "type": "string",
                        "description": "Task description, e.g. 'Buy milk'."
                    },
                    "dueDate": {
                        "type": "string",
                        "description": "Due date in YYYY-MM-DD format. Omit unless the command states a date explicitly."
                    },
                    "dueTime": {
                        "type": "string",
                        "description": "Due time in HH:MM format. Omit unless the command states a time explicitly."
                    }
                },
                "required": ["description"]
            }),
        ),
        function(
            "completeTask",
            "Mark an existing task as completed.",
            json!({
                "type": "object",
                "properties": {
                    "description": {
                        "type": "string",
                        "description": "Description of the task to mark as completed."
                    }
                },
                "required": ["description"]
            }),
        ),
        function(
            "deleteTask",
            "Delete a task from the list.",
            json!({
                "type": "object",
                "properties": {
                    "description": {
                        "type": "string",
                        "description": "Description of the task to delete."
                    }
                },
                "required": ["description"]
            }),
        ),
        function(
            "listTasks",
            "List the tasks on the to-do list.",
            json!({
                "type": "object",
                "properties": {
                    "status": {
                        "type": "string",
                        "enum": ["pending", "completed"],
                        "description": "Restrict the listing to one status. Omit to list all tasks."
                    }
                }
            }),
        ),
        function(
            "renameTask",
            "Rename an existing task.",
            json!({
                "type": "object",
                "properties": {
                    "description": {
                        "type": "string",
                        "description": "Current description of the task to rename."
                    },
                    "newDescription": {
                        "type": "string",
                        "description": "New description for the task."
                    }
                },
                "required": ["description", "newDescription"]
            }),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatResponse, FunctionCall, ToolCall};
    use async_trait::async_trait;

    /// Scripted client that returns a fixed tool call without any network.
    struct ScriptedLlm {
        tool_call: Option<(&'static str, &'static str)>,
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn chat_completion(
            &self,
            _model: &str,
            _messages: &[ChatMessage],
            _tools: Option<&[ToolDefinition]>,
        ) -> anyhow::Result<ChatResponse> {
            Ok(ChatResponse {
                content: None,
                tool_calls: self.tool_call.map(|(name, args)| {
                    vec![ToolCall {
                        id: "call_1".to_string(),
                        call_type: "function".to_string(),
                        function: FunctionCall {
                            name: name.to_string(),
                            arguments: args.to_string(),
                        },
                    }]
                }),
                finish_reason: Some("tool_calls".to_string()),
                usage: None,
                model: None,
            })
        }
    }

    /// Client that fails the test if it is ever called.
    struct UnreachableLlm;

    #[async_trait]
    impl LlmClient for UnreachableLlm {
        async fn chat_completion(
            &self,
            _model: &str,
            _messages: &[ChatMessage],
            _tools: Option<&[ToolDefinition]>,
        ) -> anyhow::Result<ChatResponse> {
            panic!("LLM must not be called for an empty command");
        }
    }

    fn interpreter_with(tool_call: Option<(&'static str, &'static str)>) -> CommandInterpreter {
        CommandInterpreter::new(Arc::new(ScriptedLlm { tool_call }), "test-model")
    }

    #[tokio::test]
    async fn test_interpret_create_task_with_due_fields() {
        let interpreter = interpreter_with(Some((
            "createTask",
            r#"{"description": "Dentist", "dueDate": "2026-09-01", "dueTime": "14:30"}"#,
        )));

        let action = interpreter.interpret("Dentist on Sep 1 at 2:30pm").await.unwrap();
        assert_eq!(
            action,
            TaskAction::CreateTask {
                description: "Dentist".to_string(),
                due_date: Some("2026-09-01".to_string()),
                due_time: Some("14:30".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_interpret_create_task_without_date_leaves_fields_unset() {
        let interpreter = interpreter_with(Some(("createTask", r#"{"description": "Buy milk"}"#)));

        let action = interpreter.interpret("Buy milk").await.unwrap();
        assert_eq!(
            action,
            TaskAction::CreateTask {
                description: "Buy milk".to_string(),
                due_date: None,
                due_time: None,
            }
        );
    }

    #[tokio::test]
    async fn test_empty_command_never_calls_the_llm() {
        let interpreter = CommandInterpreter::new(Arc::new(UnreachableLlm), "test-model");
        let err = interpreter.interpret("   ").await.unwrap_err();
        assert!(matches!(err, InterpretError::EmptyCommand));
    }

    #[tokio::test]
    async fn test_missing_tool_call_is_an_error() {
        let interpreter = interpreter_with(None);
        let err = interpreter.interpret("Buy milk").await.unwrap_err();
        assert!(matches!(err, InterpretError::NoToolCall));
    }

    #[test]
    fn test_unknown_tool_rejected() {
        let err = validate_call("archiveTask", r#"{"description": "x"}"#).unwrap_err();
        assert!(matches!(err, InterpretError::UnknownTool(name) if name == "archiveTask"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = validate_call(
            "completeTask",
            r#"{"description": "Buy milk", "priority": "high"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, InterpretError::InvalidArguments { .. }));
    }

    #[test]
    fn test_fabricated_due_date_format_rejected() {
        let err = validate_call(
            "createTask",
            r#"{"description": "Buy milk", "dueDate": "tomorrow"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, InterpretError::InvalidArguments { .. }));
    }

    #[test]
    fn test_fabricated_due_time_format_rejected() {
        let err = validate_call(
            "createTask",
            r#"{"description": "Buy milk", "dueTime": "5pm"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, InterpretError::InvalidArguments { .. }));
    }

    #[test]
    fn test_blank_description_rejected() {
        let err = validate_call("deleteTask", r#"{"description": "   "}"#).unwrap_err();
        assert!(matches!(err, InterpretError::InvalidArguments { .. }));
    }

    #[test]
    fn test_list_tasks_with_status_filter() {
        let action = validate_call("listTasks", r#"{"status": "completed"}"#).unwrap();
        assert_eq!(
            action,
            TaskAction::ListTasks {
                status: Some(TaskStatus::Completed)
            }
        );
    }

    #[test]
    fn test_list_tasks_with_empty_arguments() {
        let action = validate_call("listTasks", "").unwrap();
        assert_eq!(action, TaskAction::ListTasks { status: None });
    }

    #[test]
    fn test_list_tasks_with_invalid_status_rejected() {
        let err = validate_call("listTasks", r#"{"status": "done"}"#).unwrap_err();
        assert!(matches!(err, InterpretError::InvalidArguments { .. }));
    }

    #[test]
    fn test_rename_requires_new_description() {
        let err = validate_call("renameTask", r#"{"description": "Buy milk"}"#).unwrap_err();
        assert!(matches!(err, InterpretError::InvalidArguments { .. }));
    }

    #[test]
    fn test_malformed_argument_json_rejected() {
        let err = validate_call("createTask", "not json").unwrap_err();
        assert!(matches!(err, InterpretError::InvalidArguments { .. }));
    }

    #[test]
    fn test_tool_definitions_cover_all_operations() {
        let names: Vec<String> = tool_definitions()
            .into_iter()
            .map(|t| t.function.name)
            .collect();
        assert_eq!(
            names,
            vec![
                "createTask",
                "completeTask",
                "deleteTask",
                "listTasks",
                "renameTask"
            ]
        );
    }
}
