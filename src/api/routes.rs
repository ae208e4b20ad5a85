//! HTTP route handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::command::{CommandExecutor, CommandInterpreter, ResultEnvelope};
use crate::config::Config;
use crate::llm::OpenRouterClient;
use crate::store::{Task, TaskId, TaskStatus, TaskStore};

use super::types::*;

/// Shared application state.
pub struct AppState {
    pub store: Arc<TaskStore>,
    pub interpreter: CommandInterpreter,
    pub executor: CommandExecutor,
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let store = Arc::new(TaskStore::new());
    let llm = Arc::new(OpenRouterClient::new(
        config.api_key.clone(),
        Duration::from_secs(config.llm_timeout_secs),
    ));
    let interpreter = CommandInterpreter::new(llm, config.command_model.clone());
    let executor = CommandExecutor::new(Arc::clone(&store));

    let state = Arc::new(AppState {
        store,
        interpreter,
        executor,
    });

    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/command", post(run_command))
        .route("/api/tasks", get(list_tasks))
        .route("/api/tasks", post(create_task))
        .route("/api/tasks", delete(delete_task))
        .route("/api/tasks/:id", put(update_task))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::clone(&state));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Health check endpoint.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Interpret a free-text command and execute the resulting operation.
///
/// The HTTP status mirrors the envelope: 200 on success, 404 when the
/// named task could not be resolved, 400 when the intent could not be
/// determined.
async fn run_command(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CommandRequest>,
) -> (StatusCode, Json<ResultEnvelope>) {
    let action = match state.interpreter.interpret(&req.command).await {
        Ok(action) => action,
        Err(e) => {
            tracing::warn!("Could not interpret command: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(ResultEnvelope::unknown(
                    "Could not determine the intent of the command.",
                )),
            );
        }
    };

    tracing::debug!("Interpreted command as {}", action.name());

    let envelope = state.executor.execute(action).await;
    let status = if envelope.is_success() {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };
    (status, Json(envelope))
}

/// List tasks, optionally filtered by status.
async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListTasksQuery>,
) -> Result<Json<TaskListResponse>, (StatusCode, String)> {
    let status = match params.status.as_deref() {
        None => None,
        Some(raw) => Some(parse_status(raw)?),
    };

    Ok(Json(TaskListResponse {
        tasks: state.store.list(status).await,
    }))
}

/// Create a task directly.
async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>), (StatusCode, String)> {
    if req.description.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Description is required".to_string(),
        ));
    }

    let task = state
        .store
        .create(req.description, req.due_date, req.due_time)
        .await;
    Ok((StatusCode::CREATED, Json(task)))
}

/// Update a task's status or rename it.
async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TaskId>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<Task>, (StatusCode, String)> {
    if let Some(raw) = req.status {
        let status = parse_status(&raw)?;
        return state
            .store
            .update_status(id, status)
            .await
            .map(Json)
            .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Task {} not found", id)));
    }

    if let Some(new_description) = req.new_description {
        if new_description.trim().is_empty() {
            return Err((
                StatusCode::BAD_REQUEST,
                "newDescription must not be empty".to_string(),
            ));
        }
        return state
            .store
            .rename(id, new_description)
            .await
            .map(Json)
            .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Task {} not found", id)));
    }

    Err((
        StatusCode::BAD_REQUEST,
        "No update field provided".to_string(),
    ))
}

/// Delete all tasks matching a description.
async fn delete_task(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeleteTaskRequest>,
) -> Result<Json<MessageResponse>, (StatusCode, String)> {
    if req.description.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Description is required".to_string(),
        ));
    }

    let removed = state.store.delete_by_description(&req.description).await;
    if removed > 0 {
        Ok(Json(MessageResponse {
            message: "Task deleted successfully".to_string(),
        }))
    } else {
        Err((StatusCode::NOT_FOUND, "Task not found".to_string()))
    }
}

fn parse_status(raw: &str) -> Result<TaskStatus, (StatusCode, String)> {
    raw.parse::<TaskStatus>()
        .map_err(|_| (StatusCode::BAD_REQUEST, format!("Invalid status '{}'", raw)))
}
