//! # Companion Server
//!
//! Exposes a `Workspace` over local HTTP so `raze` can delegate file operations to it.

use anyhow::Result;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use super::workspace::{Workspace, WorkspaceError};

pub struct ServerState {
    workspace: Workspace,
    started_at: String,
}

pub type SharedState = Arc<ServerState>;

#[derive(Debug, Deserialize)]
pub struct PathQuery {
    #[serde(default = "default_path")]
    pub path: String,
}

fn default_path() -> String {
    ".".to_string()
}

#[derive(Debug, Deserialize)]
pub struct WriteRequest {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    pub command: String,
    #[serde(default)]
    pub cwd: Option<String>,
}

impl IntoResponse for WorkspaceError {
    fn into_response(self) -> Response {
        let status = match &self {
            WorkspaceError::OutsideRoot(_) => StatusCode::FORBIDDEN,
            WorkspaceError::NotFound(_) => StatusCode::NOT_FOUND,
            WorkspaceError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            WorkspaceError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => {
                StatusCode::NOT_FOUND
            }
            WorkspaceError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

// --- Handler Functions ---

async fn health_check(State(state): State<SharedState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "raze-mcp",
        "version": env!("CARGO_PKG_VERSION"),
        "root": state.workspace.root().display().to_string(),
        "started_at": state.started_at,
    }))
}

async fn read_file(
    State(state): State<SharedState>,
    Query(query): Query<PathQuery>,
) -> Result<impl IntoResponse, WorkspaceError> {
    let content = state.workspace.read_file(&query.path).await?;
    tracing::info!("read {} ({} bytes)", query.path, content.len());
    Ok(Json(json!({ "path": query.path, "content": content })))
}

async fn write_file(
    State(state): State<SharedState>,
    Json(request): Json<WriteRequest>,
) -> Result<impl IntoResponse, WorkspaceError> {
    let bytes = state
        .workspace
        .write_file(&request.path, &request.content)
        .await
        .inspect_err(|e| tracing::warn!("write {} failed: {}", request.path, e))?;
    tracing::info!("wrote {} ({} bytes)", request.path, bytes);
    Ok(Json(json!({ "ok": true, "path": request.path, "bytes": bytes })))
}

async fn list_directory(
    State(state): State<SharedState>,
    Query(query): Query<PathQuery>,
) -> Result<impl IntoResponse, WorkspaceError> {
    let entries = state.workspace.list_dir(&query.path).await?;
    Ok(Json(json!({ "path": query.path, "entries": entries })))
}

async fn execute_command(
    State(state): State<SharedState>,
    Json(request): Json<ExecuteRequest>,
) -> Result<impl IntoResponse, WorkspaceError> {
    tracing::info!("exec `{}` in {:?}", request.command, request.cwd);
    let output = state
        .workspace
        .execute_command(&request.command, request.cwd.as_deref())
        .await?;
    Ok(Json(output))
}

/// Build the companion router
pub fn build_router(workspace: Workspace) -> Router {
    let state = Arc::new(ServerState {
        workspace,
        started_at: chrono::Local::now().to_rfc3339(),
    });

    Router::new()
        .route("/health", get(health_check))
        .route("/read_file", get(read_file))
        .route("/write_file", post(write_file))
        .route("/list_directory", get(list_directory))
        .route("/execute_command", post(execute_command))
        .with_state(state)
}

/// Start the companion server on localhost
pub async fn start_server(workspace: Workspace, port: u16) -> Result<()> {
    let root = workspace.root().display().to_string();
    let app = build_router(workspace);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("raze-mcp listening on http://127.0.0.1:{} (root: {})", port, root);

    axum::serve(listener, app).await?;
    Ok(())
}
