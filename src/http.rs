use std::io;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio::task::JoinError;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::{Error, ErrorKind};
use crate::executor::{CommandResult, OutputSink};
use crate::tools::{
    files, process, system, Environment, ExecutableCommand, FileInfo, ListFilesQuery,
};

/// Capabilities shared by every request
#[derive(Clone)]
pub struct AppState {
    pub sink: Arc<dyn OutputSink>,
    pub env: Arc<dyn Environment>,
}

impl AppState {
    pub fn new(sink: Arc<dyn OutputSink>, env: Arc<dyn Environment>) -> Self {
        Self { sink, env }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/file/list", get(list_files))
        .route("/process/execute", post(execute_command))
        .route("/system/hostname", get(hostname))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Error body for the file and system routes
struct ApiError(Error);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.kind() {
            ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
            ErrorKind::Io if self.0.is_not_found() => StatusCode::NOT_FOUND,
            ErrorKind::Io | ErrorKind::Interrupted => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::warn!(status = status.as_u16(), "{}", self.0);
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// Error body for the process route: a synthetic result with exit code -1
struct ProcessFailure(Error);

impl IntoResponse for ProcessFailure {
    fn into_response(self) -> Response {
        let status = match self.0.kind() {
            ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
            ErrorKind::Io | ErrorKind::Interrupted => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::error!(status = %status, "error executing command: {}", self.0);
        (status, Json(CommandResult::failure(self.0.to_string()))).into_response()
    }
}

async fn list_files(Query(query): Query<ListFilesQuery>) -> Result<Json<Vec<FileInfo>>, ApiError> {
    tokio::task::spawn_blocking(move || files::list_files(query))
        .await
        .map_err(|e| ApiError(unfinished("directory listing", e)))?
        .map(Json)
        .map_err(ApiError)
}

fn unfinished(what: &str, e: JoinError) -> Error {
    Error::io(format!("{} did not complete", what), io::Error::other(e))
}

async fn execute_command(
    State(state): State<AppState>,
    body: Result<Json<Option<ExecutableCommand>>, JsonRejection>,
) -> Result<Json<CommandResult>, ProcessFailure> {
    let req = match body {
        Ok(Json(Some(req))) => req,
        Ok(Json(None)) => return Err(ProcessFailure(Error::invalid("request body is null"))),
        Err(rejection) => return Err(ProcessFailure(Error::invalid(rejection.body_text()))),
    };
    let command = req.command.clone().unwrap_or_default();

    tokio::task::spawn_blocking(move || process::execute(req, state.sink.as_ref()))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "command task did not complete");
            ProcessFailure(Error::Interrupted(command))
        })?
        .map(Json)
        .map_err(ProcessFailure)
}

async fn hostname(State(state): State<AppState>) -> String {
    let name = system::hostname(state.env.as_ref()).unwrap_or_default();
    tracing::info!(hostname = %name, "reporting host name");
    name
}
