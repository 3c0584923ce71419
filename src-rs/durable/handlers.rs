use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::error;

use crate::error::DispatchError;

use super::runtime::Durable;

#[derive(Debug, Deserialize)]
pub struct InvokeRequest {
    pub id: Option<String>,
    pub func: String,
    #[serde(default)]
    pub args: Value,
}

#[derive(Debug, Deserialize, Default)]
pub struct PromisesQuery {
    pub limit: Option<usize>,
}

pub async fn handle_health() -> Json<Value> {
    Json(json!({"status": "ok", "version": env!("CARGO_PKG_VERSION")}))
}

pub async fn handle_invoke(State(durable): State<Durable>, Json(req): Json<InvokeRequest>) -> Response {
    if req.func.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "func required");
    }

    // run detached so a dropped connection does not abandon the promise
    let result = tokio::spawn(async move { durable.invoke(req.id, &req.func, req.args).await }).await;

    match result {
        Ok(Ok(promise)) => Json(promise).into_response(),
        Ok(Err(err @ DispatchError::FunctionNotFound(_))) => error_response(StatusCode::NOT_FOUND, &err.to_string()),
        Ok(Err(err)) => error_response(StatusCode::BAD_REQUEST, &err.to_string()),
        Err(err) => {
            error!(error = %err, "invocation task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
        }
    }
}

pub async fn handle_promise(State(durable): State<Durable>, Path(id): Path<String>) -> Response {
    match durable.promise(&id) {
        Some(promise) => Json(promise).into_response(),
        None => error_response(StatusCode::NOT_FOUND, &format!("promise not found: {}", id)),
    }
}

pub async fn handle_promises(State(durable): State<Durable>, Query(query): Query<PromisesQuery>) -> Json<Value> {
    let limit = query.limit.unwrap_or(10);
    Json(json!({"promises": durable.promises(limit)}))
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"error": message}))).into_response()
}
