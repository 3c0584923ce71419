use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Failures while turning an environment snapshot into an execution context.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(&'static str),
    #[error("Invalid value for environment variable {name}: {value:?}")]
    InvalidEnv { name: &'static str, value: String },
    #[error("failed to construct AI client: {0}")]
    Client(String),
    #[error(transparent)]
    Registration(#[from] DispatchError),
}

impl IntoResponse for BootstrapError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": self.to_string()})),
        )
            .into_response()
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("function name must not be empty")]
    EmptyName,
    #[error("function already registered: {0}")]
    AlreadyRegistered(String),
    #[error("function not registered: {0}")]
    FunctionNotFound(String),
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
    #[error("server error: {0}")]
    Serve(String),
}
