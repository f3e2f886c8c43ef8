use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// A required credential is absent; raised before any upstream call
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The language model failed or produced output we could not use
    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("No image found for '{phrase}'")]
    ImageNotFound { phrase: String },

    #[error("Image service error (status {status}): {body}")]
    ImageService { status: u16, body: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    /// An error surfaced at the request boundary, tagged with the failed operation
    #[error("{operation}: {source}")]
    Operation {
        operation: &'static str,
        source: Box<AppError>,
    },
}

impl AppError {
    /// Prefixes the message with the operation that failed, keeping the kind
    pub fn context(self, operation: &'static str) -> Self {
        AppError::Operation {
            operation,
            source: Box::new(self),
        }
    }

    /// The innermost error, with any operation tags removed
    pub fn root(&self) -> &AppError {
        match self {
            AppError::Operation { source, .. } => source.root(),
            other => other,
        }
    }

    /// Folds a transport failure from the image service into `ImageService`
    pub fn image_transport(err: reqwest::Error) -> Self {
        let status = if err.is_timeout() {
            StatusCode::GATEWAY_TIMEOUT
        } else {
            err.status().unwrap_or(StatusCode::BAD_GATEWAY)
        };
        AppError::ImageService {
            status: status.as_u16(),
            body: err.to_string(),
        }
    }

    /// Folds a transport failure from the model service into `Generation`
    pub fn generation_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Generation(format!("model request timed out: {}", err))
        } else {
            AppError::Generation(format!("model request failed: {}", err))
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self.root() {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
