use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Errors raised while fetching one user's list from the catalog service
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("User {0} was not found")]
    UserNotFound(String),

    #[error("{0}'s list is private")]
    PrivateList(String),

    #[error("Rate limited by the catalog service after {attempts} attempts")]
    RateLimited { attempts: u32 },

    #[error("Catalog service unavailable while fetching {username}: {reason}")]
    UpstreamUnavailable { username: String, reason: String },

    #[error("Timed out waiting for the catalog service")]
    Timeout,

    /// The comparison was abandoned; never surfaced to clients.
    #[error("Fetch cancelled")]
    Cancelled,
}

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable tag for the error
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::Fetch(FetchError::UserNotFound(_)) => "user_not_found",
            AppError::Fetch(FetchError::PrivateList(_)) => "private_list",
            AppError::Fetch(FetchError::RateLimited { .. }) => "rate_limited",
            AppError::Fetch(FetchError::UpstreamUnavailable { .. }) => "upstream_unavailable",
            AppError::Fetch(FetchError::Timeout) => "timeout",
            AppError::Fetch(FetchError::Cancelled) | AppError::Internal(_) => "internal",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Fetch(FetchError::UserNotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Fetch(FetchError::PrivateList(_)) => StatusCode::FORBIDDEN,
            AppError::Fetch(FetchError::RateLimited { .. }) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Fetch(FetchError::UpstreamUnavailable { .. }) => StatusCode::BAD_GATEWAY,
            AppError::Fetch(FetchError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Fetch(FetchError::Cancelled) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(kind = self.kind(), error = %self, "Request failed");
        }

        let body = Json(json!({
            "kind": self.kind(),
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
