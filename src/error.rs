//! Application error type and its mapping onto HTTP responses.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// The errors a request handler may return.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The request body was well-formed JSON but broke a domain rule,
    /// e.g. a non-positive amount.
    #[error("{0}")]
    Validation(String),

    /// No row with the requested id is visible to the caller.
    #[error("{0}")]
    NotFound(&'static str),

    /// A unique key (the user email) is already taken.
    #[error("{0}")]
    Conflict(String),

    /// Missing, invalid or expired credentials, or a token whose user no
    /// longer exists.
    #[error("{0}")]
    Unauthorized(&'static str),

    /// An unexpected storage failure. The message is only logged.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Any other unexpected failure. The message is only logged.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            AppError::Database(e) => {
                error!(error = %e, "unhandled database error");
                "Internal server error".to_string()
            }
            AppError::Internal(e) => {
                error!(error = %e, "unhandled internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_error_taxonomy() {
        assert_eq!(
            AppError::Validation("amount must be greater than 0".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(AppError::NotFound("Transaction not found").status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Conflict("taken".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Unauthorized("nope").status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::Database(sqlx::Error::RowNotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn internal_errors_hide_their_message() {
        let resp = AppError::Internal(anyhow::anyhow!("disk on fire")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["detail"], "Internal server error");
    }
}
