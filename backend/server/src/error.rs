use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use records::{ParseError, Status, payloads::Failure};
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Reference id already issued: {0}")]
    Duplicate(String),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Record encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Stored record {0} is unreadable")]
    Corrupt(String),
}

#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("{0}")]
    Validation(String),

    #[error("Not found")]
    NotFound(String),

    #[error("Cannot move from {from} to {to}")]
    InvalidTransition { from: Status, to: Status },

    #[error("Could not allocate a unique reference id")]
    RefIdExhausted,

    #[error("Database error")]
    Store(#[from] StoreError),
}

impl From<ParseError> for LifecycleError {
    fn from(e: ParseError) -> Self {
        LifecycleError::Validation(e.to_string())
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload")]
    MalformedPayload,

    #[error("Invalid username or password")]
    Unauthorized,

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::MalformedPayload => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Lifecycle(LifecycleError::Validation(_)) => StatusCode::BAD_REQUEST,
            AppError::Lifecycle(LifecycleError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Lifecycle(LifecycleError::InvalidTransition { .. }) => StatusCode::CONFLICT,
            AppError::Lifecycle(LifecycleError::RefIdExhausted | LifecycleError::Store(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        match &self {
            AppError::Lifecycle(LifecycleError::Store(e)) => error!("Store failure: {e}"),
            AppError::Lifecycle(LifecycleError::RefIdExhausted) => error!("{self}"),
            AppError::Lifecycle(LifecycleError::NotFound(ref_id)) => {
                warn!("Complaint {ref_id} not found")
            }
            _ => warn!("Request rejected: {self}"),
        }

        let body = match &self {
            AppError::Unauthorized => Failure::message(self.to_string()),
            _ => Failure::error(self.to_string()),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{body::to_bytes, http::StatusCode, response::IntoResponse};
    use records::Status;

    use super::{AppError, LifecycleError, StoreError};

    async fn render(e: AppError) -> (StatusCode, serde_json::Value) {
        let response = e.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_status_codes() {
        let cases = [
            (AppError::MalformedPayload, StatusCode::BAD_REQUEST),
            (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
            (
                LifecycleError::Validation("phone is required".into()).into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                LifecycleError::NotFound("FMR-2025-10000".into()).into(),
                StatusCode::NOT_FOUND,
            ),
            (
                LifecycleError::InvalidTransition {
                    from: Status::Resolved,
                    to: Status::Submitted,
                }
                .into(),
                StatusCode::CONFLICT,
            ),
            (
                LifecycleError::Store(StoreError::Duplicate("FMR-2025-10000".into())).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (e, expected) in cases {
            let (status, body) = render(e).await;
            assert_eq!(status, expected);
            assert_eq!(body["success"], false);
        }
    }

    #[tokio::test]
    async fn test_envelopes() {
        let (_, body) = render(AppError::Unauthorized).await;
        assert_eq!(body["message"], "Invalid username or password");
        assert!(body.get("error").is_none());

        let (_, body) = render(LifecycleError::NotFound("FMR-2025-10000".into()).into()).await;
        assert_eq!(body["error"], "Not found");

        let store_error = LifecycleError::from(StoreError::Duplicate("FMR-2025-10000".into()));
        let (_, body) = render(store_error.into()).await;
        assert_eq!(body["error"], "Database error");
    }
}
