use crate::FieldErrors;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum AppError {
    #[error("Not found.")]
    NotFound,

    #[error("Invalid input: {0}")]
    Validation(FieldErrors),

    #[error("{0}")]
    MalformedPayload(String),

    #[error("Authentication credentials were not provided.")]
    Unauthorized,

    #[error("You do not have permission to perform this action.")]
    Forbidden,

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn user_message(&self) -> &str {
        match self {
            Self::NotFound => "Not found.",
            Self::Validation(_) => "Invalid input.",
            Self::MalformedPayload(msg) => msg.as_str(),
            Self::Unauthorized => "Authentication credentials were not provided.",
            Self::Forbidden => "You do not have permission to perform this action.",
            Self::AuthFailed(_) => "Login failed. Please try again.",
            Self::Database(_) | Self::Internal(_) => "A server error occurred.",
        }
    }
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

#[cfg(feature = "server")]
mod server_impl {
    use super::AppError;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::Json;

    #[derive(serde::Serialize)]
    struct ErrorResponse<'a> {
        detail: &'a str,
    }

    impl AppError {
        pub fn status_code(&self) -> StatusCode {
            match self {
                AppError::NotFound => StatusCode::NOT_FOUND,
                AppError::Validation(_) | AppError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
                AppError::Unauthorized | AppError::AuthFailed(_) => StatusCode::UNAUTHORIZED,
                AppError::Forbidden => StatusCode::FORBIDDEN,
                AppError::Database(_) | AppError::Internal(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        }
    }

    impl IntoResponse for AppError {
        fn into_response(self) -> Response {
            let status = self.status_code();
            match &self {
                AppError::Validation(errors) => (status, Json(errors)).into_response(),
                AppError::Database(msg) | AppError::Internal(msg) => {
                    tracing::error!(error = %msg, "Request failed");
                    let detail = self.user_message();
                    (status, Json(ErrorResponse { detail })).into_response()
                }
                AppError::AuthFailed(msg) => {
                    tracing::warn!(error = %msg, "Authentication failed");
                    let detail = self.user_message();
                    (status, Json(ErrorResponse { detail })).into_response()
                }
                _ => {
                    let detail = self.user_message();
                    (status, Json(ErrorResponse { detail })).into_response()
                }
            }
        }
    }

    impl From<sea_orm::DbErr> for AppError {
        fn from(err: sea_orm::DbErr) -> Self {
            match err {
                sea_orm::DbErr::RecordNotFound(_) => AppError::NotFound,
                other => AppError::Database(other.to_string()),
            }
        }
    }

    impl From<serde_json::Error> for AppError {
        fn from(err: serde_json::Error) -> Self {
            AppError::MalformedPayload(format!("JSON parse error - {err}"))
        }
    }
}

#[cfg(all(test, feature = "server"))]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_renders_field_map() {
        let err = AppError::from(FieldErrors::single("vote", "Must be a valid boolean."));
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({"vote": ["Must be a valid boolean."]}));
    }

    #[tokio::test]
    async fn test_not_found_and_unauthorized() {
        let (status, body) = body_json(AppError::NotFound).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Not found.");

        let (status, _) = body_json(AppError::Unauthorized).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_internal_errors_hide_details() {
        let (status, body) = body_json(AppError::Database("connection refused".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], "A server error occurred.");
    }

    #[test]
    fn test_record_not_found_maps_to_not_found() {
        let err: AppError = sea_orm::DbErr::RecordNotFound("restaurant".into()).into();
        assert!(matches!(err, AppError::NotFound));
    }
}
