use std::sync::Arc;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Shared handler result type.
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error, Clone)]
pub enum ApiError {
    #[error("unauthenticated")]
    Unauthorized,
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("validation failed")]
    Validation(Vec<String>),
    #[error("bad request: {0}")]
    InvalidInput(String),
    #[error("internal server error")]
    Internal(Arc<anyhow::Error>),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized => "UNAUTHENTICATED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Validation(_) => "VALIDATION",
            ApiError::InvalidInput(_) => "BAD_REQUEST",
            ApiError::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn internal(err: anyhow::Error) -> Self {
        Self::Internal(Arc::new(err))
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Messages safe to show the caller. Internal detail never leaves here.
    pub fn messages(&self) -> Vec<String> {
        match self {
            ApiError::Validation(errors) => errors.clone(),
            ApiError::NotFound(what) => vec![format!("{what} not found")],
            ApiError::InvalidInput(message) => vec![message.clone()],
            ApiError::Unauthorized | ApiError::Internal(_) => vec![self.to_string()],
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            success: false,
            code: self.code(),
            errors: self.messages(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(value: anyhow::Error) -> Self {
        Self::internal(value)
    }
}

/// Failure envelope: `{success: false, code, errors: [...]}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub code: &'static str,
    pub errors: Vec<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(err) = &self {
            tracing::error!(error = ?err, "request failed");
        }
        (self.status(), Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};

    #[test]
    fn internal_errors_are_masked() {
        let err = ApiError::internal(anyhow::anyhow!("duplicate key value violates constraint"));
        let body = err.body();
        assert_eq!(body.code, "INTERNAL");
        assert_eq!(body.errors, vec!["internal server error".to_string()]);
    }

    #[test]
    fn validation_errors_keep_every_message() {
        let err = ApiError::Validation(vec![
            "Name is Minimum 3 Charachers".into(),
            "Description is Maximum 255 Charachers".into(),
        ]);
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.messages().len(), 2);
    }

    #[tokio::test]
    async fn not_found_renders_envelope() {
        let response = ApiError::not_found("Employee").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            json!({
                "success": false,
                "code": "NOT_FOUND",
                "errors": ["Employee not found"]
            })
        );
    }
}
