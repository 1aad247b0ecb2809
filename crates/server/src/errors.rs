use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use models::errors::ModelError;
use service::auth::errors::AuthError;
use service::bridge::BridgeError;
use service::errors::ServiceError;

/// Uniform JSON error body: `{"error": "..."}` with a matching status.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub message: String,
}

impl JsonApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, error = %self.message, "request failed");
        }
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        let status = match &e {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Model(ModelError::Validation(_)) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Duplicate(_) => StatusCode::CONFLICT,
            // storage detail is logged, never returned to the client
            ServiceError::Db(detail) | ServiceError::Model(ModelError::Db(detail)) => {
                error!(error = %detail, "database error");
                return Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error");
            }
        };
        Self::new(status, e.to_string())
    }
}

impl From<BridgeError> for JsonApiError {
    fn from(e: BridgeError) -> Self {
        match e {
            BridgeError::Unauthorized => Self::new(StatusCode::UNAUTHORIZED, e.to_string()),
            BridgeError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, e.to_string()),
            BridgeError::Invalid(_) => Self::new(StatusCode::BAD_REQUEST, e.to_string()),
            BridgeError::Service(inner) => inner.into(),
        }
    }
}

impl From<AuthError> for JsonApiError {
    fn from(e: AuthError) -> Self {
        let status = match &e {
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::Conflict => StatusCode::CONFLICT,
            AuthError::NotFound => StatusCode::NOT_FOUND,
            AuthError::Unauthorized | AuthError::TokenError(_) => StatusCode::UNAUTHORIZED,
            AuthError::HashError(_) | AuthError::Repository(_) => {
                error!(error = %e, code = e.code(), "auth backend error");
                return Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error");
            }
        };
        Self::new(status, e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_matching_statuses() {
        let e: JsonApiError = ServiceError::Validation("bad".into()).into();
        assert_eq!(e.status, StatusCode::BAD_REQUEST);
        let e: JsonApiError = ServiceError::not_found("folder").into();
        assert_eq!(e.status, StatusCode::NOT_FOUND);
        let e: JsonApiError = ServiceError::duplicate("dup").into();
        assert_eq!(e.status, StatusCode::CONFLICT);
    }

    #[test]
    fn model_errors_split_by_variant() {
        let e: JsonApiError = ServiceError::Model(ModelError::Validation("invalid email".into())).into();
        assert_eq!(e.status, StatusCode::BAD_REQUEST);
        assert!(e.message.contains("invalid email"));
    }

    #[test]
    fn storage_detail_never_reaches_the_body() {
        let e: JsonApiError = ServiceError::Db("connection refused at 10.0.0.1".into()).into();
        assert_eq!(e.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.message, "internal error");

        let e: JsonApiError = ServiceError::Model(ModelError::Db("duplicate key sqlstate 23505".into())).into();
        assert_eq!(e.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.message, "internal error");

        let e: JsonApiError = AuthError::Repository("pool timed out".into()).into();
        assert_eq!(e.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.message, "internal error");
    }

    #[test]
    fn bridge_errors_keep_their_contract() {
        use service::bridge::BridgeError;
        let e: JsonApiError = BridgeError::Unauthorized.into();
        assert_eq!(e.status, StatusCode::UNAUTHORIZED);
        assert_eq!(e.message, "Invalid API key");
        let e: JsonApiError = BridgeError::Invalid("Unknown action: x".into()).into();
        assert_eq!(e.status, StatusCode::BAD_REQUEST);
    }
}
