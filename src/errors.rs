//! # Error handling
//!
//! Every failure a resource operation can hit is an [`ApiError`]. Handlers
//! return it directly and the [`IntoResponse`] impl turns it into the
//! `{"status": "error", "message": ...}` envelope with a matching HTTP status.
//!
//! Database internals are never sent to clients. They are logged with
//! `tracing::error!` and the client sees a generic message instead.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use crate::response::Envelope;

/// Errors raised by controllers and routers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 404 - no record matches the lookup
    #[error("{resource} {lookup} not found")]
    NotFound { resource: String, lookup: String },

    /// 409 - `create` was called with a code that is already taken
    #[error("{resource} with code '{code}' already exists")]
    Duplicate { resource: String, code: String },

    /// 409 - the database rejected the write (unique constraint)
    #[error("{0}")]
    Conflict(String),

    /// 422 - the soft-delete flag does not allow the requested transition
    #[error("{0}")]
    InvalidState(String),

    /// 400 - malformed body, path or query
    #[error("{0}")]
    BadRequest(String),

    /// 404 - `PATCH /R/{id}/{action}` with an action nobody registered
    #[error("unknown action '{action}' for {resource}")]
    UnknownAction { resource: String, action: String },

    /// 500 - anything else coming out of the database layer
    #[error("a database error occurred")]
    Database(#[source] DbErr),

    /// 500 - a record could not be turned into JSON
    #[error("failed to serialize the response")]
    Serialization(#[from] serde_json::Error),
}

impl ApiError {
    pub fn not_found(resource: impl Into<String>, lookup: impl ToString) -> Self {
        Self::NotFound {
            resource: resource.into(),
            lookup: lookup.to_string(),
        }
    }

    pub fn duplicate(resource: impl Into<String>, code: impl Into<String>) -> Self {
        Self::Duplicate {
            resource: resource.into(),
            code: code.into(),
        }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn unknown_action(resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self::UnknownAction {
            resource: resource.into(),
            action: action.into(),
        }
    }

    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } | Self::UnknownAction { .. } => StatusCode::NOT_FOUND,
            Self::Duplicate { .. } | Self::Conflict(_) => StatusCode::CONFLICT,
            Self::InvalidState(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) | Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message that is safe to show to a client.
    #[must_use]
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    fn log_internal(&self) {
        match self {
            Self::Database(err) => tracing::error!(error = %err, "database error"),
            Self::Serialization(err) => tracing::error!(error = %err, "serialization error"),
            Self::Conflict(message) => tracing::warn!(%message, "write conflict"),
            _ => tracing::debug!(error = %self, "request failed"),
        }
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        if let DbErr::RecordNotFound(what) = &err {
            return Self::not_found("record", what);
        }
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                tracing::debug!(%detail, "unique constraint violated");
                Self::Conflict("a record with the same unique value already exists".to_string())
            }
            _ => Self::Database(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_internal();
        let status = self.status_code();
        (status, Envelope::<()>::error(self.user_message())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::not_found("example", 3).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::duplicate("example", "A-1").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::invalid_state("x").status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::bad_request("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::unknown_action("example", "explode").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Database(DbErr::Custom("boom".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ApiError::not_found("example", "id 7").to_string(),
            "example id 7 not found"
        );
        assert_eq!(
            ApiError::duplicate("example", "A-1").to_string(),
            "example with code 'A-1' already exists"
        );
        assert_eq!(
            ApiError::unknown_action("example", "explode").to_string(),
            "unknown action 'explode' for example"
        );
    }

    #[test]
    fn test_database_error_is_sanitized() {
        let err = ApiError::Database(DbErr::Custom(
            "connection to 10.0.0.3:5432 refused, password=hunter2".into(),
        ));
        let message = err.user_message();
        assert_eq!(message, "a database error occurred");
        assert!(!message.contains("hunter2"));
    }

    #[test]
    fn test_record_not_found_maps_to_not_found() {
        let err = ApiError::from(DbErr::RecordNotFound("id 9".into()));
        assert!(matches!(err, ApiError::NotFound { .. }));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_other_db_errors_map_to_database() {
        let err = ApiError::from(DbErr::Custom("weird".into()));
        assert!(matches!(err, ApiError::Database(_)));
    }

    #[tokio::test]
    async fn test_into_response_is_error_envelope() {
        let response = ApiError::invalid_state("example 1 is not marked as deleted").into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "example 1 is not marked as deleted");
        assert!(body.get("data").is_none());
    }
}
