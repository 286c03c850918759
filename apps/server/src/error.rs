use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use commipay_core::errors::{DatabaseError, Error as CoreError};
use thiserror::Error;

use crate::models::ApiResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(e) => match e {
                CoreError::NotFound(_) | CoreError::Database(DatabaseError::NotFound(_)) => {
                    StatusCode::NOT_FOUND
                }
                CoreError::Conflict(_) | CoreError::Database(DatabaseError::UniqueViolation(_)) => {
                    StatusCode::CONFLICT
                }
                CoreError::Validation(_)
                | CoreError::Database(DatabaseError::ForeignKeyViolation(_)) => {
                    StatusCode::BAD_REQUEST
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected with {}: {}", status, self);
        }
        ApiResponse::<()>::failure(status, self.to_string()).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_statuses() {
        let cases = [
            (CoreError::not_found("gone"), StatusCode::NOT_FOUND),
            (
                CoreError::Database(DatabaseError::NotFound("row".into())),
                StatusCode::NOT_FOUND,
            ),
            (CoreError::Conflict("dup".into()), StatusCode::CONFLICT),
            (
                CoreError::Database(DatabaseError::UniqueViolation("dup".into())),
                StatusCode::CONFLICT,
            ),
            (CoreError::invalid_input("bad"), StatusCode::BAD_REQUEST),
            (
                CoreError::Database(DatabaseError::ForeignKeyViolation("fk".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                CoreError::Unexpected("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn not_found_message_is_passed_through() {
        let err = ApiError::from(CoreError::not_found("Committee not found"));
        assert_eq!(err.to_string(), "Committee not found");
    }
}
