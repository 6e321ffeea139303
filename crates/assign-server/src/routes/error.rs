use api_types::{ErrorBody, ErrorDetail};
use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::{Entity, ServiceError};

#[derive(Debug)]
pub struct ErrorResponse {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for ErrorResponse {
    fn from(error: ServiceError) -> Self {
        let message = error.to_string();
        match error {
            ServiceError::NotFound(_) => {
                ErrorResponse::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
            }
            ServiceError::AlreadyExists(Entity::Team) => {
                ErrorResponse::new(StatusCode::BAD_REQUEST, "TEAM_EXISTS", message)
            }
            ServiceError::AlreadyExists(_) => {
                ErrorResponse::new(StatusCode::CONFLICT, "PR_EXISTS", message)
            }
            ServiceError::PullRequestMerged => {
                ErrorResponse::new(StatusCode::CONFLICT, "PR_MERGED", message)
            }
            ServiceError::NotAssigned => {
                ErrorResponse::new(StatusCode::CONFLICT, "NOT_ASSIGNED", message)
            }
            ServiceError::NoCandidate => {
                ErrorResponse::new(StatusCode::CONFLICT, "NO_CANDIDATE", message)
            }
            ServiceError::Conflict => ErrorResponse::new(StatusCode::CONFLICT, "CONFLICT", message),
            ServiceError::Internal(error) => {
                tracing::error!(?error, "store failure");
                ErrorResponse::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "internal error",
                )
            }
        }
    }
}

impl From<JsonRejection> for ErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "rejected request body");
        ErrorResponse::bad_request("invalid json")
    }
}

impl From<QueryRejection> for ErrorResponse {
    fn from(rejection: QueryRejection) -> Self {
        ErrorResponse::bad_request(rejection.body_text())
    }
}

/// Reject empty required string fields with the field name.
pub(crate) fn require(field: &str, value: &str) -> Result<(), ErrorResponse> {
    if value.trim().is_empty() {
        return Err(ErrorResponse::bad_request(format!("{field} is required")));
    }
    Ok(())
}
