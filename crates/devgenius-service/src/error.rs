//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use devgenius_store::StoreError;

use crate::genai::GenAiError;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unauthorized - missing or invalid credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Login failed.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Forbidden - valid credentials but not the owner of the resource.
    #[error("forbidden")]
    Forbidden,

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Conflict - resource already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The caller used up their messages for the current window.
    #[error("message limit reached: used={used}, limit={limit}")]
    QuotaExceeded {
        /// Limit for the window.
        limit: u32,
        /// Messages used.
        used: u32,
        /// When the counter resets.
        reset_at: DateTime<Utc>,
    },

    /// The generative API rejected or failed the call.
    #[error("upstream error ({status}): {message}")]
    Upstream {
        /// Status relayed to the caller.
        status: StatusCode,
        /// Message relayed to the caller.
        message: String,
    },

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Authentication required".to_string(),
                None,
            ),
            Self::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                "Invalid email or password".to_string(),
                None,
            ),
            Self::Forbidden => (StatusCode::FORBIDDEN, "forbidden", self.to_string(), None),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone(), None),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone(), None),
            Self::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone(), None),
            Self::QuotaExceeded {
                limit,
                used,
                reset_at,
            } => (
                StatusCode::TOO_MANY_REQUESTS,
                "quota_exceeded",
                "Message limit reached. Please upgrade your plan or wait for the reset.".to_string(),
                Some(serde_json::json!({
                    "limit": limit,
                    "used": used,
                    "reset_at": reset_at
                })),
            ),
            Self::Upstream { status, message } => {
                let code = if *status == StatusCode::TOO_MANY_REQUESTS {
                    "upstream_rate_limited"
                } else {
                    "upstream_error"
                };
                (*status, code, message.clone(), None)
            }
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => {
                Self::NotFound(format!("{entity} not found: {id}"))
            }
            StoreError::Conflict(msg) => Self::Conflict(msg),
            StoreError::InvalidState(msg) => Self::BadRequest(msg),
            StoreError::Io(e) => Self::Internal(e.to_string()),
            StoreError::Serialization(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<GenAiError> for ApiError {
    fn from(err: GenAiError) -> Self {
        match err {
            GenAiError::Api { status, message } => {
                let status =
                    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                let message = match status {
                    StatusCode::BAD_REQUEST => "Invalid request to AI service".to_string(),
                    StatusCode::TOO_MANY_REQUESTS => "AI service rate limit exceeded".to_string(),
                    _ => message,
                };
                Self::Upstream { status, message }
            }
            GenAiError::Http(e) => {
                tracing::error!(error = %e, "Generative API request failed");
                Self::Upstream {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "Failed to generate AI response".to_string(),
                }
            }
            GenAiError::Configuration(msg) => Self::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_statuses() {
        let cases = [
            (StoreError::Conflict("dup".into()), StatusCode::CONFLICT),
            (StoreError::InvalidState("paid".into()), StatusCode::BAD_REQUEST),
            (
                StoreError::NotFound {
                    entity: "plan",
                    id: "gold".into(),
                },
                StatusCode::NOT_FOUND,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn upstream_statuses_are_relayed() {
        let err = ApiError::from(GenAiError::Api {
            status: 429,
            message: "Resource exhausted".into(),
        });
        assert!(matches!(
            &err,
            ApiError::Upstream { message, .. } if message == "AI service rate limit exceeded"
        ));
        assert_eq!(err.into_response().status(), StatusCode::TOO_MANY_REQUESTS);

        let err = ApiError::from(GenAiError::Api {
            status: 503,
            message: "The model is overloaded".into(),
        });
        assert!(matches!(
            &err,
            ApiError::Upstream { message, .. } if message == "The model is overloaded"
        ));
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn quota_exceeded_is_429() {
        let err = ApiError::QuotaExceeded {
            limit: 15,
            used: 15,
            reset_at: Utc::now(),
        };
        assert_eq!(err.into_response().status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
