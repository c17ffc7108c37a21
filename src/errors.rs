use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::JsonResponse;

#[derive(Debug)]
pub enum RequestError {
    NotFound,
    NotAuthorized(&'static str),
    Forbidden(&'static str),
    /// A field-keyed validation failure: `{"<field>": ["<message>"]}`.
    Validation(&'static str, &'static str),
    /// A business-rule rejection: `{"error": "<message>"}`.
    BadRequest(&'static str),
    ServerError,
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for RequestError {
    fn from(value: sqlx::Error) -> Self {
        Self::DatabaseError(value)
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> axum::response::Response {
        self.to_json_response().into_response()
    }
}

impl RequestError {
    /// True when the underlying database error is a UNIQUE constraint
    /// violation. The check-then-insert guards on favorites, the cart and
    /// followers race benignly; the unique index fails the second writer and
    /// handlers map that failure to the same duplicate response.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            RequestError::DatabaseError(sqlx::Error::Database(e)) => {
                e.message().contains("UNIQUE constraint failed")
            }
            _ => false,
        }
    }

    /// Column named in a UNIQUE violation message, e.g. `users.email`.
    pub fn unique_violation_column(&self) -> Option<&str> {
        match self {
            RequestError::DatabaseError(sqlx::Error::Database(e)) => {
                let message = e.message();
                message
                    .strip_prefix("UNIQUE constraint failed: ")
                    .map(|rest| rest.trim())
                    .and_then(|rest| rest.split(',').next())
            }
            _ => None,
        }
    }

    pub fn to_json_response(&self) -> JsonResponse<Value> {
        let (status_code, body) = match self {
            RequestError::NotFound => {
                (StatusCode::NOT_FOUND, json!({ "detail": "Not found." }))
            }
            RequestError::NotAuthorized(message) => {
                (StatusCode::UNAUTHORIZED, json!({ "detail": message }))
            }
            RequestError::Forbidden(message) => {
                (StatusCode::FORBIDDEN, json!({ "detail": message }))
            }
            RequestError::Validation(field, message) => {
                (StatusCode::BAD_REQUEST, json!({ (*field): [message] }))
            }
            RequestError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, json!({ "error": message }))
            }
            RequestError::ServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "detail": "Internal server error" }),
            ),
            RequestError::DatabaseError(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "detail": "Internal server error" }),
                )
            }
        };
        (status_code, Json(body))
    }
}
