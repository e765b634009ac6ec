use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// Multipart body could not be parsed.
    #[error("Upload error: {0}")]
    UploadRejected(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Unsupported media type")]
    UnsupportedMediaType { accepted: Vec<&'static str> },

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::UploadRejected(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// "a", "a or b", "a, b, or c"
fn unsupported_message(accepted: &[&str]) -> String {
    let list = match accepted {
        [] => String::new(),
        [only] => only.to_string(),
        [first, second] => format!("{first} or {second}"),
        [rest @ .., last] => format!("{}, or {last}", rest.join(", ")),
    };
    format!("Unsupported Content-Type. Use {list}.")
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::Validation(msg) | AppError::Unauthorized(msg) => json!({ "error": msg }),
            AppError::UploadRejected(details) => json!({
                "error": "Upload error",
                "details": details
            }),
            AppError::UnsupportedMediaType { accepted } => json!({
                "error": unsupported_message(accepted),
                "accepted": accepted
            }),
            AppError::PayloadTooLarge(details) => json!({
                "error": "Payload too large",
                "details": details
            }),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                json!({
                    "error": "Server error",
                    "details": format!("{e:#}")
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Unauthorized("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::UnsupportedMediaType { accepted: vec![] }.status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unsupported_message_lists_all_types() {
        let msg = unsupported_message(&[
            "multipart/form-data",
            "application/octet-stream",
            "application/json",
        ]);
        assert_eq!(
            msg,
            "Unsupported Content-Type. Use multipart/form-data, application/octet-stream, or application/json."
        );
    }

    #[test]
    fn test_unsupported_message_two_types() {
        let msg = unsupported_message(&["application/octet-stream", "application/json"]);
        assert_eq!(
            msg,
            "Unsupported Content-Type. Use application/octet-stream or application/json."
        );
    }
}
