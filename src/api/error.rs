use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("unauthorized - credential rejected by the backend")]
    Unauthorized,

    #[error("request failed ({status}): {message}")]
    RequestFailed { status: StatusCode, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies carried in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Standard error body shape on 4xx/5xx responses
#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid carrying excessive data.
    /// The cut backs up to a char boundary so multi-byte content can
    /// never panic the slice.
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut cut = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        format!(
            "{}... (truncated, {} total bytes)",
            &body[..cut],
            body.len()
        )
    }

    /// Build an error from a non-2xx response, preferring the JSON body's
    /// `message` field when present.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        if status == StatusCode::UNAUTHORIZED {
            return ApiError::Unauthorized;
        }
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| Self::truncate_body(body));
        ApiError::RequestFailed { status, message }
    }

    /// The backend-supplied message, when this error carries one.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ApiError::RequestFailed { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_401_maps_to_unauthorized() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, r#"{"message":"expired"}"#);
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[test]
    fn message_field_is_extracted_from_body() {
        let err = ApiError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"message":"Insufficient funds."}"#,
        );
        assert_eq!(err.backend_message(), Some("Insufficient funds."));
    }

    #[test]
    fn non_json_body_is_carried_verbatim() {
        let err = ApiError::from_status(StatusCode::FORBIDDEN, "User is blacklisted or invalid");
        assert_eq!(err.backend_message(), Some("User is blacklisted or invalid"));
    }

    #[test]
    fn oversized_multibyte_body_truncates_without_panicking() {
        // 3 bytes per character, so the 500-byte limit lands mid-character.
        let body = "€".repeat(300);
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, &body);
        let message = err.backend_message().expect("message");
        assert!(message.starts_with('€'));
        assert!(message.contains("truncated, 900 total bytes"));
    }

    #[test]
    fn oversized_body_is_truncated() {
        let body = "x".repeat(2000);
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, &body);
        let message = err.backend_message().expect("message");
        assert!(message.len() < 600);
        assert!(message.contains("truncated"));
    }
}
