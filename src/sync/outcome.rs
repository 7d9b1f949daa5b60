use crate::api::ApiError;

use super::MSG_NETWORK_ERROR;

/// Settled outcome of one aggregated read.
///
/// Every read is captured into this shape before any session-state
/// transition happens, so the 401 rule can be applied over the whole cycle
/// at once instead of racing through per-read callbacks.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome<T> {
    Success(T),
    Unauthorized,
    Failed(String),
}

impl<T> ReadOutcome<T> {
    /// Capture an API result, turning failures into a user-facing message.
    /// The backend's `message` field wins when present; transport failures
    /// get the generic connectivity string; anything else falls back to the
    /// per-operation default.
    pub fn capture(result: Result<T, ApiError>, fallback: &str) -> Self {
        match result {
            Ok(data) => ReadOutcome::Success(data),
            Err(ApiError::Unauthorized) => ReadOutcome::Unauthorized,
            Err(ApiError::Network(_)) => ReadOutcome::Failed(MSG_NETWORK_ERROR.to_string()),
            Err(err) => match err.backend_message() {
                Some(message) => ReadOutcome::Failed(message.to_string()),
                None => ReadOutcome::Failed(fallback.to_string()),
            },
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ReadOutcome::Unauthorized)
    }
}
