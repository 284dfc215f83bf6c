use thiserror::Error;

/// User-facing error produced at the API-client boundary.
///
/// Every transport or HTTP failure is normalized into one of these
/// before it leaves [`crate::api::RecordsApi`]; raw `reqwest` errors
/// never escape. Cancellation is deliberately *not* represented here:
/// cancelled list requests resolve to `Ok(None)` so `?` can never turn
/// a superseded request into a failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The backend could not be reached at all.
    #[error("Unable to reach the server. Please confirm the backend is running.")]
    Connect,
    /// A non-2xx HTTP response, with the message the UI should show.
    #[error("{message}")]
    Status { status: u16, message: String },
    /// Anything else, carrying the caller-supplied fallback message.
    #[error("{0}")]
    Other(String),
}

impl ApiError {
    /// HTTP status code, when the error came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Normalize a transport-level failure.
    pub(crate) fn from_transport(err: reqwest::Error, fallback: &str) -> Self {
        if err.is_connect() {
            ApiError::Connect
        } else {
            tracing::debug!(error = %err, "request failed without a response");
            ApiError::Other(fallback.to_string())
        }
    }

    /// Normalize a non-2xx response: prefer the server's `error` field,
    /// then a fixed string for well-known statuses, then the fallback.
    pub(crate) fn from_status(
        status: u16,
        payload: Option<&serde_json::Value>,
        fallback: &str,
    ) -> Self {
        let server_message = payload
            .and_then(|value| value.get("error"))
            .and_then(|value| value.as_str())
            .map(str::to_string);

        let message = server_message.unwrap_or_else(|| match status {
            400 => "The request was invalid. Please review the submitted values.".to_string(),
            404 => "The requested record could not be found.".to_string(),
            409 => "A record with this patient ID already exists.".to_string(),
            500 => "The server hit an unexpected error. Please try again later.".to_string(),
            _ => fallback.to_string(),
        });

        ApiError::Status { status, message }
    }
}
