use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("resource not found")]
    NotFound,
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("rate limited")]
    RateLimited,
    #[error("unexpected status {status}: {reason}")]
    Status { status: StatusCode, reason: String },
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Default, serde::Deserialize)]
struct ErrorBody {
    reason: Option<String>,
    message: Option<String>,
}

impl ClientError {
    /// Classify a non-success response by status code.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        let reason = parsed
            .reason
            .or(parsed.message)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());

        match status {
            StatusCode::NOT_FOUND => Self::NotFound,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Unauthorized(reason),
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited,
            _ => Self::Status { status, reason },
        }
    }
}
