use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors raised while talking to the mailing-list provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{message}")]
    Status { status: StatusCode, message: String },
    #[error("failed to decode provider response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// RFC 7807 style body returned by the provider on failure.
#[derive(Debug, Default, Deserialize)]
struct ProblemDetail {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

impl ProviderError {
    /// Build a status error from a failed response body, preferring the
    /// problem document's `detail`, then its `title`, then the raw text.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let problem: ProblemDetail = serde_json::from_str(body).unwrap_or_default();
        let message = [problem.detail, problem.title]
            .into_iter()
            .flatten()
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
            .or_else(|| {
                let text = body.trim();
                (!text.is_empty()).then(|| text.to_string())
            })
            .unwrap_or_else(|| "Failed to fetch data".to_string());

        ProviderError::Status { status, message }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ProviderError::Http(err) => err.status(),
            ProviderError::Status { status, .. } => Some(*status),
            ProviderError::Decode(_) => None,
        }
    }
}
