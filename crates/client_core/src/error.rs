//! Failure taxonomy for submission attempts and controller setup.

use std::time::Duration;

use shared::error::ValidationError;
use thiserror::Error;

/// Why an attempt ended in the `Error` status. Operators only ever see `Error`;
/// the variant is kept for logs and tests.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("record is not submittable: {0}")]
    Validation(#[from] ValidationError),
    #[error("workflow endpoint unreachable or refused the request: {0}")]
    Transport(#[from] TransportError),
    #[error("workflow endpoint did not respond within {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("workflow response body is not valid JSON: {0}")]
    ResponseFormat(#[source] serde_json::Error),
    #[error("workflow did not confirm the submission (message: {message:?})")]
    Rejected { message: Option<String> },
}

impl SubmitError {
    pub fn kind(&self) -> SubmitErrorKind {
        match self {
            SubmitError::Validation(_) => SubmitErrorKind::Validation,
            SubmitError::Transport(_) => SubmitErrorKind::Transport,
            SubmitError::Timeout(_) => SubmitErrorKind::Timeout,
            SubmitError::ResponseFormat(_) => SubmitErrorKind::ResponseFormat,
            SubmitError::Rejected { .. } => SubmitErrorKind::Rejected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitErrorKind {
    Validation,
    Transport,
    Timeout,
    ResponseFormat,
    Rejected,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("endpoint answered with HTTP {status}")]
    Status { status: u16 },
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("no workflow endpoint configured; set APP__ENDPOINT_URL or endpoint_url")]
    MissingEndpoint,
    #[error("invalid workflow endpoint '{url}': {source}")]
    InvalidEndpoint {
        url: String,
        source: url::ParseError,
    },
    #[error("unsupported endpoint scheme '{0}', expected http or https")]
    UnsupportedScheme(String),
    #[error("accepted success message must not be empty")]
    EmptyAcceptedMessage,
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}
