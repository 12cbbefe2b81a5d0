use thiserror::Error;

pub type LookupResult<T> = std::result::Result<T, LookupError>;

/// Failures talking to the player backend.
///
/// A missing player is not an error: [`crate::client::Resolution::NotFound`]
/// carries that case so callers can treat it as a normal outcome.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Transport failure (connect, TLS, body read).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not match the expected shape.
    #[error("could not decode backend response: {0}")]
    Decode(String),

    #[error("invalid backend url: {0}")]
    InvalidBaseUrl(String),
}

impl LookupError {
    /// Short operator-facing description used in notifications and
    /// `Failed` panels.
    pub fn summary(&self) -> String {
        match self {
            LookupError::Network(_) => "Could not reach the backend.".to_string(),
            LookupError::Status { status, .. } => format!("Backend returned HTTP {status}."),
            LookupError::Decode(_) => "Backend sent an unexpected response.".to_string(),
            LookupError::InvalidBaseUrl(url) => format!("Invalid backend url: {url}"),
        }
    }
}
