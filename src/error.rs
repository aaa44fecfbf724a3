use reqwest::StatusCode;
use thiserror::Error;

use crate::parser::labels::SectionKind;

/// Failure of the extraction pipeline for one section kind. Other kinds on
/// the same page are unaffected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("no {0} found")]
    NotFound(SectionKind),
}

/// Failure to obtain a page body.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to fetch {url}: status {status}")]
    Status { url: String, status: StatusCode },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Failure of one page in a scrape batch.
#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("extraction for {url} did not complete: {source}")]
    Task {
        url: String,
        #[source]
        source: tokio::task::JoinError,
    },
}

impl FetchError {
    /// Rate limiting and server-side errors are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            FetchError::Transport { source, .. } => source.is_timeout() || source.is_connect(),
        }
    }
}
