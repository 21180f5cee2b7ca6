//! Error types surfaced by a refresh cycle.
//!
//! Every failure aborts the cycle it happened in. The variants exist so that a host can tell
//! "the credentials are no longer usable" apart from "the API returned something we cannot use"
//! and from "the network is having a bad day", see [`RefreshError::kind`].

use http::{Method, StatusCode};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Broad classification of a refresh failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No usable authenticated client could be obtained, or the API rejected its credentials.
    Auth,
    /// The API answered, but with missing or unusable data.
    Data,
    /// The request never produced an answer (connection, timeout, server-side failure).
    Transport,
}

/// Failure to produce an authenticated client.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The stored credentials cannot be refreshed and the user has to authorize again.
    #[error("stored YouTube credentials were rejected, re-authentication is required")]
    Rejected,
    /// Refreshing the access token failed for another reason.
    #[error("refresh YouTube access token")]
    Refresh(#[source] BoxError),
}

impl From<eyre::Report> for AuthError {
    fn from(e: eyre::Report) -> Self {
        Self::Refresh(e.into())
    }
}

/// Failure of a single YouTube Data API call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("send {method} request to YouTube API: {url}")]
    Transport {
        method: Method,
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("YouTube API {method} request to {url} failed with status {status}: {body}")]
    Status {
        method: Method,
        url: String,
        status: StatusCode,
        body: String,
    },
    #[error("parse YouTube API response from {url} as JSON")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Transport { .. } => ErrorKind::Transport,
            ApiError::Status { status, .. } if *status == StatusCode::UNAUTHORIZED => {
                ErrorKind::Auth
            }
            ApiError::Status { status, .. }
                if status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS =>
            {
                ErrorKind::Transport
            }
            ApiError::Status { .. } | ApiError::Decode { .. } => ErrorKind::Data,
        }
    }
}

/// Why a refresh cycle produced no result.
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("obtain authenticated YouTube client")]
    Auth(#[from] AuthError),
    #[error("list configured channels")]
    ListChannels(#[source] ApiError),
    #[error("fetch latest upload of channel {channel_id}")]
    LatestVideo {
        channel_id: String,
        #[source]
        source: ApiError,
    },
    #[error("channel {channel_id} has no uploads")]
    NoUploads { channel_id: String },
    #[error("malformed data for channel {channel_id}: {reason}")]
    Malformed { channel_id: String, reason: String },
    #[error("channel fetch task did not complete")]
    Task(#[from] tokio::task::JoinError),
}

impl RefreshError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RefreshError::Auth(_) => ErrorKind::Auth,
            RefreshError::ListChannels(source) | RefreshError::LatestVideo { source, .. } => {
                source.kind()
            }
            RefreshError::NoUploads { .. } | RefreshError::Malformed { .. } => ErrorKind::Data,
            RefreshError::Task(_) => ErrorKind::Transport,
        }
    }

    pub(crate) fn malformed(channel_id: &str, reason: impl Into<String>) -> Self {
        RefreshError::Malformed {
            channel_id: channel_id.to_string(),
            reason: reason.into(),
        }
    }
}
