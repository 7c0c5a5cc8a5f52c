use serde::Serialize;
use thiserror::Error;

/// Failures reported by the video platform API client.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("YOUTUBE_API_KEY is not configured")]
    MissingApiKey,

    /// Daily quota or rate limit exhausted.
    #[error("YouTube API quota exhausted: {0}")]
    QuotaExceeded(String),

    #[error("YouTube API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("request to YouTube API failed: {0}")]
    Transport(String),

    #[error("unexpected YouTube API response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            UpstreamError::InvalidResponse(e.to_string())
        } else {
            UpstreamError::Transport(e.to_string())
        }
    }
}

impl From<url::ParseError> for UpstreamError {
    fn from(e: url::ParseError) -> Self {
        UpstreamError::Transport(format!("invalid API url: {e}"))
    }
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Rejected search configuration. Raised before any API call.
    #[error("invalid search configuration: {0}")]
    Configuration(String),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("channel not found: {0}")]
    ChannelNotFound(String),
}

impl DiscoveryError {
    pub fn config(message: impl Into<String>) -> Self {
        DiscoveryError::Configuration(message.into())
    }

    /// Short machine-readable kind, used as the `error` field of API responses.
    pub fn kind(&self) -> &'static str {
        match self {
            DiscoveryError::Configuration(_) => "invalid_configuration",
            DiscoveryError::Upstream(UpstreamError::QuotaExceeded(_)) => "quota_exceeded",
            DiscoveryError::Upstream(_) => "upstream_error",
            DiscoveryError::ChannelNotFound(_) => "channel_not_found",
        }
    }
}

/// Non-fatal conditions found while computing channel metrics. The affected
/// metric is reported as unknown and the search carries on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricWarning {
    #[error("channel {channel_id} has no videos in its sample")]
    EmptySample { channel_id: String },

    #[error("channel {channel_id} hides its subscriber count")]
    UnknownSubscriberCount { channel_id: String },

    #[error("channel {channel_id} has fewer than two sampled videos")]
    InsufficientSample { channel_id: String },
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;
