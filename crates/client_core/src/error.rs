use shared::{domain::ImageId, error::ErrorKind};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid api base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("{resource} not found")]
    NotFound { resource: String },
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },
    #[error("no image found for id {id}")]
    ImageNotFound { id: ImageId },
    #[error("image api key is not configured")]
    MissingApiKey,
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::ImageNotFound { .. } | Self::MissingApiKey => ErrorKind::ImageResolution,
            Self::InvalidBaseUrl { .. }
            | Self::Http(_)
            | Self::Status { .. }
            | Self::Decode { .. } => ErrorKind::Network,
        }
    }
}
