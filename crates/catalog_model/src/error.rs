use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NetworkFailure,
    DecodeFailure,
}

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("request to {endpoint} could not complete: {message}")]
    Network { endpoint: String, message: String },
    #[error("provider returned status {status} for {endpoint}")]
    Status { endpoint: String, status: u16 },
    #[error("malformed response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
}

impl ProviderError {
    pub fn network(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    pub fn decode(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// A non-success status counts as a network failure: the request did not
    /// yield usable data.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Network { .. } | Self::Status { .. } => FailureKind::NetworkFailure,
            Self::Decode { .. } => FailureKind::DecodeFailure,
        }
    }

    pub fn endpoint(&self) -> &str {
        match self {
            Self::Network { endpoint, .. }
            | Self::Status { endpoint, .. }
            | Self::Decode { endpoint, .. } => endpoint,
        }
    }
}
