use thiserror::Error;

use crate::signal::SignalKind;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VitalsError {
    #[error("Signal category not supported by host: {0}")]
    Unsupported(SignalKind),

    #[error("Timing buffer unavailable: {0}")]
    BufferUnavailable(String),

    #[error("Failed to publish snapshot: {0}")]
    Publish(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for VitalsError {
    fn from(e: serde_json::Error) -> Self {
        VitalsError::Serialization(e.to_string())
    }
}
