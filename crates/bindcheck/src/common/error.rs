use thiserror::Error;

use crate::common::error::BindCheckError::GenericError;

#[derive(Debug, Error)]
pub enum BindCheckError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Deserialization error: {0}")]
    DeserializationError(String),
    #[error("Unsupported cluster `{0}`")]
    UnsupportedCluster(String),
    #[error("Environment variable `{0}` is not set")]
    MissingEnvironment(&'static str),
    #[error("Environment variable `{var}` has an invalid value `{value}`")]
    InvalidEnvironment { var: &'static str, value: String },
    #[error("Incorrect number of processes: expected {expected}, found {actual}")]
    Precondition { expected: u32, actual: u32 },
    #[error("Probe error: {0}")]
    Probe(String),
    #[error("Unknown action `{0}`")]
    UnknownAction(String),
    #[error("Action `{0}` cannot run on this cluster")]
    InfeasibleAction(String),
    #[error("Participant {rank} aborted the gather: {reason}")]
    Aborted { rank: u32, reason: String },
    #[error("Protocol error: {0}")]
    Protocol(String),
    #[error("Error: {0}")]
    GenericError(String),
}

impl From<serde_json::error::Error> for BindCheckError {
    fn from(e: serde_json::error::Error) -> Self {
        Self::SerializationError(e.to_string())
    }
}

impl From<bincode::Error> for BindCheckError {
    fn from(e: bincode::Error) -> Self {
        Self::SerializationError(e.to_string())
    }
}

impl From<anyhow::Error> for BindCheckError {
    fn from(error: anyhow::Error) -> Self {
        Self::GenericError(error.to_string())
    }
}

impl From<toml::de::Error> for BindCheckError {
    fn from(error: toml::de::Error) -> Self {
        Self::DeserializationError(error.to_string())
    }
}

impl From<toml::ser::Error> for BindCheckError {
    fn from(error: toml::ser::Error) -> Self {
        Self::SerializationError(error.to_string())
    }
}

impl From<String> for BindCheckError {
    fn from(e: String) -> Self {
        GenericError(e)
    }
}
