use thiserror::Error;

/// Errors produced by the registration, activation, and flow components.
///
/// The taxonomy keeps "provider unreachable" ([`Network`](Self::Network))
/// distinct from "provider returned garbage"
/// ([`Deserialization`](Self::Deserialization)) so callers can tell the two
/// apart. Precondition violations are surfaced at construction time and are
/// never retried.
#[derive(Debug, Error)]
pub enum DevRegError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("No activation code available on this response")]
    MissingActivationCode,
    #[error("Client id cannot be null or empty")]
    MissingClientId,
    #[error("Flow abandoned before a redirect was received")]
    FlowAbandoned,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Deserialization error: {0}")]
    Deserialization(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Redirect dispatch failed: {0}")]
    Dispatch(String),
    #[error("Token exchange failed: {0}")]
    TokenExchange(String),
}

impl From<reqwest::Error> for DevRegError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Deserialization(error.to_string())
        } else {
            Self::Network(error.to_string())
        }
    }
}

impl From<serde_json::Error> for DevRegError {
    fn from(error: serde_json::Error) -> Self {
        Self::Deserialization(error.to_string())
    }
}
