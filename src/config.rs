use serde::{Deserialize, Serialize};

use crate::error::DevRegError;

/// Endpoint set for a particular identity provider.
///
/// Nested into serialized request records under the `configuration` key, so
/// a persisted request can be resumed without re-discovering the provider.
///
/// # Example
/// ```
/// use devreg::ServiceConfig;
///
/// let config = ServiceConfig::new(
///     "https://idp.example.com/authorize",
///     "https://idp.example.com/token",
///     "https://idp.example.com/register",
/// );
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub registration_endpoint: String,
}

impl ServiceConfig {
    pub fn new(
        authorization_endpoint: impl Into<String>,
        token_endpoint: impl Into<String>,
        registration_endpoint: impl Into<String>,
    ) -> Self {
        Self {
            authorization_endpoint: authorization_endpoint.into(),
            token_endpoint: token_endpoint.into(),
            registration_endpoint: registration_endpoint.into(),
        }
    }

    /// Reject configurations with empty endpoints.
    pub fn validate(&self) -> Result<(), DevRegError> {
        if self.authorization_endpoint.is_empty() {
            return Err(DevRegError::MissingField("authorization_endpoint"));
        }
        if self.token_endpoint.is_empty() {
            return Err(DevRegError::MissingField("token_endpoint"));
        }
        if self.registration_endpoint.is_empty() {
            return Err(DevRegError::MissingField("registration_endpoint"));
        }
        Ok(())
    }
}
