use serde::{Deserialize, Serialize};

use crate::config::ServiceConfig;
use crate::error::DevRegError;

/// Request to activate the device in exchange for the activation code,
/// yielding a unique (client id, client secret) pair.
///
/// Immutable; derived from a successful
/// [`DeviceRegistrationResponse`](crate::DeviceRegistrationResponse).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceActivationRequest {
    pub configuration: ServiceConfig,
    #[serde(rename = "endpoint")]
    pub activation_endpoint: String,
    pub activation_code: String,
}

impl DeviceActivationRequest {
    pub fn new(
        configuration: ServiceConfig,
        activation_endpoint: impl Into<String>,
        activation_code: impl Into<String>,
    ) -> Self {
        Self {
            configuration,
            activation_endpoint: activation_endpoint.into(),
            activation_code: activation_code.into(),
        }
    }

    /// Serialize for persistent storage or local transmission.
    pub fn to_json_string(&self) -> Result<String, DevRegError> {
        serde_json::to_string(self).map_err(|e| DevRegError::Serialization(e.to_string()))
    }

    /// Restore a request produced by [`to_json_string`](Self::to_json_string).
    pub fn from_json_string(raw: &str) -> Result<Self, DevRegError> {
        Ok(serde_json::from_str(raw)?)
    }
}
