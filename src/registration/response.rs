use serde::{Deserialize, Serialize};

use crate::activation::DeviceActivationRequest;
use crate::error::DevRegError;
use crate::registration::request::DeviceRegistrationRequest;
use crate::uri;

/// The parsed redirect callback for a device registration request.
///
/// All three parameters are optional on the wire: a user who cancels at the
/// consent screen produces a redirect with none of them, which is a valid
/// (if fruitless) response, not a parse error. State matching is not
/// enforced here; the correlation store's keyed take is the enforcement
/// point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRegistrationResponse {
    /// The originating request, carried so the response alone is enough to
    /// resume the flow after a process boundary.
    pub request: DeviceRegistrationRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activation_code: Option<String>,
    #[serde(rename = "code", skip_serializing_if = "Option::is_none")]
    pub authorization_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl DeviceRegistrationResponse {
    /// Parse the raw redirect URI received from the external redirect
    /// mechanism. Accepts `code` with `authorization_code` as a fallback
    /// name.
    pub fn from_redirect_uri(request: DeviceRegistrationRequest, redirect_uri: &str) -> Self {
        let state = uri::query_param(redirect_uri, "state");
        let activation_code = uri::query_param(redirect_uri, "activation_code");
        let authorization_code = uri::query_param(redirect_uri, "code")
            .or_else(|| uri::query_param(redirect_uri, "authorization_code"));
        Self {
            request,
            activation_code,
            authorization_code,
            state,
        }
    }

    /// Derive the activation exchange request for this response.
    ///
    /// Fails with [`DevRegError::MissingActivationCode`] when the redirect
    /// carried no activation code; no network activity is attempted.
    pub fn to_activation_request(
        &self,
        activation_endpoint: impl Into<String>,
    ) -> Result<DeviceActivationRequest, DevRegError> {
        let code = self
            .activation_code
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or(DevRegError::MissingActivationCode)?;
        Ok(DeviceActivationRequest::new(
            self.request.configuration.clone(),
            activation_endpoint,
            code,
        ))
    }

    /// Reconstruct the standard OAuth2 authorization outcome once activation
    /// has issued a client id.
    pub fn to_authorization_outcome(
        &self,
        client_id: &str,
    ) -> Result<AuthorizationOutcome, DevRegError> {
        if client_id.is_empty() {
            return Err(DevRegError::MissingClientId);
        }
        Ok(AuthorizationOutcome {
            client_id: client_id.to_string(),
            authorization_code: self.authorization_code.clone(),
            redirect_uri: self.request.redirect_uri.clone(),
            scope: self.request.scope.clone(),
        })
    }

    /// Serialize for transport across a process boundary, nesting the
    /// originating request.
    pub fn to_json_string(&self) -> Result<String, DevRegError> {
        serde_json::to_string(self).map_err(|e| DevRegError::Serialization(e.to_string()))
    }

    /// Restore a response produced by [`to_json_string`](Self::to_json_string).
    pub fn from_json_string(raw: &str) -> Result<Self, DevRegError> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// The reconstructed standard OAuth2 authorization-code result, handed to
/// the external token-exchange capability. Derived, never persisted on its
/// own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationOutcome {
    pub client_id: String,
    pub authorization_code: Option<String>,
    pub redirect_uri: String,
    pub scope: Option<String>,
}
