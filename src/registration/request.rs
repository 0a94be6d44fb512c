use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::config::ServiceConfig;
use crate::error::DevRegError;
use crate::uri;

/// Instructs the registration endpoint to return an authorization code.
pub const RESPONSE_TYPE_CODE: &str = "code";

/// Instructs the registration endpoint to register the device.
pub const TYPE_REGISTER: &str = "register";

const STATE_LENGTH: usize = 16;

/// Inputs for [`DeviceRegistrationRequest::new`].
///
/// `scope` is optional; `state` exists only to pin the token for
/// deterministic tests and should normally be left unset so a fresh random
/// token is generated.
#[derive(Debug, Clone, Builder)]
#[builder(on(String, into))]
pub struct RegistrationParams {
    pub configuration: ServiceConfig,
    pub redirect_uri: String,
    pub device_name: String,
    pub user_device: String,
    pub app_product_id: String,
    pub activation_endpoint: String,
    pub scope: Option<String>,
    pub state: Option<String>,
}

/// A device registration request, dispatched to the provider's registration
/// endpoint via an external browser/redirect mechanism.
///
/// Immutable once built. The JSON representation round-trips losslessly
/// (including the nested configuration) so an in-flight request can cross a
/// process boundary or survive a resume.
///
/// # Example
/// ```
/// use devreg::{DeviceRegistrationRequest, RegistrationParams, ServiceConfig};
///
/// let params = RegistrationParams::builder()
///     .configuration(ServiceConfig::new(
///         "https://idp.example.com/authorize",
///         "https://idp.example.com/token",
///         "https://idp.example.com/register",
///     ))
///     .redirect_uri("test://my-redirect-uri")
///     .device_name("device name")
///     .user_device("{ \"info\" : \"user_device\" }")
///     .app_product_id("app_template")
///     .activation_endpoint("https://idp.example.com/activate")
///     .build();
/// let request = DeviceRegistrationRequest::new(params)?;
/// assert!(request.request_uri().starts_with("https://idp.example.com/register?"));
/// # Ok::<(), devreg::DevRegError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRegistrationRequest {
    pub configuration: ServiceConfig,
    pub redirect_uri: String,
    #[serde(rename = "activation_uri")]
    pub activation_endpoint: String,
    pub app_product_id: String,
    pub device_name: String,
    pub user_device: String,
    pub response_type: String,
    #[serde(rename = "type")]
    pub register_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl DeviceRegistrationRequest {
    /// Build a request, validating every required field and generating a
    /// fresh random state token unless one was pinned in the params.
    pub fn new(params: RegistrationParams) -> Result<Self, DevRegError> {
        let state = params
            .state
            .filter(|s| !s.is_empty())
            .unwrap_or_else(generate_state_token);
        let request = Self {
            configuration: params.configuration,
            redirect_uri: params.redirect_uri,
            activation_endpoint: params.activation_endpoint,
            app_product_id: params.app_product_id,
            device_name: params.device_name,
            user_device: params.user_device,
            response_type: RESPONSE_TYPE_CODE.to_string(),
            register_type: TYPE_REGISTER.to_string(),
            scope: params.scope.filter(|s| !s.is_empty()),
            state: Some(state),
        };
        request.validate()?;
        Ok(request)
    }

    fn validate(&self) -> Result<(), DevRegError> {
        self.configuration.validate()?;
        if self.redirect_uri.is_empty() {
            return Err(DevRegError::MissingField("redirect_uri"));
        }
        if self.device_name.is_empty() {
            return Err(DevRegError::MissingField("device_name"));
        }
        if self.user_device.is_empty() {
            return Err(DevRegError::MissingField("user_device"));
        }
        if self.app_product_id.is_empty() {
            return Err(DevRegError::MissingField("app_product_id"));
        }
        if self.activation_endpoint.is_empty() {
            return Err(DevRegError::MissingField("activation_uri"));
        }
        Ok(())
    }

    /// Produce the request URI to hand to the external redirect mechanism.
    ///
    /// Parameter order is fixed and every value is percent-encoded; the
    /// provider's registration endpoint depends on both.
    pub fn request_uri(&self) -> String {
        let mut out = format!(
            "{}?redirect_uri={}&app_product_id={}&device_name={}&user_device={}&response_type={}&type={}",
            self.configuration.registration_endpoint,
            uri::encode(&self.redirect_uri),
            uri::encode(&self.app_product_id),
            uri::encode(&self.device_name),
            uri::encode(&self.user_device),
            self.response_type,
            self.register_type,
        );
        if let Some(state) = &self.state {
            out.push_str("&state=");
            out.push_str(&uri::encode(state));
        }
        if let Some(scope) = &self.scope {
            out.push_str("&scope=");
            out.push_str(&uri::encode(scope));
        }
        out
    }

    /// Serialize for persistent storage or local transmission.
    pub fn to_json_string(&self) -> Result<String, DevRegError> {
        serde_json::to_string(self).map_err(|e| DevRegError::Serialization(e.to_string()))
    }

    /// Restore a request produced by [`to_json_string`](Self::to_json_string),
    /// re-validating required fields.
    pub fn from_json_string(raw: &str) -> Result<Self, DevRegError> {
        let request: Self = serde_json::from_str(raw)?;
        request.validate()?;
        Ok(request)
    }
}

/// Generate a random state token: 16 cryptographically random bytes,
/// URL-safe base64 without padding.
pub fn generate_state_token() -> String {
    let bytes: [u8; STATE_LENGTH] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}
