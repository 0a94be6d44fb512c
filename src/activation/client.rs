use reqwest::header::CONTENT_LENGTH;
use serde::Deserialize;

use crate::activation::request::DeviceActivationRequest;
use crate::error::DevRegError;

/// HTTP client for the activation-code exchange.
///
/// The exchange is a single POST whose body is the raw activation code
/// string. The provider does not accept form encoding here; the body must be
/// reproduced bit-for-bit. There is no retry policy: every failure is
/// terminal for the attempt and the caller re-initiates from scratch.
///
/// # Example
/// ```no_run
/// use devreg::{ActivationClient, DeviceActivationRequest, ServiceConfig};
///
/// # async fn example() -> Result<(), devreg::DevRegError> {
/// let client = ActivationClient::new();
/// let request = DeviceActivationRequest::new(
///     ServiceConfig::new(
///         "https://idp.example.com/authorize",
///         "https://idp.example.com/token",
///         "https://idp.example.com/register",
///     ),
///     "https://idp.example.com/activate",
///     "activation-code",
/// );
/// let response = client.exchange(&request).await?;
/// println!("client_id = {}", response.client_id);
/// # Ok(())
/// # }
/// ```
pub struct ActivationClient {
    client: reqwest::Client,
}

impl ActivationClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Use a preconfigured `reqwest` client (timeouts, proxies, TLS).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Exchange the activation code for client credentials.
    ///
    /// Classification: transport failures and non-success statuses map to
    /// [`DevRegError::Network`]; a body that is not a JSON object, or one
    /// missing a usable `client_id`, maps to
    /// [`DevRegError::Deserialization`]. `client_secret` is optional
    /// (public clients).
    pub async fn exchange(
        &self,
        request: &DeviceActivationRequest,
    ) -> Result<DeviceActivationResponse, DevRegError> {
        tracing::debug!(
            endpoint = %request.activation_endpoint,
            "exchanging activation code"
        );
        let response = self
            .client
            .post(&request.activation_endpoint)
            .header(CONTENT_LENGTH, request.activation_code.len())
            .body(request.activation_code.clone())
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DevRegError::Network(format!(
                "activation request failed with status {status}"
            )));
        }
        let body = response.bytes().await?;
        let payload: ActivationPayload = serde_json::from_slice(&body)?;
        if payload.client_id.is_empty() {
            return Err(DevRegError::Deserialization(
                "client_id cannot be null or empty".to_string(),
            ));
        }
        tracing::debug!(client_id = %payload.client_id, "device activation completed");
        Ok(DeviceActivationResponse {
            request: request.clone(),
            client_id: payload.client_id,
            client_secret: payload.client_secret,
        })
    }
}

impl Default for ActivationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct ActivationPayload {
    client_id: String,
    client_secret: Option<String>,
}

/// Successful outcome of the activation exchange, paired with its
/// originating request so the caller can rebuild a standard registration
/// response shape downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceActivationResponse {
    pub request: DeviceActivationRequest,
    pub client_id: String,
    pub client_secret: Option<String>,
}
