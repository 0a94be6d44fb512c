//! End-to-end orchestration of the device registration flow.

use std::sync::Arc;

use async_trait::async_trait;
use strum::Display;
use tokio::sync::oneshot;

use crate::activation::{ActivationClient, DeviceActivationResponse};
use crate::config::ServiceConfig;
use crate::correlation::CorrelationStore;
use crate::error::DevRegError;
use crate::grant::TokenGrant;
use crate::registration::request::{DeviceRegistrationRequest, RegistrationParams};
use crate::registration::response::{AuthorizationOutcome, DeviceRegistrationResponse};
use crate::uri;

/// Result-delivery handle stored per pending correlation. The redirect
/// receiver sends the parsed response through it exactly once.
pub type ResponseHandle = oneshot::Sender<DeviceRegistrationResponse>;

/// States of a single registration flow. Transitions are logged; the
/// terminal outcome is the `Result` returned by
/// [`DeviceRegistrationFlow::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum FlowState {
    Idle,
    RequestBuilt,
    Dispatched,
    Correlated,
    Activating,
    Activated,
    ActivationFailed,
    TokenExchanging,
    Complete,
    Failed,
}

/// What became of a redirect callback handed to
/// [`DeviceRegistrationFlow::handle_redirect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectDisposition {
    /// Response delivered to the waiting flow.
    Delivered,
    /// No pending correlation for the callback's state token; the callback
    /// was dropped. This is also the answer for a replayed callback.
    UnknownState,
    /// A correlation existed but its flow had already given up waiting.
    ReceiverGone,
}

/// External mechanism that presents the registration request URI to the
/// user, typically by opening a browser. Dispatch is fire-and-forget; the
/// answer arrives later as a redirect callback.
pub trait RedirectDispatcher: Send + Sync {
    fn dispatch(&self, request_uri: &str) -> Result<(), DevRegError>;
}

/// External standard OAuth2 token-exchange capability. This crate only
/// produces the [`AuthorizationOutcome`]; redeeming it for tokens is the
/// implementor's business.
#[async_trait]
pub trait TokenExchanger: Send + Sync {
    async fn exchange_code(
        &self,
        outcome: &AuthorizationOutcome,
        config: &ServiceConfig,
    ) -> Result<TokenGrant, DevRegError>;
}

/// Sequences the full flow: build request, correlate, dispatch, await the
/// redirect, exchange the activation code, and hand the reconstructed
/// authorization outcome to the external token exchange.
///
/// One `run` per sign-in attempt; concurrent attempts share only the
/// correlation store's per-key atomicity. Nothing retries: any failure is
/// terminal for the attempt and the caller restarts from idle.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use devreg::{
///     ActivationClient, CorrelationStore, DeviceRegistrationFlow, RegistrationParams,
///     ServiceConfig,
/// };
/// # use devreg::{AuthorizationOutcome, DevRegError, RedirectDispatcher, TokenExchanger, TokenGrant};
/// # struct Browser;
/// # impl RedirectDispatcher for Browser {
/// #     fn dispatch(&self, _uri: &str) -> Result<(), DevRegError> { Ok(()) }
/// # }
/// # struct Exchanger;
/// # #[async_trait::async_trait]
/// # impl TokenExchanger for Exchanger {
/// #     async fn exchange_code(
/// #         &self,
/// #         _outcome: &AuthorizationOutcome,
/// #         _config: &ServiceConfig,
/// #     ) -> Result<TokenGrant, DevRegError> { unimplemented!() }
/// # }
///
/// # async fn example() -> Result<(), devreg::DevRegError> {
/// let flow = Arc::new(DeviceRegistrationFlow::new(
///     Arc::new(CorrelationStore::new()),
///     ActivationClient::new(),
///     Arc::new(Browser),
///     Arc::new(Exchanger),
/// ));
///
/// let params = RegistrationParams::builder()
///     .configuration(ServiceConfig::new(
///         "https://idp.example.com/authorize",
///         "https://idp.example.com/token",
///         "https://idp.example.com/register",
///     ))
///     .redirect_uri("test://my-redirect-uri")
///     .device_name("my device")
///     .user_device("{\"os\":\"linux\"}")
///     .app_product_id("app_template")
///     .activation_endpoint("https://idp.example.com/activate")
///     .build();
///
/// // Elsewhere, the redirect receiver calls flow.handle_redirect(raw_uri).
/// let grant = flow.run(params).await?;
/// println!("access token: {}", grant.access_token);
/// # Ok(())
/// # }
/// ```
pub struct DeviceRegistrationFlow {
    correlations: Arc<CorrelationStore<ResponseHandle>>,
    activation: ActivationClient,
    dispatcher: Arc<dyn RedirectDispatcher>,
    token_exchanger: Arc<dyn TokenExchanger>,
}

impl DeviceRegistrationFlow {
    pub fn new(
        correlations: Arc<CorrelationStore<ResponseHandle>>,
        activation: ActivationClient,
        dispatcher: Arc<dyn RedirectDispatcher>,
        token_exchanger: Arc<dyn TokenExchanger>,
    ) -> Self {
        Self {
            correlations,
            activation,
            dispatcher,
            token_exchanger,
        }
    }

    /// The shared correlation store, e.g. for periodic
    /// [`sweep_expired`](CorrelationStore::sweep_expired) calls.
    pub fn correlations(&self) -> &Arc<CorrelationStore<ResponseHandle>> {
        &self.correlations
    }

    /// Run one sign-in attempt end to end.
    pub async fn run(&self, params: RegistrationParams) -> Result<TokenGrant, DevRegError> {
        let request = DeviceRegistrationRequest::new(params)?;
        let mut state = advance(FlowState::Idle, FlowState::RequestBuilt);

        // `new` always sets a state token; a missing one here is a bug.
        let token = request
            .state
            .clone()
            .ok_or(DevRegError::MissingField("state"))?;
        let (sender, receiver) = oneshot::channel();
        self.correlations.put(token.clone(), request.clone(), sender);

        if let Err(err) = self.dispatcher.dispatch(&request.request_uri()) {
            // The entry would never be answered; reclaim it now.
            let _ = self.correlations.take_request(&token);
            let _ = self.correlations.take_result_handle(&token);
            advance(state, FlowState::Failed);
            return Err(err);
        }
        state = advance(state, FlowState::Dispatched);

        let response = match receiver.await {
            Ok(response) => response,
            Err(_) => {
                // Sender dropped: the correlation was swept or cleared.
                advance(state, FlowState::Failed);
                return Err(DevRegError::FlowAbandoned);
            }
        };
        state = advance(state, FlowState::Correlated);

        let activation_request =
            match response.to_activation_request(request.activation_endpoint.clone()) {
                Ok(activation_request) => activation_request,
                Err(err) => {
                    advance(state, FlowState::ActivationFailed);
                    return Err(err);
                }
            };
        state = advance(state, FlowState::Activating);

        let activation: DeviceActivationResponse =
            match self.activation.exchange(&activation_request).await {
                Ok(activation) => activation,
                Err(err) => {
                    advance(state, FlowState::ActivationFailed);
                    return Err(err);
                }
            };
        state = advance(state, FlowState::Activated);

        let outcome = response.to_authorization_outcome(&activation.client_id)?;
        state = advance(state, FlowState::TokenExchanging);

        match self
            .token_exchanger
            .exchange_code(&outcome, &request.configuration)
            .await
        {
            Ok(grant) => {
                advance(state, FlowState::Complete);
                Ok(grant)
            }
            Err(err) => {
                advance(state, FlowState::Failed);
                Err(err)
            }
        }
    }

    /// Handle a raw redirect callback URI from the external redirect
    /// mechanism.
    ///
    /// Correlation is the enforcement point for state matching: the callback
    /// is only acted upon if a pending entry for its state token exists, and
    /// consuming the entry makes replay a no-op. An unmatched callback is
    /// dropped with a log line and the flow for that token simply never
    /// progresses.
    pub fn handle_redirect(&self, redirect_uri: &str) -> RedirectDisposition {
        let token = match uri::query_param(redirect_uri, "state") {
            Some(token) if !token.is_empty() => token,
            _ => {
                tracing::warn!("redirect received without a state parameter");
                return RedirectDisposition::UnknownState;
            }
        };
        let Some(request) = self.correlations.take_request(&token) else {
            tracing::warn!(
                state = %token,
                "redirect received for unknown device registration request"
            );
            return RedirectDisposition::UnknownState;
        };
        let response = DeviceRegistrationResponse::from_redirect_uri(request, redirect_uri);
        let Some(handle) = self.correlations.take_result_handle(&token) else {
            tracing::warn!(state = %token, "pending correlation lost its result handle");
            return RedirectDisposition::UnknownState;
        };
        match handle.send(response) {
            Ok(()) => {
                tracing::debug!(state = %token, "redirect delivered to waiting flow");
                RedirectDisposition::Delivered
            }
            Err(_) => {
                tracing::warn!(state = %token, "flow stopped waiting before the redirect arrived");
                RedirectDisposition::ReceiverGone
            }
        }
    }
}

fn advance(from: FlowState, to: FlowState) -> FlowState {
    tracing::debug!(%from, %to, "flow transition");
    to
}
