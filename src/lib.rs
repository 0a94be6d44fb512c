//! devreg — dynamic device registration for OAuth2/OIDC authorization-code
//! flows.
//!
//! Some identity providers extend the standard authorization-code flow with
//! a per-device registration step: the client sends the user to a
//! registration endpoint, the consent redirect carries back an *activation
//! code*, and redeeming that code issues a unique (client id, client secret)
//! pair for the device. Only then does the ordinary code-for-token exchange
//! happen, using the freshly issued client id.
//!
//! This crate implements that activation/registration state machine:
//! request construction ([`DeviceRegistrationRequest`]), redirect
//! correlation ([`CorrelationStore`]), response parsing
//! ([`DeviceRegistrationResponse`]), the activation exchange
//! ([`ActivationClient`]), and the orchestrator tying them together
//! ([`DeviceRegistrationFlow`]). Browser launching and the standard OAuth2
//! token exchange stay outside, behind the [`RedirectDispatcher`] and
//! [`TokenExchanger`] traits.
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use devreg::{ActivationClient, CorrelationStore, DeviceRegistrationFlow};
//! # use devreg::{AuthorizationOutcome, DevRegError, RedirectDispatcher, ServiceConfig,
//! #     TokenExchanger, TokenGrant};
//! # struct Browser;
//! # impl RedirectDispatcher for Browser {
//! #     fn dispatch(&self, _uri: &str) -> Result<(), DevRegError> { Ok(()) }
//! # }
//! # struct Exchanger;
//! # #[async_trait::async_trait]
//! # impl TokenExchanger for Exchanger {
//! #     async fn exchange_code(
//! #         &self,
//! #         _outcome: &AuthorizationOutcome,
//! #         _config: &ServiceConfig,
//! #     ) -> Result<TokenGrant, DevRegError> { unimplemented!() }
//! # }
//!
//! let flow = DeviceRegistrationFlow::new(
//!     Arc::new(CorrelationStore::new()),
//!     ActivationClient::new(),
//!     Arc::new(Browser),
//!     Arc::new(Exchanger),
//! );
//! ```

pub mod activation;
pub mod config;
pub mod correlation;
pub mod error;
pub mod flow;
pub mod grant;
pub mod registration;
mod uri;

pub use activation::{ActivationClient, DeviceActivationRequest, DeviceActivationResponse};
pub use config::ServiceConfig;
pub use correlation::CorrelationStore;
pub use error::DevRegError;
pub use flow::{
    DeviceRegistrationFlow, FlowState, RedirectDispatcher, RedirectDisposition, ResponseHandle,
    TokenExchanger,
};
pub use grant::TokenGrant;
pub use registration::{
    generate_state_token, AuthorizationOutcome, DeviceRegistrationRequest,
    DeviceRegistrationResponse, RegistrationParams,
};
