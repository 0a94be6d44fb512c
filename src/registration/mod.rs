//! Device registration request construction and redirect response parsing.

pub mod request;
pub mod response;

pub use request::{generate_state_token, DeviceRegistrationRequest, RegistrationParams};
pub use response::{AuthorizationOutcome, DeviceRegistrationResponse};
