//! Activation-code exchange: redeem the code for per-device client
//! credentials.

pub mod client;
pub mod request;

pub use client::{ActivationClient, DeviceActivationResponse};
pub use request::DeviceActivationRequest;
