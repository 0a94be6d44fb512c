use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Token payload produced by the external standard OAuth2 token exchange.
///
/// This crate never mints one itself; a [`TokenExchanger`](crate::flow::TokenExchanger)
/// implementation returns it after redeeming the authorization outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub id_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub scope: Option<String>,
}
