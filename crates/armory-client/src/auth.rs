//! OAuth client-credentials token exchange
//!
//! Tokens are not cached: every API call in OAuth mode performs a fresh
//! exchange before its own request.

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::{ArmoryError, Result};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Exchange a client key and secret for a bearer token
pub async fn fetch_access_token(
    http: &Client,
    token_url: &str,
    client_key: &str,
    client_secret: &str,
) -> Result<String> {
    debug!("Requesting access token from {token_url}");

    let response = http
        .post(token_url)
        .basic_auth(client_key, Some(client_secret))
        .form(&[("grant_type", "client_credentials")])
        .send()
        .await?;

    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        return Err(ArmoryError::Authentication(format!(
            "token endpoint returned {status}"
        )));
    }

    serde_json::from_slice::<TokenResponse>(&body)
        .ok()
        .and_then(|t| t.access_token)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            ArmoryError::Authentication("token response has no access_token".to_string())
        })
}
