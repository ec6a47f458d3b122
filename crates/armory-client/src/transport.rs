//! HTTP transport setup

use reqwest::{Client, ClientBuilder};
use std::sync::Once;

use crate::config::ClientConfig;
use crate::error::Result;

static CRYPTO_PROVIDER: Once = Once::new();

/// Install the ring crypto provider for rustls (idempotent)
pub fn ensure_crypto_provider() {
    CRYPTO_PROVIDER.call_once(|| {
        // Another component may already have installed a provider
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Build the HTTP client used for API, token and icon requests
pub fn build_http_client(config: &ClientConfig) -> Result<Client> {
    ensure_crypto_provider();
    ClientBuilder::new()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .user_agent(config.user_agent.as_str())
        .build()
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(&ClientConfig::default()).is_ok());
        // second call must not try to reinstall the provider
        assert!(build_http_client(&ClientConfig::default()).is_ok());
    }
}
