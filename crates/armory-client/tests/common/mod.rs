//! Shared fixtures for client integration tests

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use armory_client::{ClientConfig, ManualClock, RegionalApiClient};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

pub const API_KEY_CONFIG: &str = r#"{"key": "k3y"}"#;
pub const OAUTH_CONFIG: &str = r#"{"clientKey": "client-id", "clientSecret": "client-secret"}"#;

pub const REGIONS: &str = r#"{
    "eu": {"name": "Europe", "realms": {"draenor": "Draenor"}},
    "us": {"name": "Americas"}
}"#;

/// Start of the test clock
pub const T0: u64 = 1_700_000_000;

/// Temporary file layout pointed at a mock server
pub struct Fixture {
    pub dir: TempDir,
    pub config: ClientConfig,
    pub clock: ManualClock,
}

impl Fixture {
    pub fn new(server_uri: &str, credentials: &str, regions: &str) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let root = dir.path();

        std::fs::write(root.join("config.json"), credentials).unwrap();
        std::fs::write(root.join("regions.json"), regions).unwrap();

        let config = ClientConfig {
            config_file: root.join("config.json"),
            regions_file: root.join("regions.json"),
            characters_dir: root.join("characters"),
            icons_dir: root.join("icons"),
            api_host: format!("{server_uri}/{{region}}"),
            token_host: format!("{server_uri}/{{region}}"),
            icon_host: format!("{server_uri}/{{region}}"),
            ..ClientConfig::default()
        };

        Self {
            dir,
            config,
            clock: ManualClock::new(T0),
        }
    }

    pub async fn client(&self) -> RegionalApiClient {
        RegionalApiClient::with_clock(self.config.clone(), Arc::new(self.clock.clone()))
            .await
            .expect("client construction")
    }

    pub fn regions_file(&self) -> PathBuf {
        self.config.regions_file.clone()
    }
}
