//! Integration tests for OAuth client-credentials mode

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use armory_client::{ArmoryError, RegionalApiClient};
use common::{Fixture, OAUTH_CONFIG, REGIONS};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mock_token(server: &MockServer, body: serde_json::Value, expected: u64) {
    Mock::given(method("POST"))
        .and(path("/eu/oauth/token"))
        .and(header_exists("authorization"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expected)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_token_fetched_for_every_request() {
    let server = MockServer::start().await;
    mock_token(&server, json!({"access_token": "tok", "expires_in": 86399}), 2).await;
    Mock::given(method("GET"))
        .and(path("/eu/wow/spell/133"))
        .and(query_param("access_token", "tok"))
        .and(query_param("locale", "en_US"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 133})))
        .expect(2)
        .mount(&server)
        .await;

    let fixture = Fixture::new(&server.uri(), OAUTH_CONFIG, REGIONS);
    let client = fixture.client().await;

    for _ in 0..2 {
        assert_eq!(client.spell(133).await.unwrap(), json!({"id": 133}));
    }

    let requests = server.received_requests().await.unwrap();
    let methods: Vec<_> = requests.iter().map(|r| r.method.to_string()).collect();
    assert_eq!(methods, vec!["POST", "GET", "POST", "GET"]);
}

#[tokio::test]
async fn test_realm_refresh_with_token() {
    let server = MockServer::start().await;
    mock_token(&server, json!({"access_token": "tok"}), 1).await;
    Mock::given(method("GET"))
        .and(path("/eu/wow/realm/status"))
        .and(query_param("access_token", "tok"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"realms": [{"slug": "kazzak", "name": "Kazzak"}]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let fixture = Fixture::new(&server.uri(), OAUTH_CONFIG, REGIONS);
    let mut client = fixture.client().await;

    let realms = client.realms(true).await.unwrap();
    assert_eq!(realms.get("kazzak").map(String::as_str), Some("Kazzak"));
}

#[tokio::test]
async fn test_missing_access_token_fails_before_api_call() {
    let server = MockServer::start().await;
    mock_token(&server, json!({"token_type": "bearer"}), 1).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let fixture = Fixture::new(&server.uri(), OAUTH_CONFIG, REGIONS);
    let client = fixture.client().await;

    let err = client.spell(133).await.unwrap_err();
    assert!(matches!(err, ArmoryError::Authentication(_)));
}

#[tokio::test]
async fn test_rejected_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/eu/oauth/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "invalid_client"})))
        .mount(&server)
        .await;

    let fixture = Fixture::new(&server.uri(), OAUTH_CONFIG, REGIONS);
    let client = fixture.client().await;

    let err = client.character("Thrall", "draenor").await.unwrap_err();
    assert!(matches!(err, ArmoryError::Authentication(_)));
    assert!(!fixture.config.characters_dir.join("eu-draenor").join("Thrall.json").exists());
}

#[tokio::test]
async fn test_partial_oauth_config_is_rejected() {
    let server = MockServer::start().await;
    let fixture = Fixture::new(&server.uri(), r#"{"key": "k3y", "clientSecret": "s"}"#, REGIONS);

    let err = RegionalApiClient::new(fixture.config.clone()).await.err().unwrap();
    assert!(err.is_config());
}

#[tokio::test]
async fn test_icon_download_needs_no_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "tok"})))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/eu/icons/36/spell_nature_heal.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpeg".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let fixture = Fixture::new(&server.uri(), OAUTH_CONFIG, REGIONS);
    let client = fixture.client().await;

    let options = armory_client::IconOptions::default().with_download(true);
    let path = client.icon_image_path("spell_nature_heal", &options).await.unwrap();
    assert_eq!(
        path,
        Some(fixture.config.icons_dir.join("36").join("spell_nature_heal.jpg"))
    );
}
