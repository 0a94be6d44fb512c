//! Integration tests for the activation exchange: wire shape of the POST
//! and classification of failures into network vs deserialization errors.

use pretty_assertions::assert_eq;
use wiremock::matchers::{body_string, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use devreg::{ActivationClient, DevRegError, DeviceActivationRequest, ServiceConfig};

const ACTIVATION_CODE: &str = "act-1";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn test_config() -> ServiceConfig {
    ServiceConfig::new(
        "https://idp.example.com/authorize",
        "https://idp.example.com/token",
        "https://idp.example.com/register",
    )
}

fn activation_request(endpoint: &str) -> DeviceActivationRequest {
    DeviceActivationRequest::new(test_config(), endpoint, ACTIVATION_CODE)
}

async fn server_returning(template: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/activate"))
        .respond_with(template)
        .mount(&server)
        .await;
    server
}

// ---------------------------------------------------------------------------
// 1. Success and wire shape
// ---------------------------------------------------------------------------

#[tokio::test]
async fn exchange_posts_raw_activation_code_body() {
    let server = MockServer::start().await;
    // The body must be the bare activation code, not a form field.
    Mock::given(method("POST"))
        .and(path("/activate"))
        .and(body_string(ACTIVATION_CODE))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "{\"client_id\":\"c1\",\"client_secret\":\"s1\"}",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let request = activation_request(&format!("{}/activate", server.uri()));
    let response = ActivationClient::new().exchange(&request).await.unwrap();
    assert_eq!(response.client_id, "c1");
    assert_eq!(response.client_secret.as_deref(), Some("s1"));
    assert_eq!(response.request, request);
}

#[tokio::test]
async fn exchange_tolerates_missing_client_secret() {
    let server =
        server_returning(ResponseTemplate::new(200).set_body_string("{\"client_id\":\"c1\"}"))
            .await;
    let request = activation_request(&format!("{}/activate", server.uri()));
    let response = ActivationClient::new().exchange(&request).await.unwrap();
    assert_eq!(response.client_id, "c1");
    assert_eq!(response.client_secret, None);
}

// ---------------------------------------------------------------------------
// 2. Failure classification
// ---------------------------------------------------------------------------

#[tokio::test]
async fn transport_failure_is_a_network_error() {
    // Nothing listens here; the connection is refused.
    let request = activation_request("http://127.0.0.1:1/activate");
    match ActivationClient::new().exchange(&request).await {
        Err(DevRegError::Network(_)) => {}
        other => panic!("expected Network, got {other:?}"),
    }
}

#[tokio::test]
async fn error_status_is_a_network_error() {
    let server = server_returning(ResponseTemplate::new(500)).await;
    let request = activation_request(&format!("{}/activate", server.uri()));
    match ActivationClient::new().exchange(&request).await {
        Err(DevRegError::Network(message)) => assert!(message.contains("500")),
        other => panic!("expected Network, got {other:?}"),
    }
}

#[tokio::test]
async fn truncated_json_body_is_a_deserialization_error() {
    let server = server_returning(ResponseTemplate::new(200).set_body_string("{")).await;
    let request = activation_request(&format!("{}/activate", server.uri()));
    assert!(matches!(
        ActivationClient::new().exchange(&request).await,
        Err(DevRegError::Deserialization(_))
    ));
}

#[tokio::test]
async fn body_without_client_id_is_a_deserialization_error() {
    let server =
        server_returning(ResponseTemplate::new(200).set_body_string("{\"foo\":\"bar\"}")).await;
    let request = activation_request(&format!("{}/activate", server.uri()));
    assert!(matches!(
        ActivationClient::new().exchange(&request).await,
        Err(DevRegError::Deserialization(_))
    ));
}

#[tokio::test]
async fn empty_client_id_is_a_deserialization_error() {
    let server =
        server_returning(ResponseTemplate::new(200).set_body_string("{\"client_id\":\"\"}")).await;
    let request = activation_request(&format!("{}/activate", server.uri()));
    assert!(matches!(
        ActivationClient::new().exchange(&request).await,
        Err(DevRegError::Deserialization(_))
    ));
}

// ---------------------------------------------------------------------------
// 3. Request record round-trip
// ---------------------------------------------------------------------------

#[tokio::test]
async fn activation_request_json_round_trip() {
    let request = activation_request("https://idp.example.com/activate");
    let raw = request.to_json_string().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["endpoint"], "https://idp.example.com/activate");
    assert_eq!(value["activation_code"], ACTIVATION_CODE);
    assert_eq!(
        value["configuration"]["token_endpoint"],
        "https://idp.example.com/token"
    );
    let restored = DeviceActivationRequest::from_json_string(&raw).unwrap();
    assert_eq!(restored, request);
}
