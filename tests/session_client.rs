use std::sync::Arc;
use std::time::Duration;

use rate_gate::session::{SessionValidationResponse, ThrottledSessionClient, UserSessionClient, DEFAULT_BASE_URL};
use rate_gate::{Bandwidth, GateConfig, GateError, SessionError, TokenBucketGate};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SESSION_ID: &str = "828bc3cb-52f0-482b-8247-d3db5c87c941";

fn session_id() -> Uuid {
    Uuid::parse_str(SESSION_ID).unwrap()
}

async fn mock_session_service(expected_calls: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user-sessions/validate"))
        .and(query_param("sessionId", SESSION_ID))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "sessionId": SESSION_ID, "valid": true }))
                .set_delay(Duration::from_millis(10)),
        )
        .expect(expected_calls)
        .mount(&server)
        .await;
    server
}

#[test]
fn response_uses_camel_case_fields() {
    let response: SessionValidationResponse =
        serde_json::from_str(r#"{ "sessionId": "abc", "valid": false }"#).unwrap();
    assert_eq!(
        response,
        SessionValidationResponse {
            session_id: "abc".to_string(),
            valid: false,
        }
    );
}

#[test]
fn base_url_is_normalized() {
    let client = UserSessionClient::new("http://localhost:8081/").unwrap();
    assert_eq!(client.base_url(), DEFAULT_BASE_URL);
}

#[tokio::test(flavor = "multi_thread")]
async fn validate_session_decodes_response() {
    let server = mock_session_service(1).await;
    let base_url = server.uri();

    let response = tokio::task::spawn_blocking(move || {
        UserSessionClient::new(base_url)?.validate_session(session_id())
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(response.session_id, SESSION_ID);
    assert!(response.valid);
}

#[tokio::test(flavor = "multi_thread")]
async fn error_status_surfaces_as_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user-sessions/validate"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let base_url = server.uri();

    let result = tokio::task::spawn_blocking(move || {
        let client = ThrottledSessionClient::new(UserSessionClient::new(base_url)?, Arc::new(TokenBucketGate::new()));
        client.validate_session(session_id())
    })
    .await
    .unwrap();

    match result {
        Err(SessionError::Http(err)) => assert_eq!(err.status().map(|s| s.as_u16()), Some(503)),
        other => panic!("Expected Http error, got {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn six_concurrent_validations_all_succeed() {
    let server = mock_session_service(6).await;
    let base_url = server.uri();

    let responses = tokio::task::spawn_blocking(move || {
        let client = ThrottledSessionClient::new(UserSessionClient::new(base_url)?, Arc::new(TokenBucketGate::new()));
        let handles: Vec<_> = (0..6)
            .map(|_| {
                let client = client.clone();
                std::thread::spawn(move || client.validate_session(session_id()))
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect::<Result<Vec<_>, SessionError>>()
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(responses.len(), 6);
    assert!(responses.iter().all(|r| r.valid));
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_admission_never_reaches_service() {
    let server = mock_session_service(1).await;
    let base_url = server.uri();

    let results = tokio::task::spawn_blocking(move || {
        let gate = TokenBucketGate::with_config(GateConfig {
            bandwidth: Bandwidth::new(1, 1, Duration::from_secs(60)).unwrap(),
            wait_budget: Duration::ZERO,
            ..GateConfig::default()
        });
        let client = ThrottledSessionClient::new(UserSessionClient::new(base_url)?, Arc::new(gate));
        Ok::<_, SessionError>((client.validate_session(session_id()), client.validate_session(session_id())))
    })
    .await
    .unwrap()
    .unwrap();

    assert!(results.0.is_ok());
    assert!(matches!(results.1, Err(SessionError::Gate(GateError::Timeout { .. }))));
    // `expect(1)` is verified when the server is dropped
}
