use serde_json::json;
use sm_deploy::clients::{ConfigApi, QbeeClient};
use sm_deploy::core::config::AppConfig;
use sm_deploy::core::models::{Mode, SoftwareManagement};
use sm_deploy::errors::SmError;
use sm_deploy::features::{DeployRequest, Outcome, apply};
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, retry_attempts: usize) -> QbeeClient {
    let config = AppConfig {
        api_url: format!("{}/api/v2/", server.uri()),
        http_timeout: Duration::from_secs(5),
        retry_attempts,
    };
    QbeeClient::new("test-token", &config).unwrap()
}

fn sm_config() -> SoftwareManagement {
    serde_json::from_value(json!({
        "enabled": true,
        "version": "v1",
        "items": [{"package": "htop", "config_files": []}]
    }))
    .unwrap()
}

fn current_config() -> serde_json::Value {
    json!({"config": {"bundles": ["users"], "bundle_data": {}}})
}

#[tokio::test]
async fn test_get_current_config_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/config/group-1"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_config()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 0);
    let remote = client.get_current_config("group-1").await.unwrap();

    assert!(!remote.has_software_management());
    assert_eq!(remote.config.bundles, vec!["users".to_string()]);
}

#[tokio::test]
async fn test_replace_posts_change_then_commit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/config/group-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_config()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v2/change"))
        .and(header("Authorization", "Bearer test-token"))
        .and(body_string_contains("node_id=group-1"))
        .and(body_string_contains("formtype=software_management"))
        .and(body_string_contains("htop"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sha": "abc"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v2/commit"))
        .and(body_string_contains("action=commit"))
        .and(body_string_contains("message=rollout"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sha": "def"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 0);
    let request = DeployRequest {
        device_group: "group-1".to_string(),
        mode: Mode::Replace,
        config: sm_config(),
        commit_message: "rollout".to_string(),
    };

    assert_eq!(apply(&client, &request).await.unwrap(), Outcome::Uploaded);
}

#[tokio::test]
async fn test_failed_change_aborts_before_commit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/change"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "invalid config"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v2/commit"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server, 0);
    let err = client
        .send_config("group-1", &sm_config(), "rollout")
        .await
        .unwrap_err();

    match err {
        SmError::ApiError { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body, json!({"error": "invalid config"}));
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_error_body_is_kept_as_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/config/group-1"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let client = client_for(&server, 0);
    let err = client.get_current_config("group-1").await.unwrap_err();

    assert!(matches!(
        err,
        SmError::ApiError { status: 404, ref body } if body == "not found"
    ));
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/config/group-1"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let client = client_for(&server, 2);
    let err = client.get_current_config("group-1").await.unwrap_err();

    assert!(matches!(err, SmError::ApiError { status: 503, .. }));
}

#[tokio::test]
async fn test_retry_recovers_after_transient_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/config/group-1"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/config/group-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_config()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 3);
    assert!(client.get_current_config("group-1").await.is_ok());
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/config/group-1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "unauthorized"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 3);
    let err = client.get_current_config("group-1").await.unwrap_err();

    assert!(matches!(err, SmError::ApiError { status: 401, .. }));
}

#[tokio::test]
async fn test_failed_fetch_aborts_before_change_and_commit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/config/group-1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "unauthorized"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v2/change"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v2/commit"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server, 3);
    let request = DeployRequest {
        device_group: "group-1".to_string(),
        mode: Mode::Replace,
        config: sm_config(),
        commit_message: "rollout".to_string(),
    };

    let err = apply(&client, &request).await.unwrap_err();
    assert!(matches!(err, SmError::ApiError { status: 401, .. }));
}
