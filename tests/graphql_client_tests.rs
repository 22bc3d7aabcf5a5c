//! Integration tests for the GraphQL API client.
//!
//! These tests run the client against a local mock server and verify the
//! request shape, header handling, and response classification.

use std::time::Duration;

use circleci_core::{ApiClient, ApiError, AuthToken, ClientConfig, HostUrl, Variables};
use serde::Deserialize;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a client pointed at the mock server.
fn create_test_client(server: &MockServer, token: &str) -> ApiClient {
    let config = ClientConfig::builder()
        .host(HostUrl::new(server.uri()).unwrap())
        .token(AuthToken::new(token))
        .build()
        .unwrap();
    ApiClient::new(&config).unwrap()
}

async fn mount_response(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/graphql-unstable"))
        .respond_with(response)
        .mount(server)
        .await;
}

// ============================================================================
// Request Shape Tests
// ============================================================================

#[tokio::test]
async fn test_execute_posts_query_and_variables_as_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql-unstable"))
        .and(header("content-type", "application/json; charset=utf-8"))
        .and(header("accept", "application/json"))
        .and(body_json(json!({
            "query": "query($name: String!) { orb(name: $name) { id } }",
            "variables": {"name": "circleci/node"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"orb": {"id": "1"}}})))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_test_client(&server, "abc");
    let mut variables = Variables::new();
    variables.insert("name".to_string(), json!("circleci/node"));

    let response = client
        .execute("query($name: String!) { orb(name: $name) { id } }", variables)
        .await
        .unwrap();

    assert_eq!(response.data["orb"]["id"], "1");
}

#[tokio::test]
async fn test_empty_variables_are_sent_as_empty_object() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql-unstable"))
        .and(body_json(json!({"query": "query { me { id } }", "variables": {}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"me": null}})))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_test_client(&server, "abc");
    let response = client
        .execute("query { me { id } }", Variables::new())
        .await
        .unwrap();

    assert_eq!(response.data, json!({"me": null}));
}

#[tokio::test]
async fn test_authorization_header_is_raw_token() {
    let server = MockServer::start().await;
    mount_response(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({"data": {}})),
    )
    .await;

    let client = create_test_client(&server, "abc");
    client.execute("query { me { id } }", Variables::new()).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let authorization = requests[0].headers.get("authorization").unwrap();
    assert_eq!(authorization.to_str().unwrap(), "abc");
}

#[tokio::test]
async fn test_empty_token_sends_no_authorization_header() {
    let server = MockServer::start().await;
    mount_response(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({"data": {}})),
    )
    .await;

    let client = create_test_client(&server, "");
    client.execute("query { me { id } }", Variables::new()).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_user_agent_identifies_client() {
    let server = MockServer::start().await;
    mount_response(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({"data": {}})),
    )
    .await;

    let config = ClientConfig::builder()
        .host(HostUrl::new(server.uri()).unwrap())
        .user_agent_prefix("circleci-cli/0.1")
        .build()
        .unwrap();
    let client = ApiClient::new(&config).unwrap();
    client.execute("query { me { id } }", Variables::new()).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let user_agent = requests[0].headers.get("user-agent").unwrap().to_str().unwrap();
    assert!(user_agent.starts_with("circleci-cli/0.1 | circleci-core v"));
}

// ============================================================================
// Response Classification Tests
// ============================================================================

#[tokio::test]
async fn test_data_only_response_is_full_success() {
    let server = MockServer::start().await;
    mount_response(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({"data": {"x": 1}})),
    )
    .await;

    let client = create_test_client(&server, "abc");
    let response = client.execute("query { x }", Variables::new()).await.unwrap();

    assert_eq!(response.data, json!({"x": 1}));
    assert!(response.warnings.is_empty());
    assert!(!response.is_partial());
}

#[tokio::test]
async fn test_data_with_errors_is_partial_success() {
    let server = MockServer::start().await;
    mount_response(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "data": {"x": 1, "y": null},
            "errors": [{"message": "y failed", "path": ["y"]}]
        })),
    )
    .await;

    let client = create_test_client(&server, "abc");
    let response = client.execute("query { x y }", Variables::new()).await.unwrap();

    assert_eq!(response.data["x"], 1);
    assert!(response.is_partial());
    assert_eq!(response.warnings.len(), 1);
    assert_eq!(response.warnings[0].message, "y failed");
    assert_eq!(response.warnings[0].to_string(), "y failed (at y)");
}

#[tokio::test]
async fn test_partial_success_can_be_made_strict() {
    let server = MockServer::start().await;
    mount_response(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "data": {"x": 1},
            "errors": [{"message": "deprecated field"}]
        })),
    )
    .await;

    let client = create_test_client(&server, "abc");
    let result = client
        .execute("query { x }", Variables::new())
        .await
        .unwrap()
        .into_data_strict();

    match result {
        Err(ApiError::Graphql(errors)) => assert_eq!(errors.messages(), vec!["deprecated field"]),
        other => panic!("expected GraphQL error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_errors_without_data_is_graphql_error() {
    let server = MockServer::start().await;
    mount_response(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{"message": "Permission denied", "extensions": {"code": "FORBIDDEN"}}]
        })),
    )
    .await;

    let client = create_test_client(&server, "abc");
    let result = client.execute("mutation { x }", Variables::new()).await;

    match result {
        Err(ApiError::Graphql(errors)) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors.messages(), vec!["Permission denied"]);
            let extensions = errors.0[0].extensions.as_ref().unwrap();
            assert_eq!(extensions["code"], "FORBIDDEN");
        }
        other => panic!("expected GraphQL error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_errors_with_null_data_is_graphql_error() {
    let server = MockServer::start().await;
    mount_response(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{"message": "first"}, {"message": "second"}]
        })),
    )
    .await;

    let client = create_test_client(&server, "abc");
    let error = client
        .execute("query { x }", Variables::new())
        .await
        .unwrap_err();

    assert!(matches!(error, ApiError::Graphql(_)));
    assert_eq!(error.to_string(), "first\nsecond");
}

// ============================================================================
// Transport and Protocol Error Tests
// ============================================================================

#[tokio::test]
async fn test_server_error_is_transport_error_with_body() {
    let server = MockServer::start().await;
    mount_response(
        &server,
        ResponseTemplate::new(500).set_body_string("internal failure"),
    )
    .await;

    let client = create_test_client(&server, "abc");
    let error = client
        .execute("query { x }", Variables::new())
        .await
        .unwrap_err();

    match error {
        ApiError::Transport(transport) => {
            assert_eq!(transport.status_code(), Some(500));
            assert_eq!(transport.raw_body(), Some("internal failure"));
            assert!(!transport.is_timeout());
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unauthorized_is_transport_error_not_parsed() {
    let server = MockServer::start().await;
    mount_response(
        &server,
        ResponseTemplate::new(401).set_body_json(json!({"message": "You must log in"})),
    )
    .await;

    let client = create_test_client(&server, "bad-token");
    let error = client
        .execute("query { me { id } }", Variables::new())
        .await
        .unwrap_err();

    match error {
        ApiError::Transport(transport) => {
            assert_eq!(transport.status_code(), Some(401));
            assert!(transport.raw_body().unwrap().contains("You must log in"));
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_success_body_is_protocol_error() {
    let server = MockServer::start().await;
    mount_response(
        &server,
        ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"),
    )
    .await;

    let client = create_test_client(&server, "abc");
    let error = client
        .execute("query { x }", Variables::new())
        .await
        .unwrap_err();

    match error {
        ApiError::Protocol(protocol) => assert_eq!(protocol.body, "<html>maintenance</html>"),
        other => panic!("expected protocol error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_json_without_envelope_keys_is_protocol_error() {
    let server = MockServer::start().await;
    mount_response(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({"result": "ok"})),
    )
    .await;

    let client = create_test_client(&server, "abc");
    let error = client
        .execute("query { x }", Variables::new())
        .await
        .unwrap_err();

    assert!(matches!(error, ApiError::Protocol(_)));
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;
    mount_response(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(json!({"data": {}}))
            .set_delay(Duration::from_secs(2)),
    )
    .await;

    let client = create_test_client(&server, "abc");
    let error = client
        .execute_with_timeout("query { x }", Variables::new(), Duration::from_millis(100))
        .await
        .unwrap_err();

    match error {
        ApiError::Transport(transport) => assert!(transport.is_timeout()),
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn test_configured_default_timeout_applies_to_execute() {
    let server = MockServer::start().await;
    mount_response(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(json!({"data": {}}))
            .set_delay(Duration::from_secs(2)),
    )
    .await;

    let config = ClientConfig::builder()
        .host(HostUrl::new(server.uri()).unwrap())
        .token(AuthToken::new("abc"))
        .timeout(Duration::from_millis(100))
        .build()
        .unwrap();
    let client = ApiClient::new(&config).unwrap();

    let error = client
        .execute("query { x }", Variables::new())
        .await
        .unwrap_err();

    match error {
        ApiError::Transport(transport) => assert!(transport.is_timeout()),
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_host_is_network_error() {
    // Nothing listens on the port once the server is dropped.
    let uri = {
        let server = MockServer::builder().start().await;
        server.uri()
    };
    let config = ClientConfig::builder()
        .host(HostUrl::new(uri).unwrap())
        .build()
        .unwrap();
    let client = ApiClient::new(&config).unwrap();

    let error = client
        .execute("query { x }", Variables::new())
        .await
        .unwrap_err();

    match error {
        ApiError::Transport(transport) => assert_eq!(transport.status_code(), None),
        other => panic!("expected transport error, got {other:?}"),
    }
}

// ============================================================================
// Typed Decoding Tests
// ============================================================================

#[derive(Debug, Deserialize)]
struct MeQuery {
    me: User,
}

#[derive(Debug, Deserialize)]
struct User {
    id: String,
    name: String,
}

#[tokio::test]
async fn test_execute_as_decodes_data() {
    let server = MockServer::start().await;
    mount_response(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "data": {"me": {"id": "u1", "name": "Ada"}}
        })),
    )
    .await;

    let client = create_test_client(&server, "abc");
    let response = client
        .execute_as::<MeQuery>("query { me { id name } }", Variables::new())
        .await
        .unwrap();

    assert_eq!(response.data.me.id, "u1");
    assert_eq!(response.data.me.name, "Ada");
    assert!(response.warnings.is_empty());
}

#[tokio::test]
async fn test_execute_as_type_mismatch_is_protocol_error() {
    let server = MockServer::start().await;
    mount_response(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({"data": {"me": {"id": 7}}})),
    )
    .await;

    let client = create_test_client(&server, "abc");
    let error = client
        .execute_as::<MeQuery>("query { me { id name } }", Variables::new())
        .await
        .unwrap_err();

    assert!(matches!(error, ApiError::Protocol(_)));
}

// ============================================================================
// Concurrency Tests
// ============================================================================

#[tokio::test]
async fn test_concurrent_executes_share_one_client() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql-unstable"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"ok": true}})))
        .expect(3)
        .mount(&server)
        .await;

    let client = create_test_client(&server, "abc");
    let (a, b, c) = tokio::join!(
        client.execute("query { a }", Variables::new()),
        client.execute("query { b }", Variables::new()),
        client.execute("query { c }", Variables::new()),
    );

    for result in [a, b, c] {
        assert_eq!(result.unwrap().data["ok"], true);
    }
}

#[tokio::test]
async fn test_client_can_be_shared_across_tasks() {
    let server = MockServer::start().await;
    mount_response(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({"data": {"ok": true}})),
    )
    .await;

    let client = std::sync::Arc::new(create_test_client(&server, "abc"));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let client = std::sync::Arc::clone(&client);
            tokio::spawn(async move { client.execute("query { ok }", Variables::new()).await })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
}
