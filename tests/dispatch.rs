//! Integration tests for the authenticated streaming dispatcher.
//!
//! These tests use wiremock to stand in for a Looker instance and verify
//! login, the single token-refresh retry, streaming, cancellation, and error
//! mapping end to end.

use std::time::{Duration, Instant};

use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::future::join_all;
use looker_rs::constants::USER_AGENT;
use looker_rs::encode::DelimArray;
use looker_rs::types::ResultFormat;
use looker_rs::types::query::{RunOptions, WriteQuery};
use looker_rs::types::user::{RequestAllUsers, User};
use looker_rs::{ByteStream, Json, LookerClient, LookerConfig, LookerError, ResponseEncoding, TransportSettings};
use reqwest::StatusCode;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LOGIN: &str = "/api/4.0/login";

fn client(server: &MockServer) -> LookerClient {
    LookerClient::new(LookerConfig::new(server.uri(), "my-id", "my-secret")).unwrap()
}

fn token_response(token: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "access_token": token,
        "token_type": "Bearer",
        "expires_in": 3600
    }))
}

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Mount a login endpoint that always hands out `token`.
async fn mount_login(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path(LOGIN))
        .respond_with(token_response(token))
        .mount(server)
        .await;
}

// ===================================================================
// Login and token refresh
// ===================================================================

#[tokio::test]
async fn test_login_sends_form_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOGIN))
        .and(body_string_contains("client_id=my-id"))
        .and(body_string_contains("client_secret=my-secret"))
        .respond_with(token_response("t1"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/4.0/user"))
        .and(header("authorization", bearer("t1").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "1", "email": "a@b.c"})))
        .expect(2)
        .mount(&server)
        .await;

    let client = client(&server);
    let Json(me): Json<User> = client.me(None, None).await.unwrap();
    assert_eq!(me.email.as_deref(), Some("a@b.c"));

    // The cached token is reused.
    let _: Json<User> = client.me(None, None).await.unwrap();
    assert_eq!(client.auth().login_count(), 1);
    assert!(client.auth().is_authenticated().await);
}

#[tokio::test]
async fn test_expired_token_is_refreshed_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOGIN))
        .respond_with(token_response("t1"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(LOGIN))
        .respond_with(token_response("t2"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/4.0/user"))
        .and(header("authorization", bearer("t1").as_str()))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Requires authentication."})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/4.0/user"))
        .and(header("authorization", bearer("t2").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "1", "email": "a@b.c"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let Json(me): Json<User> = client.me(None, None).await.unwrap();
    assert_eq!(me.id.as_deref(), Some("1"));
    assert_eq!(client.auth().login_count(), 2);
}

#[tokio::test]
async fn test_second_401_is_an_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOGIN))
        .respond_with(token_response("t"))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/4.0/user"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Requires authentication."})))
        .expect(2)
        .mount(&server)
        .await;

    let client = client(&server);
    let err = client.me::<Json<User>>(None, None).await.unwrap_err();
    assert!(err.is_auth(), "expected authentication error, got {err:?}");
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    assert!(err.to_string().contains("Requires authentication."));
    assert_eq!(client.auth().login_count(), 2);
}

#[tokio::test]
async fn test_concurrent_rejections_share_one_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOGIN))
        .respond_with(token_response("t1"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(LOGIN))
        .respond_with(token_response("t2"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/4.0/user"))
        .and(header("authorization", bearer("t1").as_str()))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/4.0/user"))
        .and(header("authorization", bearer("t2").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "1"})))
        .expect(8)
        .mount(&server)
        .await;

    let client = client(&server);
    let calls = (0..8).map(|_| {
        let client = client.clone();
        tokio::spawn(async move { client.me::<Json<User>>(None, None).await })
    });
    for result in join_all(calls).await {
        let Json(me) = result.unwrap().unwrap();
        assert_eq!(me.id.as_deref(), Some("1"));
    }
    assert_eq!(client.auth().login_count(), 2);
}

#[tokio::test]
async fn test_short_lived_token_is_shared_by_concurrent_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOGIN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "t", "expires_in": 5})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/4.0/user"))
        .and(header("authorization", "Bearer t"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "1"})))
        .expect(9)
        .mount(&server)
        .await;

    let client = client(&server);
    let calls = (0..8).map(|_| {
        let client = client.clone();
        tokio::spawn(async move { client.me::<Json<User>>(None, None).await })
    });
    for result in join_all(calls).await {
        result.unwrap().unwrap();
    }
    assert_eq!(client.auth().login_count(), 1);

    // Still inside its shortened leeway, so it is reused.
    let _: Json<User> = client.me(None, None).await.unwrap();
    assert_eq!(client.auth().login_count(), 1);
}

#[tokio::test]
async fn test_login_failure_is_an_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOGIN))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "Invalid credentials"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/4.0/user"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client(&server);
    match client.me::<Json<User>>(None, None).await {
        Err(LookerError::Authentication { status, message }) => {
            assert_eq!(status, Some(StatusCode::FORBIDDEN));
            assert_eq!(message, "Invalid credentials");
        }
        other => panic!("Expected LookerError::Authentication, got: {other:?}"),
    }
    assert!(!client.auth().is_authenticated().await);
}

#[tokio::test]
async fn test_logout_revokes_and_clears_token() {
    let server = MockServer::start().await;
    mount_login(&server, "t").await;
    Mock::given(method("GET"))
        .and(path("/api/4.0/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/4.0/logout"))
        .and(header("authorization", "Bearer t"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    assert!(!client.logout().await.unwrap());

    let _: Json<User> = client.me(None, None).await.unwrap();
    assert!(client.logout().await.unwrap());
    assert!(!client.auth().is_authenticated().await);
    assert!(!client.logout().await.unwrap());
}

#[tokio::test]
async fn test_agent_tag_is_sent_on_login_and_logout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOGIN))
        .and(header("x-looker-appid", "reports"))
        .respond_with(token_response("t"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/4.0/user"))
        .and(header("x-looker-appid", "reports"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/4.0/logout"))
        .and(header("x-looker-appid", "reports"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let config = LookerConfig::new(server.uri(), "my-id", "my-secret").with_agent_tag("reports");
    let client = LookerClient::new(config).unwrap();
    let _: Json<User> = client.me(None, None).await.unwrap();
    assert!(client.logout().await.unwrap());
}

// ===================================================================
// Requests on the wire
// ===================================================================

#[tokio::test]
async fn test_query_parameters_and_headers() {
    let server = MockServer::start().await;
    mount_login(&server, "t").await;
    Mock::given(method("GET"))
        .and(path("/api/4.0/users"))
        .and(query_param("fields", "id,email"))
        .and(query_param("per_page", "10"))
        .and(query_param("ids", "1,2,3"))
        .and(header("user-agent", USER_AGENT))
        .and(header("x-looker-appid", "reports"))
        .and(header("x-trace", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "1"}, {"id": "2"}])))
        .expect(1)
        .mount(&server)
        .await;

    let config = LookerConfig::new(server.uri(), "my-id", "my-secret").with_agent_tag("reports");
    let client = LookerClient::new(config).unwrap();
    let req = RequestAllUsers {
        fields: Some("id,email".into()),
        per_page: Some(10),
        ids: Some(DelimArray::new(vec!["1".to_owned(), "2".to_owned(), "3".to_owned()])),
        ..Default::default()
    };
    let settings = TransportSettings::new().header("x-trace", "abc").unwrap();
    let Json(users): Json<Vec<User>> = client.all_users(&req, Some(&settings)).await.unwrap();
    assert_eq!(users.len(), 2);
}

#[tokio::test]
async fn test_json_body_is_sent() {
    let server = MockServer::start().await;
    mount_login(&server, "t").await;
    Mock::given(method("POST"))
        .and(path("/api/4.0/queries/run/csv"))
        .and(query_param("limit", "5"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "model": "thelook",
            "view": "orders",
            "fields": ["orders.count"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("orders.count\n42\n"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let query = WriteQuery::new("thelook", "orders", &["orders.count"]);
    let options = RunOptions {
        limit: Some(5),
        ..Default::default()
    };
    let csv: String = client
        .run_inline_query(ResultFormat::Csv, &query, &options, None)
        .await
        .unwrap();
    assert_eq!(csv, "orders.count\n42\n");
}

#[tokio::test]
async fn test_no_content_response() {
    let server = MockServer::start().await;
    mount_login(&server, "t").await;
    Mock::given(method("DELETE"))
        .and(path("/api/4.0/users/42"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client(&server).delete_user("42", None).await.unwrap();
}

#[tokio::test]
async fn test_path_parameter_stays_one_segment() {
    let server = MockServer::start().await;
    mount_login(&server, "t").await;
    Mock::given(method("GET"))
        .and(path("/api/4.0/users/%2541%2F..%2F..%2Flogin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "odd"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/4.0/dashboards/a%2Fb"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "a/b"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let Json(user): Json<User> = client.user("%41/../../login", None, None).await.unwrap();
    assert_eq!(user.id.as_deref(), Some("odd"));
    let _: Json<serde_json::Value> = client.dashboard("a/b", None, None).await.unwrap();

    let err = client.user::<Json<User>>("..", None, None).await.unwrap_err();
    assert!(matches!(err, LookerError::Encoding(_)));
    // Only the one login; nothing else reached the server.
    assert_eq!(client.auth().login_count(), 1);
}

// ===================================================================
// Errors
// ===================================================================

#[tokio::test]
async fn test_server_error_keeps_status_and_document() {
    let server = MockServer::start().await;
    mount_login(&server, "t").await;
    Mock::given(method("GET"))
        .and(path("/api/4.0/looks/999"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Not found",
            "documentation_url": "https://docs.looker.com/"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server).look::<Json<serde_json::Value>>("999", None, None).await.unwrap_err();
    match &err {
        LookerError::Server { status, body, api } => {
            assert_eq!(*status, StatusCode::NOT_FOUND);
            assert!(body.contains("Not found"));
            assert_eq!(api.as_ref().and_then(|a| a.message.as_deref()), Some("Not found"));
        }
        other => panic!("Expected LookerError::Server, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_consumer_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOGIN))
        .respond_with(token_response("t"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/4.0/user"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let req = looker_rs::api::users::me_request(None).unwrap();
    let err = client
        .invoke_with(&req, None, |stream: ByteStream| async move {
            let _ = stream.collect_bytes().await;
            Err::<(), _>(std::io::Error::other("consumer gave up"))
        })
        .await
        .unwrap_err();
    assert!(err.is_consumer());
    assert!(err.to_string().contains("consumer gave up"));
    assert_eq!(client.auth().login_count(), 1);
}

#[tokio::test]
async fn test_invalid_json_is_a_consumer_error() {
    let server = MockServer::start().await;
    mount_login(&server, "t").await;
    Mock::given(method("GET"))
        .and(path("/api/4.0/user"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not valid json"))
        .mount(&server)
        .await;

    let err = client(&server).me::<Json<User>>(None, None).await.unwrap_err();
    assert!(matches!(err, LookerError::Json(_)));
    assert!(err.is_consumer());
}

// ===================================================================
// Streaming, encodings, cancellation, timeouts
// ===================================================================

#[tokio::test]
async fn test_large_binary_body_is_streamed() {
    let server = MockServer::start().await;
    mount_login(&server, "t").await;
    let payload = vec![0xABu8; 4 * 1024 * 1024];
    Mock::given(method("GET"))
        .and(path("/api/4.0/render_tasks/r1/results"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(payload.clone()),
        )
        .mount(&server)
        .await;

    let client = client(&server);
    let mut stream: ByteStream = client.render_task_results("r1", None).await.unwrap();
    assert_eq!(stream.encoding(), ResponseEncoding::Binary);
    assert_eq!(stream.content_type(), Some("image/png"));

    let mut total = 0usize;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.unwrap();
        assert!(chunk.iter().all(|b| *b == 0xAB));
        total += chunk.len();
    }
    assert_eq!(total, payload.len());

    // Collecting gives the same bytes.
    let bytes: Bytes = client.render_task_results("r1", None).await.unwrap();
    assert_eq!(bytes.len(), payload.len());
}

#[tokio::test]
async fn test_binary_format_cannot_be_read_as_text() {
    let server = MockServer::start().await;
    mount_login(&server, "t").await;
    Mock::given(method("GET"))
        .and(path("/api/4.0/looks/7/run/png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x89, 0x50, 0x4E, 0x47]))
        .mount(&server)
        .await;

    let client = client(&server);
    let options = RunOptions::default();
    let err = client
        .run_look::<String>("7", ResultFormat::Png, &options, None)
        .await
        .unwrap_err();
    assert!(err.is_consumer());

    let png: Vec<u8> = client.run_look("7", ResultFormat::Png, &options, None).await.unwrap();
    assert_eq!(png, [0x89, 0x50, 0x4E, 0x47]);
}

#[tokio::test]
async fn test_latin1_text() {
    let server = MockServer::start().await;
    mount_login(&server, "t").await;
    Mock::given(method("GET"))
        .and(path("/api/4.0/queries/1/run/txt"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x63, 0x61, 0x66, 0xE9]))
        .mount(&server)
        .await;

    let settings = TransportSettings::new().encoding(ResponseEncoding::Latin1);
    let text: String = client(&server)
        .run_query("1", ResultFormat::Txt, &RunOptions::default(), Some(&settings))
        .await
        .unwrap();
    assert_eq!(text, "café");
}

#[tokio::test]
async fn test_cancellation_stops_waiting_for_headers() {
    let server = MockServer::start().await;
    mount_login(&server, "t").await;
    Mock::given(method("GET"))
        .and(path("/api/4.0/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})).set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let settings = TransportSettings::new().cancel_on(cancel);
    let result = client(&server).me::<Json<User>>(None, Some(&settings)).await;
    assert!(matches!(result, Err(LookerError::Cancelled)), "got {result:?}");
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_cancelling_a_live_stream() {
    let server = MockServer::start().await;
    mount_login(&server, "t").await;
    Mock::given(method("GET"))
        .and(path("/api/4.0/render_tasks/r1/results"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8; 1024]))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let settings = TransportSettings::new().cancel_on(cancel.clone());
    let mut stream: ByteStream = client(&server)
        .render_task_results("r1", Some(&settings))
        .await
        .unwrap();

    cancel.cancel();
    assert!(matches!(stream.next().await, Some(Err(LookerError::Cancelled))));
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn test_per_call_timeout() {
    let server = MockServer::start().await;
    mount_login(&server, "t").await;
    Mock::given(method("GET"))
        .and(path("/api/4.0/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let settings = TransportSettings::new().timeout(Duration::from_millis(200));
    match client(&server).me::<Json<User>>(None, Some(&settings)).await {
        Err(LookerError::Transport(e)) => assert!(e.is_timeout(), "expected timeout, got {e}"),
        other => panic!("Expected LookerError::Transport, got: {other:?}"),
    }
}
