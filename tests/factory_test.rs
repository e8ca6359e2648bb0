//! Session Factory Tests
//!
//! Covers:
//! - Full request pipeline against an in-memory client
//! - Session id propagation into responses and errors
//! - Request validation before any transport work
//! - Transport and construction failures

mod common;

use common::CountingConstructor;
use sessionnet::{ErrorKind, NetError, RequestInput, SessionFactory, SessionRegistry};
use std::sync::Arc;

fn factory(ctor: Arc<CountingConstructor>) -> SessionFactory {
    SessionFactory::new(Arc::new(
        SessionRegistry::builder().constructor(ctor).build(),
    ))
}

#[tokio::test]
async fn test_request_round_trip() {
    common::init_tracing();
    let factory = factory(CountingConstructor::new());
    let input = RequestInput::new("POST", "https://example.com/login?x=1")
        .with_session_id("s1")
        .with_identifier("chrome_124")
        .with_header("content-type", "application/json")
        .with_header("accept", "*/*")
        .with_body(r#"{"user":"a"}"#);

    let response = factory.request(&input).await.unwrap();

    assert_eq!(response.session_id, "s1");
    assert_eq!(response.status, 200);
    assert_eq!(response.body, r#"{"user":"a"}"#);
    assert_eq!(response.headers["x-method"], "POST");
    assert_eq!(response.headers["x-uri"], "https://example.com/login?x=1");
    assert_eq!(response.headers["x-header-order"], "content-type,accept");
}

#[tokio::test]
async fn test_response_cookies_last_wins() {
    let factory = factory(CountingConstructor::new());
    let input = RequestInput::new("GET", "https://example.com")
        .with_session_id("s1")
        .with_identifier("firefox_128");

    let response = factory.request(&input).await.unwrap();

    assert_eq!(response.cookies.len(), 2);
    assert_eq!(response.cookies["a"], "a=3");
    assert_eq!(response.cookies["b"], "b=2");
}

#[tokio::test]
async fn test_generated_session_id_in_response() {
    let factory = factory(CountingConstructor::new());
    let input = RequestInput::new("GET", "https://example.com").with_identifier("chrome_124");

    let response = factory.request(&input).await.unwrap();

    assert!(uuid::Uuid::parse_str(&response.session_id).is_ok());
    assert!(factory.registry().contains(&response.session_id));
}

#[tokio::test]
async fn test_body_without_content_type_rejected() {
    let ctor = CountingConstructor::new();
    let factory = factory(ctor.clone());
    let input = RequestInput::new("POST", "https://example.com")
        .with_session_id("s1")
        .with_identifier("chrome_124")
        .with_body("a=b");

    let err = factory.request(&input).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.session_id(), Some("s1"));
    assert!(err.message().contains("Content-Type"));
}

#[tokio::test]
async fn test_missing_url_rejected() {
    let factory = factory(CountingConstructor::new());
    let input = RequestInput::new("GET", "")
        .with_session_id("s1")
        .with_identifier("chrome_124");

    let err = factory.request(&input).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err
        .message()
        .contains("no request url or request method provided"));
}

#[tokio::test]
async fn test_transport_failure_mapped() {
    let ctor = Arc::new(CountingConstructor {
        client_fail_with: Some(NetError::ConnectionRefused),
        ..Default::default()
    });
    let factory = factory(ctor);
    let input = RequestInput::new("GET", "https://example.com")
        .with_session_id("s1")
        .with_identifier("chrome_124");

    let err = factory.request(&input).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.net_error(), Some(NetError::ConnectionRefused));
    assert_eq!(err.session_id(), Some("s1"));
    assert!(err.message().contains("failed to do request"));
}

#[tokio::test]
async fn test_construction_failure_carries_session_id() {
    let ctor = Arc::new(CountingConstructor {
        fail_with: Some(NetError::SslProtocolError),
        ..Default::default()
    });
    let factory = factory(ctor);
    let input = RequestInput::new("GET", "https://example.com")
        .with_session_id("s9")
        .with_identifier("chrome_124");

    let err = factory.get_client_from_input(&input).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Construction);
    assert_eq!(err.session_id(), Some("s9"));
}

#[tokio::test]
async fn test_remove_session() {
    let ctor = CountingConstructor::new();
    let factory = factory(ctor.clone());
    let input = RequestInput::new("GET", "https://example.com")
        .with_session_id("s1")
        .with_identifier("chrome_124");

    factory.request(&input).await.unwrap();
    assert!(factory.remove_session("s1"));
    factory.request(&input).await.unwrap();

    assert_eq!(ctor.count(), 2);
}

#[test]
fn test_response_serializes_camel_case() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let factory = factory(CountingConstructor::new());
    let input = RequestInput::new("GET", "https://example.com")
        .with_session_id("s1")
        .with_identifier("chrome_124");

    let response = rt.block_on(factory.request(&input)).unwrap();
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["sessionId"], "s1");
    assert_eq!(json["status"], 200);
    assert_eq!(json["headers"]["set-cookie"].as_array().unwrap().len(), 3);
}
