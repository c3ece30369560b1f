use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use ytchat_core::{ChatError, FailureKind, FetchParams, YoutubeId};
use ytchat_engine::{BatchFetcher, FetchSettings, PageFetcher, ReqwestFetcher};

fn fetcher_for(server: &MockServer) -> ReqwestFetcher {
    ReqwestFetcher::new(FetchSettings {
        base_url: server.uri(),
        request_timeout: Duration::from_millis(500),
        ..FetchSettings::default()
    })
    .expect("fetcher")
}

fn params() -> FetchParams {
    FetchParams {
        api_key: "KEY".to_string(),
        client_version: "2.0".to_string(),
        continuation: "C0".to_string(),
    }
}

#[tokio::test]
async fn live_page_is_fetched_by_live_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/watch"))
        .and(query_param("v", "abc123"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html>live</html>", "text/html; charset=utf-8"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let html = fetcher_for(&server)
        .fetch_live_page(&YoutubeId::LiveId("abc123".into()))
        .await
        .expect("page");
    assert_eq!(html, "<html>live</html>");
}

#[tokio::test]
async fn live_page_is_fetched_by_channel_and_handle() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/channel/UC123/live"))
        .respond_with(ResponseTemplate::new(200).set_body_string("channel"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/@studio/live"))
        .respond_with(ResponseTemplate::new(200).set_body_string("handle"))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let channel = fetcher
        .fetch_live_page(&YoutubeId::ChannelId("UC123".into()))
        .await
        .expect("channel page");
    let handle = fetcher
        .fetch_live_page(&YoutubeId::Handle("studio".into()))
        .await
        .expect("handle page");
    assert_eq!(channel, "channel");
    assert_eq!(handle, "handle");
}

#[tokio::test]
async fn batch_posts_params_and_returns_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/youtubei/v1/live_chat/get_live_chat"))
        .and(query_param("key", "KEY"))
        .and(body_partial_json(json!({
            "context": { "client": { "clientVersion": "2.0", "clientName": "WEB" } },
            "continuation": "C0"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let value = fetcher_for(&server).fetch_batch(&params()).await.expect("batch");
    assert_eq!(value, json!({ "ok": true }));
}

#[tokio::test]
async fn service_unavailable_is_transient() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = fetcher_for(&server).fetch_batch(&params()).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(503));
    assert!(ChatError::from(err).is_transient());
}

#[tokio::test]
async fn other_statuses_are_not_transient() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = fetcher_for(&server).fetch_batch(&params()).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(403));
    assert!(!ChatError::from(err).is_transient());
}

#[tokio::test]
async fn slow_response_maps_to_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let err = fetcher_for(&server).fetch_batch(&params()).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
    assert!(ChatError::from(err).is_transient());
}

#[tokio::test]
async fn non_json_batch_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
        .mount(&server)
        .await;

    let err = fetcher_for(&server).fetch_batch(&params()).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn oversized_page_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(64)))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings {
        base_url: server.uri(),
        max_bytes: 16,
        ..FetchSettings::default()
    })
    .expect("fetcher");
    let err = fetcher
        .fetch_live_page(&YoutubeId::LiveId("abc123".into()))
        .await
        .unwrap_err();
    assert!(matches!(err.kind, FailureKind::TooLarge { max_bytes: 16, .. }));
}

#[test]
fn invalid_base_url_is_rejected() {
    let err = ReqwestFetcher::new(FetchSettings {
        base_url: "not a url".to_string(),
        ..FetchSettings::default()
    })
    .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
