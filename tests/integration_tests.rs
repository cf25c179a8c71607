//! Integration tests using wiremock to simulate the TapTools API.

use http::Method;
use serde_json::json;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use taptools_mcp::error::code;
use taptools_mcp::{Client, ErrorKind, RequestOptions, RetryPolicy, Sleeper};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Records requested delays instead of waiting.
#[derive(Clone, Default)]
struct RecordingSleeper {
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, delay: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        self.sleeps.lock().unwrap().push(delay);
        Box::pin(async {})
    }
}

fn client(base_url: &str, sleeper: &RecordingSleeper) -> Client {
    Client::builder()
        .base_url(base_url)
        .unwrap()
        .api_key("test-key")
        .sleeper(sleeper.clone())
        .build()
        .unwrap()
}

fn secs(values: &[u64]) -> Vec<Duration> {
    values.iter().map(|s| Duration::from_secs(*s)).collect()
}

async fn get(client: &Client, path: &str) -> taptools_mcp::Result<serde_json::Value> {
    client.execute(Method::GET, path, RequestOptions::new()).await
}

#[tokio::test]
async fn test_successful_get_returns_body_unchanged() {
    let mock_server = MockServer::start().await;
    let body = json!({"mcap": 123.5, "ticker": "AGIX", "nested": {"list": [1, 2, null]}});

    Mock::given(method("GET"))
        .and(path("/token/mcap"))
        .and(query_param("unit", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let sleeper = RecordingSleeper::default();
    let options = RequestOptions::new().with_query_param("unit", "abc");
    let result = client(&mock_server.uri(), &sleeper)
        .execute(Method::GET, "/token/mcap", options)
        .await
        .unwrap();

    assert_eq!(result, body);
    assert!(sleeper.sleeps().is_empty());
}

#[tokio::test]
async fn test_sends_bearer_token_and_json_content_type() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/market/stats"))
        .and(header("authorization", "Bearer test-key"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"activeAddresses": 1})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let sleeper = RecordingSleeper::default();
    let result = get(&client(&mock_server.uri(), &sleeper), "/market/stats").await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_base_url_path_is_preserved() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/token/quote/available"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["USD", "EUR"])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let sleeper = RecordingSleeper::default();
    let base = format!("{}/api/v1", mock_server.uri());
    let result = get(&client(&base, &sleeper), "/token/quote/available")
        .await
        .unwrap();

    assert_eq!(result, json!(["USD", "EUR"]));
}

#[tokio::test]
async fn test_post_sends_json_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token/prices"))
        .and(body_json(json!(["unit1", "unit2"])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unit1": 0.5, "unit2": 2.0})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let sleeper = RecordingSleeper::default();
    let result = client(&mock_server.uri(), &sleeper)
        .post("/token/prices", &["unit1", "unit2"])
        .await
        .unwrap();

    assert_eq!(result["unit2"], 2.0);
}

#[tokio::test]
async fn test_retry_then_success_uses_linear_backoff() {
    let mock_server = MockServer::start().await;
    let attempt_count = Arc::new(AtomicUsize::new(0));
    let attempt_count_clone = attempt_count.clone();

    // 503, 503, then 200
    Mock::given(method("GET"))
        .and(path("/token/holders"))
        .respond_with(move |_req: &wiremock::Request| {
            let count = attempt_count_clone.fetch_add(1, Ordering::SeqCst);
            if count < 2 {
                ResponseTemplate::new(503).set_body_string("Service Unavailable")
            } else {
                ResponseTemplate::new(200).set_body_json(json!({"ok": true}))
            }
        })
        .mount(&mock_server)
        .await;

    let sleeper = RecordingSleeper::default();
    let result = get(&client(&mock_server.uri(), &sleeper), "/token/holders")
        .await
        .unwrap();

    assert_eq!(result, json!({"ok": true}));
    assert_eq!(attempt_count.load(Ordering::SeqCst), 3);
    assert_eq!(sleeper.sleeps(), secs(&[1, 2]));
}

#[tokio::test]
async fn test_backoff_scales_with_base_delay() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/token/holders"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let sleeper = RecordingSleeper::default();
    let client = Client::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .retry_policy(RetryPolicy::default().with_base_delay(Duration::from_millis(250)))
        .sleeper(sleeper.clone())
        .build()
        .unwrap();

    let err = get(&client, "/token/holders").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Server);
    assert_eq!(
        sleeper.sleeps(),
        vec![Duration::from_millis(250), Duration::from_millis(500)]
    );
}

#[tokio::test]
async fn test_retryable_statuses_exhaust_three_attempts() {
    for status in [408u16, 429, 500, 502, 503, 504] {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/token/trades"))
            .respond_with(ResponseTemplate::new(status))
            .expect(3)
            .mount(&mock_server)
            .await;

        let sleeper = RecordingSleeper::default();
        let err = get(&client(&mock_server.uri(), &sleeper), "/token/trades")
            .await
            .unwrap_err();

        assert_eq!(err.status().map(|s| s.as_u16()), Some(status));
        assert_eq!(sleeper.sleeps(), secs(&[1, 2]), "status {}", status);
        mock_server.verify().await;
    }
}

#[tokio::test]
async fn test_non_retryable_statuses_fail_immediately() {
    for (status, kind) in [
        (400u16, ErrorKind::Validation),
        (401, ErrorKind::Authentication),
        (403, ErrorKind::Authentication),
        (404, ErrorKind::NotFound),
        (422, ErrorKind::Validation),
        (501, ErrorKind::Server),
    ] {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/token/links"))
            .respond_with(ResponseTemplate::new(status))
            .expect(1)
            .mount(&mock_server)
            .await;

        let sleeper = RecordingSleeper::default();
        let err = get(&client(&mock_server.uri(), &sleeper), "/token/links")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), kind, "status {}", status);
        assert!(sleeper.sleeps().is_empty());
        mock_server.verify().await;
    }
}

#[tokio::test]
async fn test_authentication_error_is_normalized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/token/mcap"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "Unauthorized",
            "message": "Invalid API key"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let sleeper = RecordingSleeper::default();
    let err = get(&client(&mock_server.uri(), &sleeper), "/token/mcap")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Authentication);
    assert_eq!(err.message(), "Unauthorized: Invalid API key");
    assert_eq!(err.status().map(|s| s.as_u16()), Some(401));
    assert_eq!(err.request(), Some("GET /token/mcap"));
    assert!(!err.is_retryable());

    let protocol = err.to_protocol_error();
    assert_eq!(protocol.code, code::AUTHENTICATION);
    assert_eq!(
        protocol.message,
        r#"Unauthorized: Invalid API key (HTTP 401) - details: {"error":"Unauthorized","message":"Invalid API key"}"#
    );
}

#[tokio::test]
async fn test_plain_text_error_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/token/ohlcv"))
        .respond_with(ResponseTemplate::new(400).set_body_string("interval is required"))
        .mount(&mock_server)
        .await;

    let sleeper = RecordingSleeper::default();
    let err = get(&client(&mock_server.uri(), &sleeper), "/token/ohlcv")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.message(), "HTTP 400: interval is required");
    assert_eq!(err.to_protocol_error().code, code::VALIDATION);
}

#[tokio::test]
async fn test_rate_limit_honors_retry_after_seconds() {
    let mock_server = MockServer::start().await;
    let attempt_count = Arc::new(AtomicUsize::new(0));
    let attempt_count_clone = attempt_count.clone();

    Mock::given(method("GET"))
        .and(path("/token/top/volume"))
        .respond_with(move |_req: &wiremock::Request| {
            if attempt_count_clone.fetch_add(1, Ordering::SeqCst) == 0 {
                ResponseTemplate::new(429)
                    .insert_header("retry-after", "5")
                    .set_body_json(json!({"error": "Too Many Requests", "message": "slow down"}))
            } else {
                ResponseTemplate::new(200).set_body_json(json!([]))
            }
        })
        .mount(&mock_server)
        .await;

    let sleeper = RecordingSleeper::default();
    let result = get(&client(&mock_server.uri(), &sleeper), "/token/top/volume")
        .await
        .unwrap();

    assert_eq!(result, json!([]));
    assert_eq!(sleeper.sleeps(), secs(&[5]));
}

#[tokio::test]
async fn test_rate_limit_without_retry_after_uses_backoff() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/token/top/mcap"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&mock_server)
        .await;

    let sleeper = RecordingSleeper::default();
    let err = get(&client(&mock_server.uri(), &sleeper), "/token/top/mcap")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RateLimit);
    assert!(err.retry_after().is_none());
    assert_eq!(sleeper.sleeps(), secs(&[1, 2]));
}

#[tokio::test]
async fn test_rate_limit_with_past_http_date_retries_immediately() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/token/top/liquidity"))
        .respond_with(
            ResponseTemplate::new(429).insert_header("retry-after", "Wed, 21 Oct 2015 07:28:00 GMT"),
        )
        .expect(3)
        .mount(&mock_server)
        .await;

    let sleeper = RecordingSleeper::default();
    let err = get(&client(&mock_server.uri(), &sleeper), "/token/top/liquidity")
        .await
        .unwrap_err();

    assert_eq!(sleeper.sleeps(), vec![Duration::ZERO, Duration::ZERO]);

    let protocol = err.to_protocol_error();
    assert_eq!(protocol.code, code::RATE_LIMIT);
    assert_eq!(
        protocol.message,
        "HTTP 429: No error details available (HTTP 429) - retry after Wed, 21 Oct 2015 07:28:00 GMT"
    );
}

#[tokio::test]
async fn test_invalid_json_success_is_parse_error_without_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/token/pools"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let sleeper = RecordingSleeper::default();
    let err = get(&client(&mock_server.uri(), &sleeper), "/token/pools")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Parse);
    assert_eq!(err.message(), "Invalid JSON response from API");
    assert!(err.status().is_none());
    assert!(err.details().contains_key("response_text"));
    assert!(sleeper.sleeps().is_empty());
    assert_eq!(err.to_protocol_error().code, code::PARSE);
}

#[tokio::test]
async fn test_connection_refused_is_retried_then_reported() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let sleeper = RecordingSleeper::default();
    let err = get(
        &client(&format!("http://127.0.0.1:{}", port), &sleeper),
        "/market/stats",
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Connection);
    assert!(err.message().starts_with("Network error:"));
    assert!(err.status().is_none());
    assert_eq!(sleeper.sleeps(), secs(&[1, 2]));
    assert_eq!(err.to_protocol_error().code, code::CONNECTION);
}

#[tokio::test]
async fn test_timeout_is_retried_then_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wallet/portfolio/positions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let sleeper = RecordingSleeper::default();
    let client = Client::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .timeout(Duration::from_millis(50))
        .sleeper(sleeper.clone())
        .build()
        .unwrap();

    let err = get(&client, "/wallet/portfolio/positions").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert!(err.message().starts_with("Request timed out:"));
    assert_eq!(sleeper.sleeps(), secs(&[1, 2]));
    assert_eq!(err.to_protocol_error().code, code::TIMEOUT);
}

#[tokio::test]
async fn test_without_retry_makes_one_attempt() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/token/quote"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let sleeper = RecordingSleeper::default();
    let err = client(&mock_server.uri(), &sleeper)
        .execute(Method::GET, "/token/quote", RequestOptions::new().without_retry())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);
    assert!(sleeper.sleeps().is_empty());
}

#[tokio::test]
async fn test_repeated_success_yields_identical_results() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/integration/latest-block"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"height": 10_000_000})))
        .expect(2)
        .mount(&mock_server)
        .await;

    let sleeper = RecordingSleeper::default();
    let client = client(&mock_server.uri(), &sleeper);

    let first = get(&client, "/integration/latest-block").await.unwrap();
    let second = get(&client, "/integration/latest-block").await.unwrap();

    assert_eq!(first, second);
    assert!(sleeper.sleeps().is_empty());
}

#[tokio::test]
async fn test_same_failure_produces_same_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/nft/collection/stats"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "no such policy"})))
        .mount(&mock_server)
        .await;

    let sleeper = RecordingSleeper::default();
    let client = client(&mock_server.uri(), &sleeper);

    let first = get(&client, "/nft/collection/stats").await.unwrap_err();
    let second = get(&client, "/nft/collection/stats").await.unwrap_err();

    assert_eq!(first.message(), "Unknown error: no such policy");
    assert_eq!(first.to_protocol_error(), second.to_protocol_error());
    assert_eq!(first.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_concurrent_calls_retry_independently() {
    let mock_server = MockServer::start().await;
    let attempt_count = Arc::new(AtomicUsize::new(0));
    let attempt_count_clone = attempt_count.clone();

    Mock::given(method("GET"))
        .and(path("/market/stats"))
        .respond_with(move |_req: &wiremock::Request| {
            if attempt_count_clone.fetch_add(1, Ordering::SeqCst) == 0 {
                ResponseTemplate::new(502)
            } else {
                ResponseTemplate::new(200).set_body_json(json!({"ok": true}))
            }
        })
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/market/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let sleeper = RecordingSleeper::default();
    let client = client(&mock_server.uri(), &sleeper);

    let (stats, metrics) = tokio::join!(
        get(&client, "/market/stats"),
        get(&client, "/market/metrics")
    );

    assert_eq!(stats.unwrap(), json!({"ok": true}));
    assert_eq!(metrics.unwrap(), json!([]));
    assert_eq!(sleeper.sleeps(), secs(&[1]));
}

#[tokio::test]
async fn test_execute_as_deserializes_typed_body() {
    #[derive(serde::Deserialize, Debug, PartialEq)]
    struct Holders {
        holders: u64,
    }

    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/token/holders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"holders": 42})))
        .mount(&mock_server)
        .await;

    let sleeper = RecordingSleeper::default();
    let client = client(&mock_server.uri(), &sleeper);

    let holders: Holders = client
        .execute_as(Method::GET, "/token/holders", RequestOptions::new())
        .await
        .unwrap();
    assert_eq!(holders, Holders { holders: 42 });

    let err = client
        .execute_as::<Vec<String>>(Method::GET, "/token/holders", RequestOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
}
