//! End-to-end tests for the countries API
//!
//! A wiremock server stands in for REST Countries; the real HTTP server is
//! bound to an ephemeral port and driven with reqwest.

use std::net::SocketAddr;
use std::time::Duration;

use countries_api::config::UpstreamConfig;
use countries_api::{CountryService, CountrySource, FetchError, HttpSource, Server, api};
use reqwest::StatusCode;
use serde_json::{Value, json};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use url::Url;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

/// Helper to create an upstream payload in the REST Countries shape
fn upstream_countries() -> Value {
    json!([
        { "name": { "common": "USA", "official": "United States of America" }, "population": 300000000 },
        { "name": { "common": "Canada", "official": "Canada" }, "population": 40000000 },
        { "name": { "common": "Iceland", "official": "Iceland" }, "population": 372000 },
        { "name": { "common": "Ireland", "official": "Republic of Ireland" } }
    ])
}

struct TestApp {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl TestApp {
    async fn spawn(upstream: &MockServer) -> Self {
        let url = Url::parse(&format!("{}/v3.1/all", upstream.uri())).unwrap();
        let source = HttpSource::new(reqwest::Client::new(), url);
        let app = api::routes(CountryService::new(source));

        let server = Server::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await.unwrap();
        let addr = server.local_addr();
        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            server
                .serve_with_shutdown(app, async {
                    rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self { addr, shutdown: Some(tx), handle }
    }

    fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.addr, path_and_query)
    }

    async fn get(&self, path_and_query: &str) -> (StatusCode, Value) {
        let res = reqwest::get(self.url(path_and_query)).await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap())
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            tx.send(()).ok();
        }
        self.handle.await.unwrap();
    }
}

async fn mock_upstream(template: ResponseTemplate) -> MockServer {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3.1/all"))
        .respond_with(template)
        .mount(&upstream)
        .await;
    upstream
}

fn common_names(body: &Value) -> Vec<&str> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"]["common"].as_str().unwrap())
        .collect()
}

// ============================================================================
// Success paths
// ============================================================================

#[tokio::test]
async fn test_lists_every_country() {
    let upstream = mock_upstream(ResponseTemplate::new(200).set_body_json(upstream_countries())).await;
    let app = TestApp::spawn(&upstream).await;

    let (status, body) = app.get("/api/countries").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(common_names(&body), ["USA", "Canada", "Iceland", "Ireland"]);
    assert_eq!(body[3]["population"], Value::Null);

    app.stop().await;
}

#[tokio::test]
async fn test_combined_query() {
    let upstream = mock_upstream(ResponseTemplate::new(200).set_body_json(upstream_countries())).await;
    let app = TestApp::spawn(&upstream).await;

    // "land" matches Iceland and Ireland; Ireland has no population and
    // drops out under the ceiling.
    let (status, body) = app.get("/api/countries?countryName=LAND&maxPopulation=1&sort=descend&take=5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(common_names(&body), ["Iceland"]);

    let (_, body) = app.get("/api/countries?sort=ascend&take=2").await;
    assert_eq!(common_names(&body), ["Canada", "Iceland"]);

    app.stop().await;
}

#[tokio::test]
async fn test_upstream_field_names_are_case_insensitive() {
    let payload = json!([{ "Name": { "COMMON": "Peru" }, "Population": 34000000 }]);
    let upstream = mock_upstream(ResponseTemplate::new(200).set_body_json(payload)).await;
    let app = TestApp::spawn(&upstream).await;

    let (_, body) = app.get("/api/countries").await;
    assert_eq!(body, json!([{ "name": { "common": "Peru", "official": null }, "population": 34000000 }]));

    app.stop().await;
}

#[tokio::test]
async fn test_empty_upstream_list_is_empty_success() {
    let upstream = mock_upstream(ResponseTemplate::new(200).set_body_json(json!([]))).await;
    let app = TestApp::spawn(&upstream).await;

    let (status, body) = app.get("/api/countries").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    app.stop().await;
}

#[tokio::test]
async fn test_every_request_fetches_upstream() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3.1/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(upstream_countries()))
        .expect(3)
        .mount(&upstream)
        .await;
    let app = TestApp::spawn(&upstream).await;

    for _ in 0..3 {
        let (status, _) = app.get("/api/countries?take=1").await;
        assert_eq!(status, StatusCode::OK);
    }

    app.stop().await;
    upstream.verify().await;
}

// ============================================================================
// Error paths
// ============================================================================

#[tokio::test]
async fn test_upstream_500_is_a_generic_400() {
    let upstream = mock_upstream(ResponseTemplate::new(500).set_body_string("boom: stack trace here")).await;
    let app = TestApp::spawn(&upstream).await;

    let (status, body) = app.get("/api/countries").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "UPSTREAM_FAILURE");
    assert_eq!(body["error"]["message"], "An error occurred while fetching country data.");
    assert!(!body.to_string().contains("boom"));

    app.stop().await;
}

#[tokio::test]
async fn test_upstream_null_is_a_generic_400() {
    let upstream = mock_upstream(ResponseTemplate::new(200).set_body_string("null")).await;
    let app = TestApp::spawn(&upstream).await;

    let (status, body) = app.get("/api/countries").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "UPSTREAM_FAILURE");

    app.stop().await;
}

#[tokio::test]
async fn test_invalid_parameters_skip_the_upstream() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(upstream_countries()))
        .expect(0)
        .mount(&upstream)
        .await;
    let app = TestApp::spawn(&upstream).await;

    for query in ["maxPopulation=-1", "sort=bogus", "take=-1", "take=many"] {
        let (status, body) = app.get(&format!("/api/countries?{query}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "query {query}");
        assert_eq!(body["error"]["code"], "INVALID_PARAMETER", "query {query}");
    }

    app.stop().await;
    upstream.verify().await;
}

// ============================================================================
// Routing
// ============================================================================

#[tokio::test]
async fn test_routing_outcomes() {
    let upstream = mock_upstream(ResponseTemplate::new(200).set_body_json(json!([]))).await;
    let app = TestApp::spawn(&upstream).await;
    let client = reqwest::Client::new();

    let res = client.get(app.url("/healthz")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "ok");

    let res = client.get(app.url("/api/cities")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client.post(app.url("/api/countries")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);

    drop(client);
    app.stop().await;
}

// ============================================================================
// Upstream client
// ============================================================================

#[tokio::test]
async fn test_http_source_returns_raw_body() {
    let upstream = mock_upstream(ResponseTemplate::new(200).set_body_string("[1,2]")).await;
    let url = Url::parse(&format!("{}/v3.1/all", upstream.uri())).unwrap();
    let source = HttpSource::from_config(&UpstreamConfig { url, timeout_secs: None }).unwrap();

    let body = source.fetch().await.unwrap();
    assert_eq!(&body[..], b"[1,2]");
}

#[tokio::test]
async fn test_http_source_rejects_error_status() {
    let upstream = mock_upstream(ResponseTemplate::new(503)).await;
    let url = Url::parse(&format!("{}/v3.1/all", upstream.uri())).unwrap();
    let source = HttpSource::new(reqwest::Client::new(), url);

    let err = source.fetch().await.unwrap_err();
    assert!(matches!(err, FetchError::Status { status } if status == StatusCode::SERVICE_UNAVAILABLE));
}

#[tokio::test]
async fn test_http_source_times_out() {
    let upstream = mock_upstream(
        ResponseTemplate::new(200).set_body_json(json!([])).set_delay(Duration::from_secs(3)),
    )
    .await;
    let url = Url::parse(&format!("{}/v3.1/all", upstream.uri())).unwrap();
    let source = HttpSource::from_config(&UpstreamConfig { url, timeout_secs: Some(1) }).unwrap();

    let err = source.fetch().await.unwrap_err();
    assert!(matches!(err, FetchError::Timeout(_)), "got {err:?}");
}

#[tokio::test]
async fn test_unreachable_upstream_is_a_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let port = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
    let url = Url::parse(&format!("http://127.0.0.1:{port}/v3.1/all")).unwrap();
    let source = HttpSource::new(reqwest::Client::new(), url);

    let err = source.fetch().await.unwrap_err();
    assert!(matches!(err, FetchError::Transport(_)), "got {err:?}");
}
