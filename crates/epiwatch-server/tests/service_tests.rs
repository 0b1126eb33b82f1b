//! Router-level tests: one-shot requests against the in-memory pipeline.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use epiwatch_core::config::IngestConfig;
use epiwatch_core::Result;
use epiwatch_engine::{Fetch, Ingestor};
use epiwatch_server::routes;
use epiwatch_store::SqliteStore;
use http_body_util::BodyExt;
use tower::ServiceExt;

const GLOBAL_MARKER: &str = "全球疫情";
const COUNTRY_MARKER: &str = "中国疫情";

struct StaticFetcher(String);

impl Fetch for StaticFetcher {
    fn fetch_page(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

fn page() -> String {
    format!(
        r#"<html><body>
        <div class="block">
          <span class="today-title">{country}</span>
          <span class="today-time">数据更新</span>
          <span class="today-time">最后更新时间 2020-03-01 10:00:00</span>
          <div class="prod"><span>Hubei</span><span>67103</span><span>2803</span><span>33757</span></div>
          <div class="prod"><span>Guangdong</span><span>1350</span><span>7</span><span>1101</span></div>
        </div>
        <div class="area-box">
          <div class="summary"><span class="area">Hubei</span><span>67103</span></div>
          <div class="head"><span>城市</span><span>确诊</span><span>死亡</span><span>治愈</span></div>
          <div class="city"><span>Wuhan</span><span>49122</span><span>2195</span><span>24890</span></div>
        </div>
        <div class="block">
          <span class="today-title">{global}</span>
          <span class="today-time">数据更新</span>
          <span class="today-time">最后更新时间 2020-03-01 12:30:00</span>
          <div class="prod"><span>Korea</span><span>3736</span><span>18</span><span>30</span></div>
        </div>
        </body></html>"#,
        country = COUNTRY_MARKER,
        global = GLOBAL_MARKER,
    )
}

fn app() -> axum::Router {
    let ingestor = Arc::new(Ingestor::new(
        SqliteStore::in_memory().unwrap(),
        StaticFetcher(page()),
        IngestConfig::default(),
    ));
    routes::router(ingestor)
}

/// Extract the `(ok, updated)` pair from a refresh response body.
async fn refresh_fields(response: axum::response::Response) -> (bool, bool) {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (
        value["ok"].as_bool().unwrap(),
        value["updated"].as_bool().unwrap(),
    )
}

#[tokio::test]
async fn health_answers_ok() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn refresh_global_reports_update() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/refresh/global")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(refresh_fields(response).await, (true, true));
}

#[tokio::test]
async fn repeated_refresh_is_ok_but_not_updated() {
    let app = app();
    let first = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/refresh/country")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(refresh_fields(first).await, (true, true));

    let second = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/refresh/country")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    // Steady state: the pass completed, nothing was written
    assert_eq!(refresh_fields(second).await, (true, false));
}

#[tokio::test]
async fn refresh_province_by_path() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/refresh/province/Hubei")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(refresh_fields(response).await, (true, true));
}

#[tokio::test]
async fn unknown_province_reports_a_failed_pass() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/refresh/province/Atlantis")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(refresh_fields(response).await, (false, false));
}
