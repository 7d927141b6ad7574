mod common;

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use common::{CHAT, FakeChannel, FakeQuotes, eventually, fast_config};
use http_body_util::BodyExt;
use pricewatch::{AppState, config::Settings, routes, services::monitor::Monitor};
use serde_json::json;
use tower::ServiceExt;

fn test_settings() -> Settings {
    Settings {
        host: "127.0.0.1".to_string(),
        port: 0,
        finnhub_api_key: String::new(),
        telegram_token: String::new(),
        webhook_url: None,
        max_workers: 20,
        max_queued_watchers: 100,
        poll_interval_secs: 30,
        retry_backoff_secs: 10,
        notify_backoff_secs: 2,
        max_retries: 5,
        notify_utc_offset_hours: 8,
    }
}

fn test_app() -> (Router, Monitor, Arc<FakeQuotes>, Arc<FakeChannel>) {
    let quotes = FakeQuotes::new();
    let channel = FakeChannel::new();
    let monitor = Monitor::new(quotes.clone(), channel.clone(), fast_config());
    let state = AppState {
        settings: test_settings(),
        monitor: monitor.clone(),
    };
    (routes::app(state), monitor, quotes, channel)
}

fn update(text: &str) -> Request<Body> {
    let body = json!({
        "update_id": 1,
        "message": {
            "message_id": 7,
            "chat": { "id": CHAT.parse::<i64>().unwrap(), "type": "private" },
            "text": text
        }
    });

    Request::builder()
        .method("POST")
        .uri("/bot_webhook/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn response_body_string(res: axum::response::Response) -> String {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&bytes).to_string()
}

#[tokio::test]
async fn health_returns_ok() {
    let (app, ..) = test_app();

    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let res = app.oneshot(req).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(response_body_string(res).await, "ok");
}

#[tokio::test]
async fn unknown_route_is_404() {
    let (app, ..) = test_app();

    let req = Request::builder().uri("/nope").body(Body::empty()).unwrap();
    let res = app.oneshot(req).await.unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_update_is_acknowledged() {
    let (app, _monitor, _quotes, channel) = test_app();

    let req = Request::builder()
        .method("POST")
        .uri("/bot_webhook/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let res = app.oneshot(req).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(channel.sent().is_empty());
}

#[tokio::test]
async fn help_command_replies_with_usage() {
    let (app, _monitor, _quotes, channel) = test_app();

    let res = app.oneshot(update("/help")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let sent = channel.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, CHAT);
    assert!(sent[0].text.contains("/setprice SYMBOL RISE_PRICE FALL_PRICE"));
}

#[tokio::test]
async fn setprice_registers_alert() {
    let (app, monitor, quotes, channel) = test_app();
    quotes.set_price("TSLA", 620.0);

    let res = app.oneshot(update("/setprice tsla 650 600")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    assert_eq!(
        channel.containing("Started monitoring TSLA. Rise target: $650, Fall target: $600").len(),
        1
    );
    let alert = monitor.registry().get("TSLA").await.unwrap();
    assert_eq!(alert.recipient, CHAT);
    assert!(eventually(|| async { monitor.scheduler().running() == 1 }).await);
}

#[tokio::test]
async fn setprice_with_bad_arguments_explains_format() {
    let (app, monitor, _quotes, channel) = test_app();

    app.clone().oneshot(update("/setprice TSLA 650")).await.unwrap();
    app.clone().oneshot(update("/setprice TSLA high low")).await.unwrap();
    app.oneshot(update("/setprice TSLA 650 -1")).await.unwrap();

    assert_eq!(channel.containing("Incorrect command format").len(), 1);
    assert_eq!(channel.containing("Prices need to be numbers").len(), 1);
    assert_eq!(channel.containing("Prices must be positive numbers").len(), 1);
    assert!(monitor.registry().is_empty().await);
}

#[tokio::test]
async fn setprice_for_unknown_symbol_reports_error() {
    let (app, monitor, _quotes, channel) = test_app();

    app.oneshot(update("/setprice ZZZZ 10 5")).await.unwrap();

    assert_eq!(channel.containing("Invalid stock symbol").len(), 1);
    assert!(monitor.registry().is_empty().await);
}

#[tokio::test]
async fn removeprice_reports_outcome() {
    let (app, monitor, quotes, channel) = test_app();
    quotes.set_price("TSLA", 620.0);
    monitor.set_alert(CHAT, "TSLA", 650.0, 600.0).await.unwrap();

    app.clone().oneshot(update("/removeprice TSLA")).await.unwrap();
    app.oneshot(update("/removeprice TSLA")).await.unwrap();

    assert_eq!(channel.containing("Stopped monitoring TSLA.").len(), 1);
    assert_eq!(channel.containing("No active monitoring found for TSLA.").len(), 1);
}

#[tokio::test]
async fn free_text_without_pending_request_is_ignored() {
    let (app, _monitor, _quotes, channel) = test_app();

    app.oneshot(update("650")).await.unwrap();

    assert!(channel.sent().is_empty());
}

#[tokio::test]
async fn reply_after_crossing_adjusts_threshold() {
    let (app, monitor, quotes, channel) = test_app();
    quotes.set_price("AAPL", 250.0);

    app.clone().oneshot(update("/setprice AAPL 200 150")).await.unwrap();
    assert!(eventually(|| async { monitor.pending().count_for_symbol("AAPL").await == 1 }).await);

    app.oneshot(update("320")).await.unwrap();

    assert_eq!(monitor.registry().get("AAPL").await.unwrap().target_rise, 320.0);
    assert_eq!(
        channel.containing("The rise target price for AAPL has been updated to: $320").len(),
        1
    );
}
