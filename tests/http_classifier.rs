use axum::{http::HeaderMap, routing::post, Json, Router};
use moodreel::sentiment::{Classifier, ClassifierLoader, HttpClassifierLoader, SentimentError};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::time::Duration;

/// Stand-in inference endpoint on an ephemeral port.
async fn fake_endpoint(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

async fn sentiment(headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        == Some("Bearer hf_test");
    let text = body["inputs"].as_str().unwrap_or_default();
    let positive = if authorized && text.contains("love") { 0.97 } else { 0.12 };
    Json(json!([[
        { "label": "NEGATIVE", "score": 1.0 - positive },
        { "label": "POSITIVE", "score": positive },
    ]]))
}

#[tokio::test]
async fn test_classifies_through_http_endpoint() {
    let addr = fake_endpoint(Router::new().route("/classify", post(sentiment))).await;
    let loader = HttpClassifierLoader::new(
        &format!("http://{}/classify", addr),
        Some("hf_test"),
        Duration::from_secs(5),
    );
    let classifier = loader.load().await.unwrap();

    let ranked = classifier.classify("I love it").await.unwrap();
    assert_eq!(ranked[0].label, "POSITIVE");
    assert!(ranked[0].score > 0.9);

    let ranked = classifier.classify("meh").await.unwrap();
    assert_eq!(ranked[0].label, "NEGATIVE");
}

#[tokio::test]
async fn test_server_error_is_a_classification_failure() {
    let router = Router::new().route(
        "/classify",
        post(|| async { (axum::http::StatusCode::SERVICE_UNAVAILABLE, "model loading") }),
    );
    let addr = fake_endpoint(router).await;
    let loader =
        HttpClassifierLoader::new(&format!("http://{}/classify", addr), None, Duration::from_secs(5));
    let classifier = loader.load().await.unwrap();

    assert!(matches!(
        classifier.classify("hello").await,
        Err(SentimentError::Status(503))
    ));
}

#[tokio::test]
async fn test_unreachable_endpoint_fails_the_call_not_the_load() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let loader =
        HttpClassifierLoader::new(&format!("http://{}/classify", addr), None, Duration::from_secs(2));
    let classifier = loader.load().await.unwrap();
    assert!(matches!(
        classifier.classify("hello").await,
        Err(SentimentError::Request(_))
    ));
}
