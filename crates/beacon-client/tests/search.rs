//! Integration tests for lost-item search against a wiremock server.

use beacon_client::{BeaconClient, ClientError, FailureKind, SearchPipeline};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn pipeline(server: &MockServer) -> SearchPipeline {
    let client = BeaconClient::with_base_url(&server.uri(), 5).expect("client construction");
    SearchPipeline::new(client)
}

#[tokio::test]
async fn search_posts_description_with_null_location_and_keeps_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/match"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"description": "red backpack", "location": null})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "matches": [
                {
                    "image_url": "/uploads/7.jpg",
                    "confidence": 0.91,
                    "location": "Stamp Student Union",
                    "timestamp": "2025-11-08T14:30:00Z",
                    "item_id": "7"
                },
                {
                    "image_url": "/uploads/3.jpg",
                    "confidence": 0.42,
                    "location": "Tydings Hall",
                    "latitude": 38.9851,
                    "longitude": -76.9441,
                    "timestamp": "2025-11-07T09:12:44",
                    "item_id": 3
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let matches = pipeline(&server)
        .search("  red backpack  ", None)
        .await
        .expect("search should succeed");

    let ids: Vec<&str> = matches.iter().map(|m| m.item_id.as_str()).collect();
    assert_eq!(ids, ["7", "3"]);
    assert!(matches[0].coordinate.is_none());
    let coordinate = matches[1].coordinate.expect("second match has a coordinate");
    assert!((coordinate.latitude - 38.9851).abs() < f64::EPSILON);
}

#[tokio::test]
async fn search_sends_trimmed_location_when_given() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/match"))
        .and(body_json(json!({"description": "blue umbrella", "location": "McKeldin Library"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"matches": []})))
        .expect(1)
        .mount(&server)
        .await;

    let matches = pipeline(&server)
        .search("blue umbrella", Some(" McKeldin Library "))
        .await
        .expect("search should succeed");

    assert!(matches.is_empty());
}

#[tokio::test]
async fn empty_description_fails_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = pipeline(&server).search("   ", Some("Tawes Hall")).await.unwrap_err();

    assert!(matches!(err, ClientError::Validation(_)), "got: {err:?}");
    assert_eq!(err.kind(), FailureKind::Validation);
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/match"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let err = pipeline(&server).search("keys", None).await.unwrap_err();

    assert!(
        matches!(err, ClientError::UnexpectedStatus { status: 503, .. }),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn single_best_match_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/match"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "best_match": {
                "image_url": "/uploads/1.jpg",
                "confidence": 0.7,
                "location": "Hornbake Library",
                "timestamp": "2025-11-08T14:30:00Z",
                "item_id": "1"
            }
        })))
        .mount(&server)
        .await;

    let err = pipeline(&server).search("water bottle", None).await.unwrap_err();

    assert_eq!(err.kind(), FailureKind::MalformedResponse);
}

#[tokio::test]
async fn invalid_records_are_dropped_not_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/match"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "matches": [
                {"image_url": "/a.jpg", "confidence": 1.7, "location": "X",
                 "timestamp": "2025-11-08T14:30:00Z", "item_id": "a"},
                {"image_url": "/b.jpg", "confidence": 0.6, "location": "Y",
                 "timestamp": "2025-11-08T14:30:00Z", "item_id": "b"},
                {"confidence": 0.6}
            ]
        })))
        .mount(&server)
        .await;

    let matches = pipeline(&server).search("wallet", None).await.expect("search");

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].item_id, "b");
}
