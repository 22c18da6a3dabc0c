use httpmock::Method::POST;
use reqwest::StatusCode;
use serde_json::{json, Value};

use super::utils::Testbed;

#[tokio::test]
async fn deploy_uploads_materialized_template() {
    let bed = Testbed::start().await;
    let upload = bed
        .store
        .mock_async(|when, then| {
            when.method(POST)
                .path("/upload")
                .header("Authorization", "Bearer store-token")
                .header("X-Name", "mysite%2Eethonline2021char%2Eeth")
                .body_contains("mysite.ethonline2021char.eth");
            then.status(200).json_body(json!({ "cid": "bafysite" }));
        })
        .await;

    let response = bed
        .client
        .post(bed.url("/ipfs-deploy"))
        .json(&json!({ "version": "1.0", "subdomain": "My.Site" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "hash": "bafysite" }));
    upload.assert_async().await;
}

#[tokio::test]
async fn deploy_v2_substitutes_links_and_avatar() {
    let bed = Testbed::start().await;
    let upload = bed
        .store
        .mock_async(|when, then| {
            when.method(POST)
                .path("/upload")
                .body_contains("wee.ethonline2021char.eth")
                .body_contains("https://example.com/avatar.png")
                .body_contains("%7B%22twitter%22%3A%22%40wee%22%7D");
            then.status(200).json_body(json!({ "cid": "bafyallinone" }));
        })
        .await;

    let response = bed
        .client
        .post(bed.url("/ipfs-deploy"))
        .json(&json!({
            "version": "2.0",
            "subdomain": "wee",
            "links": { "twitter": "@wee" },
            "avatar": "https://example.com/avatar.png"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["hash"], "bafyallinone");
    upload.assert_async().await;
}

#[tokio::test]
async fn deploy_rejects_unknown_version() {
    let bed = Testbed::start().await;
    let upload = bed
        .store
        .mock_async(|when, then| {
            when.method(POST).path("/upload");
            then.status(200).json_body(json!({ "cid": "bafynever" }));
        })
        .await;

    let response = bed
        .client
        .post(bed.url("/ipfs-deploy"))
        .json(&json!({ "version": "9.9", "subdomain": "wee" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["type"], "BadRequest");
    assert_eq!(upload.hits_async().await, 0);
}

#[tokio::test]
async fn deploy_gives_up_after_retries() {
    let bed = Testbed::start().await;
    let upload = bed
        .store
        .mock_async(|when, then| {
            when.method(POST).path("/upload");
            then.status(503).body("busy");
        })
        .await;

    let response = bed
        .client
        .post(bed.url("/ipfs-deploy"))
        .json(&json!({ "version": "1.0", "subdomain": "wee" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    // One attempt plus the two configured retries.
    assert_eq!(upload.hits_async().await, 3);
}

#[tokio::test]
async fn deploy_does_not_retry_rejected_uploads() {
    let bed = Testbed::start().await;
    let upload = bed
        .store
        .mock_async(|when, then| {
            when.method(POST).path("/upload");
            then.status(401).body("bad token");
        })
        .await;

    let response = bed
        .client
        .post(bed.url("/ipfs-deploy"))
        .json(&json!({ "version": "1.0", "subdomain": "wee" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(upload.hits_async().await, 1);
}
