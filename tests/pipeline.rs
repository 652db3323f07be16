//! End-to-end tests against a running server.

use reqwest::StatusCode;
use serde_json::Value;

mod common;

#[tokio::test]
async fn health_check_is_open() {
    let server = common::spawn_server(common::test_config()).await;

    let res = common::client().get(server.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let vary: Vec<_> = res
        .headers()
        .get_all("vary")
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert!(vary.contains(&"Authorization".to_string()));

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "available");
    assert_eq!(body["environment"], "development");

    server.stop().await.unwrap();
}

#[tokio::test]
async fn profile_requires_a_valid_token() {
    let server = common::spawn_server(common::test_config()).await;
    let client = common::client();

    let res = client.get(server.url("/v1/users/profile")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(server.url("/v1/users/profile"))
        .bearer_auth("forged.token.value")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.headers()["www-authenticate"], "Bearer");

    let res = client
        .get(server.url("/v1/users/profile"))
        .bearer_auth(common::token_for(common::USER_ID))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["public_id"], common::USER_ID);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn client_is_throttled_after_burst() {
    let mut config = common::test_config();
    config.limiter.requests_per_second = 0.01;
    config.limiter.burst = 3;
    let server = common::spawn_server(config).await;
    let client = common::client();

    for _ in 0..3 {
        let res = client.get(server.url("/")).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    let res = client.get(server.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    // 0.01 tokens per second: the next token is 100s away.
    assert_eq!(res.headers()["retry-after"], "100");

    server.stop().await.unwrap();
}

#[tokio::test]
async fn shutdown_stops_accepting() {
    let server = common::spawn_server(common::test_config()).await;
    let url = server.url("/");
    let client = common::client();

    assert!(client.get(&url).send().await.is_ok());
    server.stop().await.unwrap();

    assert!(client.get(&url).send().await.is_err());
}
