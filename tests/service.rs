use forknet::{
    ConfigVariant,
    service::router,
    test_utils::{setup_logging, setup_test_env},
};
use serde_json::{Value, json};
use std::net::SocketAddr;

async fn spawn_service() -> SocketAddr {
    setup_logging();
    let config = ConfigVariant::A.resolve(&setup_test_env());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router(config)).await });
    addr
}

#[tokio::test]
async fn test_healthcheck() {
    let addr = spawn_service().await;
    let resp = reqwest::get(format!("http://{addr}/healthcheck")).await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_config_endpoint() {
    let addr = spawn_service().await;
    let resp = reqwest::get(format!("http://{addr}/config")).await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "solidity": "0.8.19",
            "networks": {
                "hardhat": {
                    "chainId": 1337,
                    "forking": { "url": "https://example.test" }
                }
            }
        })
    );
}

#[tokio::test]
async fn test_unknown_path() {
    let addr = spawn_service().await;
    let resp = reqwest::get(format!("http://{addr}/nope")).await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
}
