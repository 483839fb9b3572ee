mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::spawn_gateway(common::config_for("http://127.0.0.1:9")).await?;
    let client = common::client();

    let res = client.get(format!("{}/health", server.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["ok"], true, "unexpected body: {}", body);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["upstream"], "http://127.0.0.1:9");
    Ok(())
}

#[tokio::test]
async fn unknown_path_is_json_not_found() -> Result<()> {
    let server = common::spawn_gateway(common::config_for("http://127.0.0.1:9")).await?;
    let client = common::client();

    let res = client.get(format!("{}/nope", server.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    Ok(())
}
