#![allow(dead_code)]

use anyhow::{Context, Result};
use axum::body::{Body, Bytes};
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use tower::ServiceExt;
use wiremock::MockServer;

use admin_gateway::{app, AppState, GatewayConfig};

pub const COOKIE_NAME: &str = "admin_key";

pub struct TestGateway {
    pub base_url: String,
}

/// Development config pointed at `upstream`.
pub fn config_for(upstream: &str) -> GatewayConfig {
    GatewayConfig::for_upstream(upstream).expect("valid upstream url")
}

/// In-process gateway for `tower::ServiceExt::oneshot`.
pub fn gateway(upstream: &MockServer) -> Router {
    gateway_with(config_for(&upstream.uri()))
}

pub fn gateway_with(config: GatewayConfig) -> Router {
    app(AppState::new(config).expect("client builds"))
}

/// Gateway behind a real socket on an ephemeral port.
pub async fn spawn_gateway(config: GatewayConfig) -> Result<TestGateway> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to bind ephemeral port")?;
    let addr = listener.local_addr()?;
    let app = app(AppState::new(config)?);

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(TestGateway {
        base_url: format!("http://{}", addr),
    })
}

/// Client that reports redirects instead of following them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("client builds")
}

/// Origin that refuses connections.
pub async fn dead_upstream() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{}", addr)
}

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("router is infallible")
}

pub async fn body_bytes(response: Response) -> Bytes {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable")
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).expect("json body")
}

pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok().map(str::to_string))
        .collect()
}
