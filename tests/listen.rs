//! End-to-end tests over a real TCP listener.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::net::TcpListener;

use routekit::config::ApiConfig;
use routekit::{Api, ApiError, ApiRequest, Controller, RouteTable, ServerError, Shutdown};

struct Ping;

impl Ping {
    async fn ping(self: Arc<Self>, req: ApiRequest) -> Result<Value, ApiError> {
        Ok(serde_json::json!({ "pong": true, "request_id": req.request_id() }))
    }
}

impl Controller for Ping {
    fn configure(routes: &mut RouteTable<Self>) {
        routes.get("ping", "/ping", Self::ping);
    }
}

#[tokio::test]
async fn test_serve_and_graceful_shutdown() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let mut api = Api::default();
    api.add_controller(Ping);
    let server = tokio::spawn(api.serve_with_shutdown(listener, shutdown.wait()));

    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap();

    let res = client
        .get(format!("http://{}/ping", addr))
        .send()
        .await
        .expect("server unreachable");
    assert_eq!(res.status(), 200);

    let request_id = res
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .expect("response carries a request id");

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["pong"], true);
    assert_eq!(body["request_id"], request_id.as_str());

    shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_client_request_id_is_kept() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let mut api = Api::default();
    api.add_controller(Ping);
    let server = tokio::spawn(api.serve_with_shutdown(listener, shutdown.wait()));

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let res = client
        .get(format!("http://{}/ping", addr))
        .header("x-request-id", "trace-me-123")
        .send()
        .await
        .unwrap();

    assert_eq!(res.headers()["x-request-id"], "trace-me-123");

    shutdown.trigger();
    let _ = tokio::time::timeout(Duration::from_secs(5), server).await;
}

#[tokio::test]
async fn test_listen_reports_bind_failure() {
    let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = taken.local_addr().unwrap().port();

    let mut config = ApiConfig::default();
    config.server.host = "127.0.0.1".to_string();
    let mut api = Api::new(config);
    api.add_controller(Ping);

    match api.listen(port).await {
        Err(ServerError::Bind { address, .. }) => assert_eq!(address, format!("127.0.0.1:{port}")),
        other => panic!("expected bind failure, got {other:?}"),
    }
}
