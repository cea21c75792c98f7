use discord_gateway::adapters::http::PingResponse;
use discord_gateway::config::toml_config::TomlConfig;
use discord_gateway::{CliArgs, GatewayApp, GatewayConfig};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

fn tokenless_config() -> GatewayConfig {
    let args = CliArgs {
        engine_url: Some("http://127.0.0.1:9".to_string()),
        internal_api_key: Some("secret".to_string()),
        ..CliArgs::default()
    };
    GatewayConfig::resolve(&args, TomlConfig::default()).unwrap()
}

#[tokio::test]
async fn test_health_served_without_discord_token() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = GatewayApp::new(tokenless_config());
    let status = app.status();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let run = app.run_with_listener(listener, async move {
        let _ = stop_rx.await;
    });

    let client = async move {
        let body: PingResponse = reqwest::get(format!("http://{}/ping", addr))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let _ = stop_tx.send(());
        body
    };

    let (result, body) = tokio::join!(run, client);

    assert!(result.is_ok());
    assert_eq!(body.status, "ok");
    assert!(!body.bot_connected);
    assert!(!status.is_connected());
}

#[tokio::test]
async fn test_shutdown_signal_stops_server() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let app = GatewayApp::new(tokenless_config());

    // already-resolved shutdown future: the app should start and stop cleanly
    let result = app.run_with_listener(listener, async {}).await;
    assert!(result.is_ok());
}
