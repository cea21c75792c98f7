use crate::core::status::GatewayStatus;
use crate::utils::error::Result;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingResponse {
    pub status: String,
    pub bot_connected: bool,
}

/// Liveness check for the hosting platform. Always 200; the bot state is informational.
async fn ping(State(status): State<Arc<GatewayStatus>>) -> Json<PingResponse> {
    Json(PingResponse {
        status: "ok".to_string(),
        bot_connected: status.is_connected(),
    })
}

pub fn router(status: Arc<GatewayStatus>) -> Router {
    Router::new().route("/ping", get(ping)).with_state(status)
}

pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("🌐 Health endpoint listening on http://{}/ping", addr);
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn get_ping(app: Router) -> (StatusCode, PingResponse) {
        let response = app
            .oneshot(Request::builder().uri("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_ping_reports_disconnected_bot() {
        let status = Arc::new(GatewayStatus::new());
        let (code, body) = get_ping(router(status)).await;

        assert_eq!(code, StatusCode::OK);
        assert_eq!(
            body,
            PingResponse {
                status: "ok".to_string(),
                bot_connected: false,
            }
        );
    }

    #[tokio::test]
    async fn test_ping_tracks_gateway_status() {
        let status = Arc::new(GatewayStatus::new());
        status.mark_ready();
        let (_, body) = get_ping(router(status.clone())).await;
        assert!(body.bot_connected);

        status.mark_disconnected();
        let (_, body) = get_ping(router(status)).await;
        assert!(!body.bot_connected);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = router(Arc::new(GatewayStatus::new()));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
