use crate::domain::model::EventKind;
use crate::domain::ports::{ConfigProvider, EventSink};
use crate::utils::error::{GatewayError, Result};
use reqwest::Client;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const AUTH_HEADER: &str = "X-Internal-Auth";

/// Result of a delivery that reached the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Accepted { status: u16 },
    Rejected { status: u16, body: String },
}

#[derive(Debug, Clone)]
struct ForwarderSettings {
    engine_url: String,
    api_key: Option<String>,
    max_retries: u32,
    backoff_base: Duration,
}

/// Relays events to the engine's ingress routes.
///
/// Clones share one HTTP client and one open/closed flag.
#[derive(Debug, Clone)]
pub struct EngineForwarder {
    client: Client,
    settings: Arc<ForwarderSettings>,
    closed: Arc<AtomicBool>,
}

impl EngineForwarder {
    pub fn new<C: ConfigProvider>(config: &C) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        if config.internal_api_key().is_none() {
            tracing::warn!("INTERNAL_API_KEY is not set; engine requests will carry no auth header");
        }

        Ok(Self {
            client,
            settings: Arc::new(ForwarderSettings {
                engine_url: config.engine_url().trim_end_matches('/').to_string(),
                api_key: config.internal_api_key().map(str::to_string),
                max_retries: config.max_retries().max(1),
                backoff_base: config.backoff_base(),
            }),
            closed: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn engine_url(&self) -> &str {
        &self.settings.engine_url
    }

    pub fn ingress_url(&self, kind: EventKind) -> String {
        format!("{}/ingress/{}", self.settings.engine_url, kind)
    }

    /// Delay before retrying after the given (1-based) failed attempt.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.settings
            .backoff_base
            .saturating_mul(2u32.saturating_pow(attempt))
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Stop accepting new events. Deliveries already in flight run to completion.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            tracing::debug!("Engine forwarder closed");
        }
    }

    /// Fire-and-forget: spawns the delivery and returns immediately.
    pub fn forward_event(&self, kind: EventKind, payload: serde_json::Value) {
        if self.is_closed() {
            tracing::debug!("Dropping {} event, forwarder is closed", kind);
            return;
        }

        let forwarder = self.clone();
        tokio::spawn(async move {
            // outcome already logged inside deliver
            let _ = forwarder.deliver(kind, &payload).await;
        });
    }

    /// POST the payload to the engine, retrying transport failures with exponential backoff.
    ///
    /// Any HTTP response ends the loop; error statuses are logged but never retried.
    pub async fn deliver(&self, kind: EventKind, payload: &serde_json::Value) -> Result<Delivery> {
        let url = self.ingress_url(kind);
        let max_retries = self.settings.max_retries;

        for attempt in 1..=max_retries {
            let mut request = self.client.post(&url).json(payload);
            if let Some(key) = &self.settings.api_key {
                request = request.header(AUTH_HEADER, key);
            }

            match request.send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if status.as_u16() >= 400 {
                        let body = resp.text().await.unwrap_or_default();
                        tracing::error!("Engine Error {}: {}", status.as_u16(), body);
                        return Ok(Delivery::Rejected {
                            status: status.as_u16(),
                            body,
                        });
                    }
                    tracing::debug!("Forwarded {} event ({})", kind, status.as_u16());
                    return Ok(Delivery::Accepted {
                        status: status.as_u16(),
                    });
                }
                Err(e) => {
                    let err = GatewayError::HttpError(e);
                    if !err.is_retryable() {
                        tracing::error!("Unexpected error forwarding to Engine: {}", err);
                        return Err(err);
                    }

                    tracing::warn!(
                        "Network hiccup to Engine (attempt {}/{}): {}",
                        attempt,
                        max_retries,
                        err
                    );
                    if attempt < max_retries {
                        tokio::time::sleep(self.backoff_delay(attempt)).await;
                    }
                }
            }
        }

        tracing::error!(
            "Failed to forward {} to Engine after {} attempts.",
            kind,
            max_retries
        );
        Err(GatewayError::DeliveryFailed {
            event: kind.to_string(),
            attempts: max_retries,
        })
    }
}

impl EventSink for EngineForwarder {
    fn forward(&self, kind: EventKind, payload: serde_json::Value) {
        self.forward_event(kind, payload);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockConfig {
        engine_url: String,
        api_key: Option<String>,
        max_retries: u32,
        backoff_base: Duration,
    }

    impl MockConfig {
        fn new(engine_url: &str) -> Self {
            Self {
                engine_url: engine_url.to_string(),
                api_key: Some("secret".to_string()),
                max_retries: 3,
                backoff_base: Duration::from_secs(1),
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn engine_url(&self) -> &str {
            &self.engine_url
        }

        fn internal_api_key(&self) -> Option<&str> {
            self.api_key.as_deref()
        }

        fn max_retries(&self) -> u32 {
            self.max_retries
        }

        fn backoff_base(&self) -> Duration {
            self.backoff_base
        }

        fn request_timeout(&self) -> Duration {
            Duration::from_secs(5)
        }
    }

    #[test]
    fn test_ingress_url_trims_trailing_slash() {
        let forwarder = EngineForwarder::new(&MockConfig::new("http://engine:8000/")).unwrap();
        assert_eq!(
            forwarder.ingress_url(EventKind::Command),
            "http://engine:8000/ingress/command"
        );
        assert_eq!(forwarder.engine_url(), "http://engine:8000");
    }

    #[test]
    fn test_backoff_doubles_per_attempt() {
        let forwarder = EngineForwarder::new(&MockConfig::new("http://engine")).unwrap();
        assert_eq!(forwarder.backoff_delay(1), Duration::from_secs(2));
        assert_eq!(forwarder.backoff_delay(2), Duration::from_secs(4));
        assert_eq!(forwarder.backoff_delay(3), Duration::from_secs(8));
    }

    #[test]
    fn test_close_is_shared_between_clones() {
        let forwarder = EngineForwarder::new(&MockConfig::new("http://engine")).unwrap();
        let clone = forwarder.clone();
        assert!(!clone.is_closed());
        forwarder.close();
        assert!(clone.is_closed());
    }

    #[test]
    fn test_zero_retries_still_attempts_once() {
        let mut config = MockConfig::new("http://engine");
        config.max_retries = 0;
        let forwarder = EngineForwarder::new(&config).unwrap();
        assert_eq!(forwarder.settings.max_retries, 1);
    }
}
