use crate::domain::model::EventKind;
use std::time::Duration;

/// Destination for relayed events. Implementations must not block the caller.
pub trait EventSink: Send + Sync {
    fn forward(&self, kind: EventKind, payload: serde_json::Value);
}

pub trait ConfigProvider: Send + Sync {
    fn engine_url(&self) -> &str;
    fn internal_api_key(&self) -> Option<&str>;
    fn max_retries(&self) -> u32;
    fn backoff_base(&self) -> Duration;
    fn request_timeout(&self) -> Duration;
}
