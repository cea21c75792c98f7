use std::sync::atomic::{AtomicBool, Ordering};

/// Whether the Discord gateway session is currently usable.
#[derive(Debug, Default)]
pub struct GatewayStatus {
    connected: AtomicBool,
}

impl GatewayStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_ready(&self) {
        self.connected.store(true, Ordering::Release);
    }

    pub fn mark_disconnected(&self) {
        self.connected.store(false, Ordering::Release);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}
