// Adapters layer: concrete bindings to external systems (Discord gateway, HTTP listener).

pub mod discord;
pub mod http;
