// Domain layer: event models and ports. No Discord or HTTP types leak in here.

pub mod model;
pub mod ports;
