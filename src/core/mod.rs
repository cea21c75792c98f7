pub mod commands;
pub mod dispatch;
pub mod forwarder;
pub mod status;

pub use crate::domain::model::EventKind;
pub use crate::domain::ports::{ConfigProvider, EventSink};
pub use crate::utils::error::Result;
