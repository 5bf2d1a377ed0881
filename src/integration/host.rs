use crate::integration::types::{BindError, Capabilities, PlacementInfo};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Receives row-change events from the host. Must return quickly: work
/// that waits on the network is spawned, not awaited.
pub trait RowChangeHandler: Send + Sync {
    fn on_row_change(&self, command: &str, params: &Value);
}

/// The CRM platform as seen from inside the embedded app
#[async_trait]
pub trait HostBridge: Send + Sync {
    /// Availability probe for the entry points the app needs
    fn capabilities(&self) -> Capabilities;
    async fn placement_info(&self) -> PlacementInfo;
    /// Registers `handler` for `event`. Called once at startup.
    async fn bind(&self, event: &str, handler: Arc<dyn RowChangeHandler>) -> Result<(), BindError>;
}
