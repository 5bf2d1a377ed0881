use crate::integration::host::{HostBridge, RowChangeHandler};
use crate::integration::types::{BindError, Capabilities, PlacementInfo, ROW_CHANGE_EVENT};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::io;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// One line of the event stream
#[derive(Debug, Deserialize)]
struct HostEvent {
    command: String,
    #[serde(default)]
    params: Value,
}

/// Host that takes its placement from configuration and reads row-change
/// events as JSON lines: `{"command": "rowUpdated", "params": {"products": [...]}}`
pub struct JsonLinesHost {
    placement: PlacementInfo,
    handler: Mutex<Option<Arc<dyn RowChangeHandler>>>,
}

impl JsonLinesHost {
    pub fn new(placement: PlacementInfo) -> Self {
        Self {
            placement,
            handler: Mutex::new(None),
        }
    }

    fn handler(&self) -> Option<Arc<dyn RowChangeHandler>> {
        self.handler
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Feeds every line of `reader` to the bound handler until EOF.
    /// Returns how many events were delivered.
    pub async fn pump<R>(&self, reader: R) -> io::Result<usize>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        let mut delivered = 0;
        let mut line_no = 0;
        while let Some(line) = lines.next_line().await? {
            line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            let event: HostEvent = match serde_json::from_str(&line) {
                Ok(event) => event,
                Err(e) => {
                    log::warn!("skipping line {}: {}", line_no, e);
                    continue;
                }
            };
            let Some(handler) = self.handler() else {
                log::warn!("no handler bound, dropping `{}` event", event.command);
                continue;
            };
            handler.on_row_change(&event.command, &event.params);
            delivered += 1;
            // let spawned lookups run between events
            tokio::task::yield_now().await;
        }
        Ok(delivered)
    }
}

#[async_trait]
impl HostBridge for JsonLinesHost {
    fn capabilities(&self) -> Capabilities {
        Capabilities::full()
    }

    async fn placement_info(&self) -> PlacementInfo {
        self.placement.clone()
    }

    async fn bind(&self, event: &str, handler: Arc<dyn RowChangeHandler>) -> Result<(), BindError> {
        if event != ROW_CHANGE_EVENT {
            return Err(BindError::UnknownEvent(event.to_string()));
        }
        *self.handler.lock().unwrap_or_else(|e| e.into_inner()) = Some(handler);
        log::debug!("bound {}", event);
        Ok(())
    }
}
