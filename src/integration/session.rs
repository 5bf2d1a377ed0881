use crate::activity_log::{ActivitySink, Category, LogMessage};
use crate::integration::host::{HostBridge, RowChangeHandler};
use crate::integration::lookup::{ProductSource, display_value};
use crate::integration::types::{
    LookupError, ROW_CHANGE_EVENT, SessionError, StartOutcome, parse_rows,
};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Wires the host bridge, the product source and the activity log.
/// Producers share the log through the `Arc` handle held here.
pub struct Session<S, L>
where
    S: ProductSource + 'static,
    L: ActivitySink + 'static,
{
    source: Arc<S>,
    log: Arc<L>,
    in_flight: Mutex<Vec<JoinHandle<()>>>,
    outstanding: Arc<AtomicUsize>,
}

impl<S, L> Session<S, L>
where
    S: ProductSource + 'static,
    L: ActivitySink + 'static,
{
    pub fn new(source: Arc<S>, log: Arc<L>) -> Arc<Self> {
        Arc::new(Self {
            source,
            log,
            in_flight: Mutex::new(Vec::new()),
            outstanding: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Probe, read placement, bind the row-change handler
    pub async fn start<H>(self: &Arc<Self>, host: &H) -> Result<StartOutcome, SessionError>
    where
        H: HostBridge + ?Sized,
    {
        self.log.append(
            "Application loaded. Checking the host environment...".into(),
            Category::Info,
        );

        let missing = host.capabilities().missing();
        if !missing.is_empty() {
            self.log.append(
                LogMessage::new()
                    .text("Host bridge is not available. Missing: ")
                    .emphasis(missing.join(", "), Category::Error),
                Category::Error,
            );
            return Err(SessionError::HostUnavailable { missing });
        }

        let placement = host.placement_info().await;
        let Some(deal_id) = placement.entity_id() else {
            self.log.append(
                LogMessage::new()
                    .text("Not embedded in a deal detail placement (got ")
                    .emphasis(&placement.placement, Category::Info)
                    .text("). Configure the app as a deal detail tab."),
                Category::Error,
            );
            return Ok(StartOutcome::NotInPlacement);
        };
        self.log.append(
            LogMessage::new()
                .text("Embedded in deal ")
                .emphasis(&deal_id, Category::Info),
            Category::Success,
        );
        self.log.append(
            "Listening for product row changes...".into(),
            Category::Info,
        );

        let handler: Arc<dyn RowChangeHandler> = self.clone();
        if let Err(e) = host.bind(ROW_CHANGE_EVENT, handler).await {
            self.log.append(
                LogMessage::new()
                    .text(format!("Failed to bind {}: ", ROW_CHANGE_EVENT))
                    .emphasis(e, Category::Error),
                Category::Error,
            );
            return Ok(StartOutcome::BindFailed);
        }
        self.log.append(
            format!(
                "Event {} bound. Change the deal's products to see lookups.",
                ROW_CHANGE_EVENT
            )
            .into(),
            Category::Success,
        );
        Ok(StartOutcome::Listening { deal_id })
    }

    /// Validates the batch and spawns one lookup per row, in array order.
    /// Returns the number of lookups issued without waiting for any.
    pub fn dispatch(&self, command: &str, params: &Value) -> usize {
        log::debug!("row change: command={} params={}", command, params);
        self.log.append(
            LogMessage::new()
                .text("Row change detected. Command: ")
                .emphasis(command, Category::Info),
            Category::Info,
        );

        let rows = match parse_rows(params) {
            Ok(rows) => rows,
            Err(e) => {
                self.log.append(
                    format!("No valid product data in event: {}", e).into(),
                    Category::Error,
                );
                return 0;
            }
        };
        self.log.append(
            LogMessage::new()
                .text("Products currently in the deal (")
                .emphasis(rows.len(), Category::Info)
                .text("):"),
            Category::Success,
        );

        let mut spawned = Vec::with_capacity(rows.len());
        for row in &rows {
            self.log.append(
                LogMessage::new()
                    .text("- ")
                    .emphasis(row, Category::Info),
                Category::Info,
            );
            let (source, log, id) = (self.source.clone(), self.log.clone(), row.id.clone());
            let outstanding = self.outstanding.clone();
            outstanding.fetch_add(1, Ordering::AcqRel);
            spawned.push(tokio::spawn(async move {
                lookup(source, log, id).await;
                outstanding.fetch_sub(1, Ordering::AcqRel);
            }));
        }

        let issued = spawned.len();
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        in_flight.retain(|h| !h.is_finished());
        in_flight.extend(spawned);
        issued
    }

    /// Lookups issued that have not reported yet
    pub fn pending(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    /// Waits until every spawned lookup has reported
    pub async fn wait_idle(&self) {
        loop {
            let handles = std::mem::take(
                &mut *self.in_flight.lock().unwrap_or_else(|e| e.into_inner()),
            );
            if handles.is_empty() {
                return;
            }
            for handle in handles {
                if let Err(e) = handle.await {
                    log::warn!("lookup task ended abnormally: {}", e);
                }
            }
        }
    }

    /// Gives in-flight lookups `grace` to finish, then closes the log.
    /// Anything completing after that is dropped.
    pub async fn shutdown(&self, grace: Duration) {
        if tokio::time::timeout(grace, self.wait_idle()).await.is_err() {
            log::info!(
                "shutting down with {} lookup(s) still in flight",
                self.pending()
            );
        }
        self.log.close();
    }
}

impl<S, L> RowChangeHandler for Session<S, L>
where
    S: ProductSource + 'static,
    L: ActivitySink + 'static,
{
    fn on_row_change(&self, command: &str, params: &Value) {
        self.dispatch(command, params);
    }
}

async fn lookup<S, L>(source: Arc<S>, log: Arc<L>, id: String)
where
    S: ProductSource + 'static,
    L: ActivitySink + 'static,
{
    match source.fetch(&id).await {
        Ok(data) => log.append(
            LogMessage::new()
                .text("   -> Product API for ID ")
                .emphasis(&id, Category::Info)
                .text(": Price: ")
                .emphasis(display_value(&data.price), Category::Success)
                .text(", Stock: ")
                .emphasis(display_value(&data.stock), Category::Success),
            Category::Success,
        ),
        Err(LookupError::NotFound) => log.append(
            LogMessage::new()
                .text("Product ID ")
                .emphasis(&id, Category::Info)
                .text(" not found in product API."),
            Category::Error,
        ),
        Err(e) => {
            log::debug!("lookup for {} failed: {:?}", id, e);
            log.append(
                LogMessage::new()
                    .text("   -> Product API error for ID ")
                    .emphasis(&id, Category::Info)
                    .text(": ")
                    .emphasis(e, Category::Error),
                Category::Error,
            )
        }
    }
}
