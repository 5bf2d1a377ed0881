use clap::Parser;
use product_row_monitor::activity_log::{BoundedActivityLog, NullView, TerminalView};
use product_row_monitor::config::Config;
use product_row_monitor::integration::{HttpProductSource, JsonLinesHost, Session, StartOutcome};
use std::error::Error;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;

/// Watches deal product rows and looks each one up in the product API.
/// Row-change events are read from stdin, one JSON object per line.
#[derive(Debug, Parser)]
#[command(name = "product-row-monitor", version)]
struct Cli {
    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Product API endpoint, `{id}` is replaced with the product id
    #[arg(long)]
    endpoint: Option<String>,
    /// Entries kept in the activity panel
    #[arg(long)]
    capacity: Option<usize>,
    /// Deal id of the placement
    #[arg(long)]
    entity_id: Option<String>,
    /// Do not draw the panel; rely on the log output only
    #[arg(long)]
    no_panel: bool,
}

impl Cli {
    fn config(&self) -> Result<Config, Box<dyn Error>> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(endpoint) = &self.endpoint {
            config.api.endpoint = endpoint.clone();
        }
        if let Some(capacity) = self.capacity {
            config.capacity = capacity;
        }
        if let Some(id) = &self.entity_id {
            config.placement.entity_id = Some(id.clone());
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    // the panel owns stdout; keep the mirror quiet unless asked
    let default_filter = if cli.no_panel { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(e) = run(cli).await {
        log::error!("{}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = cli.config()?;
    log::debug!("config: {:?}", config);

    let log = if cli.no_panel {
        BoundedActivityLog::with_view(config.capacity, NullView)
    } else {
        BoundedActivityLog::with_view(config.capacity, TerminalView::new("Product rows"))
    };
    let source = Arc::new(HttpProductSource::new(&config.api));
    let session = Session::new(source, log);
    let host = JsonLinesHost::new(config.placement.to_info());

    if let StartOutcome::Listening { deal_id } = session.start(&host).await? {
        let delivered = host.pump(BufReader::new(tokio::io::stdin())).await?;
        log::info!("deal {}: {} event(s) received, input closed", deal_id, delivered);
    }

    session
        .shutdown(Duration::from_millis(config.shutdown_grace_ms))
        .await;
    Ok(())
}
