use crate::config::ApiConfig;
use crate::integration::types::{LookupError, ProductData};
use async_trait::async_trait;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::Value;
use std::time::Duration;

/// Abstracts the external product-data API
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// Single attempt, no retry
    async fn fetch(&self, id: &str) -> Result<ProductData, LookupError>;
}

/// `ProductSource` backed by one HTTP GET per id
pub struct HttpProductSource {
    agent: ureq::Agent,
    endpoint: String,
    token: Option<String>,
}

impl HttpProductSource {
    pub fn new(api: &ApiConfig) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(api.timeout_ms.map(Duration::from_millis))
            .build()
            .into();
        Self {
            agent,
            endpoint: api.endpoint.clone(),
            token: api.token.clone(),
        }
    }

    /// `{id}` in the endpoint is replaced by the encoded id. Without the
    /// placeholder every id hits the same URL.
    pub fn url_for(&self, id: &str) -> String {
        let encoded = utf8_percent_encode(id, NON_ALPHANUMERIC).to_string();
        self.endpoint.replace("{id}", &encoded)
    }
}

#[async_trait]
impl ProductSource for HttpProductSource {
    async fn fetch(&self, id: &str) -> Result<ProductData, LookupError> {
        let agent = self.agent.clone();
        let url = self.url_for(id);
        let token = self.token.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            let items = get_items(&agent, &url, token.as_deref())?;
            find_product(&items, &id)
        })
        .await
        .map_err(|e| LookupError::Transport(e.to_string()))?
    }
}

fn get_items(agent: &ureq::Agent, url: &str, token: Option<&str>) -> Result<Vec<Value>, LookupError> {
    let mut request = agent.get(url).header("Content-Type", "application/json");
    if let Some(token) = token {
        request = request.header("Authorization", format!("Bearer {}", token));
    }
    let mut response = request.call().map_err(|e| match e {
        ureq::Error::StatusCode(code) => {
            log::error!("HTTP error {} for {}", code, url);
            LookupError::Http(code)
        }
        other => LookupError::Transport(other.to_string()),
    })?;
    response
        .body_mut()
        .read_json::<Vec<Value>>()
        .map_err(|e| LookupError::Decode(e.to_string()))
}

/// Finds the item whose `id` loosely equals `id` and extracts price and stock
pub fn find_product(items: &[Value], id: &str) -> Result<ProductData, LookupError> {
    let item = items
        .iter()
        .find(|item| item.get("id").is_some_and(|v| loose_eq(v, id)))
        .ok_or(LookupError::NotFound)?;
    let field = |name: &str| item.get(name).filter(|v| !v.is_null()).cloned();
    match (field("price"), field("stock")) {
        (Some(price), Some(stock)) => Ok(ProductData { price, stock }),
        _ => Err(LookupError::Incomplete),
    }
}

/// Numeric ids compare by value against the trimmed string (an empty
/// string counts as `0`), string ids compare exactly.
pub fn loose_eq(value: &Value, id: &str) -> bool {
    match value {
        Value::String(s) => s == id,
        Value::Number(n) => {
            let trimmed = id.trim();
            let parsed = if trimmed.is_empty() {
                Ok(0.0)
            } else {
                trimmed.parse::<f64>()
            };
            match (n.as_f64(), parsed) {
                (Some(a), Ok(b)) => a == b,
                _ => false,
            }
        }
        _ => false,
    }
}

/// Strings without quotes, everything else as JSON
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
