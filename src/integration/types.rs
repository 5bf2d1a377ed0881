use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Host event fired when a line item of the deal's product list changes
pub const ROW_CHANGE_EVENT: &str = "onProductRowChange";

/// One element of the event's `products` array. Only `ID` is required;
/// the other fields are display-only and may be missing or null.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProductRow {
    #[serde(rename = "ID", deserialize_with = "product_id")]
    pub id: String,
    #[serde(rename = "PRODUCT_NAME", default, deserialize_with = "optional_text")]
    pub name: Option<String>,
    #[serde(rename = "QUANTITY", default, deserialize_with = "optional_text")]
    pub quantity: Option<String>,
    /// Numeric string as sent by the host
    #[serde(rename = "PRICE", default, deserialize_with = "optional_text")]
    pub price: Option<String>,
    #[serde(rename = "CURRENCY_ID", default, deserialize_with = "optional_text")]
    pub currency: Option<String>,
}

/// Shown in place of a missing or null field
pub const MISSING_FIELD: &str = "-";

impl ProductRow {
    pub fn price_value(&self) -> Option<f64> {
        self.price.as_deref()?.trim().parse().ok()
    }
}

impl fmt::Display for ProductRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |field: &Option<String>| field.as_deref().unwrap_or(MISSING_FIELD).to_string();
        write!(
            f,
            "ID: {}, Name: {}, Qty: {}, Price: ",
            self.id,
            show(&self.name),
            show(&self.quantity)
        )?;
        match self.price_value() {
            Some(p) => write!(f, "{}", p)?,
            None => write!(f, "{}", show(&self.price))?,
        }
        write!(f, " {}", show(&self.currency))
    }
}

/// Numbers render the way the host would print them: `1.0` becomes `"1"`
fn number_text(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        n.as_f64().map(|f| f.to_string()).unwrap_or_else(|| n.to_string())
    }
}

fn product_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) if !s.trim().is_empty() => Ok(s),
        Value::Number(n) => Ok(number_text(&n)),
        other => Err(de::Error::custom(format!("unusable product id {}", other))),
    }
}

fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(number_text(&n))),
        other => Ok(Some(other.to_string())),
    }
}

/// Why a row-change payload was rejected as a whole
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PayloadError {
    #[error("`products` field is missing")]
    MissingProducts,
    #[error("`products` is not an array")]
    NotAnArray,
    #[error("row {index} is malformed: {reason}")]
    Row { index: usize, reason: String },
}

/// Validates the whole batch before any row is processed
pub fn parse_rows(params: &Value) -> Result<Vec<ProductRow>, PayloadError> {
    let products = params
        .get("products")
        .ok_or(PayloadError::MissingProducts)?
        .as_array()
        .ok_or(PayloadError::NotAnArray)?;
    products
        .iter()
        .enumerate()
        .map(|(index, row)| {
            ProductRow::deserialize(row).map_err(|e| PayloadError::Row {
                index,
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Metadata about the slot the app is rendered in
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlacementInfo {
    pub placement: String,
    #[serde(default)]
    pub options: Value,
}

impl PlacementInfo {
    /// The deal id, present only when embedded in a deal detail tab
    pub fn entity_id(&self) -> Option<String> {
        match self.options.get("entityId")? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Result of probing the host bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub call_method: bool,
    pub placement: bool,
}

impl Capabilities {
    pub fn full() -> Self {
        Self {
            call_method: true,
            placement: true,
        }
    }

    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.call_method {
            missing.push("callMethod");
        }
        if !self.placement {
            missing.push("placement");
        }
        missing
    }
}

/// Supplemental data the product API returned for one id
#[derive(Debug, Clone, PartialEq)]
pub struct ProductData {
    pub price: Value,
    pub stock: Value,
}

/// Terminal failure of a single lookup
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("not found in product API")]
    NotFound,
    #[error("product API returned no price or stock")]
    Incomplete,
    #[error("HTTP status {0}")]
    Http(u16),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("unexpected response: {0}")]
    Decode(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BindError {
    #[error("unsupported event `{0}`")]
    UnknownEvent(String),
    #[error("host rejected binding: {0}")]
    Rejected(String),
}

/// Errors that stop the session from starting
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("host bridge unavailable, missing: {}", .missing.join(", "))]
    HostUnavailable { missing: Vec<&'static str> },
}

/// How far startup got when it did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    Listening { deal_id: String },
    NotInPlacement,
    BindFailed,
}
