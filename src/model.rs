// Core structs: RawListing, Listing, SearchResults, TrackResponse and the error types
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Price as it arrives on the wire. The backend sends numbers, some scrapers
/// send numeric strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawPrice {
    Number(f64),
    Text(String),
}

/// A single offer exactly as returned by the aggregation API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawListing {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    pub site: String,
    #[serde(default)]
    pub price: Option<RawPrice>,
    #[serde(default)]
    pub original_price: Option<f64>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: Option<f64>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub in_stock: Option<bool>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub alert_threshold: Option<f64>,
    #[serde(default)]
    pub has_alert: Option<bool>,
}

/// A normalized offer from one site.
///
/// Serializes back into the API's camelCase shape so it can be posted to
/// `/api/track` unchanged. `base_product_id` is a client-side grouping key and
/// never goes over the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub title: String,
    pub image: String,
    pub site: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    pub rating: f64,
    pub review_count: u32,
    pub url: String,
    pub in_stock: bool,
    pub last_updated: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub base_product_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_threshold: Option<f64>,
    pub has_alert: bool,
}

/// Wrapped search payload some deployments return instead of a bare array.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEnvelope {
    pub products: Vec<serde_json::Value>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub total_results: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct SearchResults {
    pub query: String,
    pub listings: Vec<Listing>,
    pub total_results: usize,
    /// Items dropped because they could not be normalized.
    pub skipped: usize,
}

/// Acknowledgement from the track, untrack and price-alert endpoints. The
/// Flask backend omits `success` on plain 2xx replies, so absence means yes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrackResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

fn default_success() -> bool {
    true
}

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("invalid price: {0}")]
    InvalidPrice(String),
    #[error("malformed listing: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("could not decode response: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum AlertError {
    #[error("invalid alert value {value} for {kind} alert")]
    InvalidValue { kind: &'static str, value: f64 },
}

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Alert(#[from] AlertError),
    #[error("server rejected request: {0}")]
    Rejected(String),
    #[error("product is not tracked: {0}")]
    NotTracked(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
