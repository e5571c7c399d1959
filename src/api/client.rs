use crate::api::traits::PriceApi;
use crate::config::AppConfig;
use crate::model::{ApiError, Listing, SearchEnvelope, SearchResults, TrackResponse};
use crate::normalizer::{Source, normalize_all};

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        // ngrok tunnels serve an interstitial page without this
        headers.insert("ngrok-skip-browser-warning", HeaderValue::from_static("true"));

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "unknown".into());
            warn!("API responded [{}]: {}", status, body);
            return Err(ApiError::Status(status.as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Accepts both payload shapes the backend has shipped: a bare array of
/// listings or a `{products, query, totalResults}` envelope.
pub fn parse_search_payload(query: &str, payload: Value) -> Result<SearchResults, ApiError> {
    match payload {
        Value::Array(items) => {
            let batch = normalize_all(items, Source::Search);
            Ok(SearchResults {
                query: query.to_string(),
                total_results: batch.listings.len(),
                listings: batch.listings,
                skipped: batch.skipped,
            })
        }
        Value::Object(_) => {
            let envelope: SearchEnvelope =
                serde_json::from_value(payload).map_err(|e| ApiError::Decode(e.to_string()))?;
            let batch = normalize_all(envelope.products, Source::Server);
            Ok(SearchResults {
                query: envelope.query.unwrap_or_else(|| query.to_string()),
                total_results: envelope.total_results.unwrap_or(batch.listings.len()),
                listings: batch.listings,
                skipped: batch.skipped,
            })
        }
        other => Err(ApiError::Decode(format!("unexpected search payload: {other}"))),
    }
}

#[async_trait::async_trait]
impl PriceApi for ApiClient {
    async fn search(&self, query: &str) -> Result<SearchResults, ApiError> {
        info!("Searching for '{}'", query);
        let request = self
            .client
            .get(self.url("/api/search"))
            .query(&[("query", query)]);
        let payload: Value = self.send(request).await?;
        let results = parse_search_payload(query, payload)?;

        if results.skipped > 0 {
            warn!(
                "Search '{}': skipped {} malformed listings",
                query, results.skipped
            );
        }
        info!("Search '{}': {} listings", query, results.listings.len());
        Ok(results)
    }

    async fn track(&self, listing: &Listing) -> Result<TrackResponse, ApiError> {
        debug!("Tracking {}", listing.id);
        let request = self.client.post(self.url("/api/track")).json(listing);
        self.send(request).await
    }

    async fn tracked(&self) -> Result<Vec<Listing>, ApiError> {
        let items: Vec<Value> = self.send(self.client.get(self.url("/api/tracked"))).await?;
        let batch = normalize_all(items, Source::Server);
        if batch.skipped > 0 {
            warn!("Tracked list: skipped {} malformed listings", batch.skipped);
        }
        Ok(batch.listings)
    }

    async fn untrack(&self, product_id: &str) -> Result<TrackResponse, ApiError> {
        debug!("Untracking {}", product_id);
        let request = self
            .client
            .post(self.url("/api/untrack"))
            .json(&json!({ "productId": product_id }));
        self.send(request).await
    }

    async fn set_price_alert(
        &self,
        product_id: &str,
        target_price: f64,
    ) -> Result<TrackResponse, ApiError> {
        debug!("Setting alert for {} at {}", product_id, target_price);
        let request = self
            .client
            .post(self.url("/api/price-alert"))
            .json(&json!({ "productId": product_id, "targetPrice": target_price }));
        self.send(request).await
    }
}
