use crate::model::{ApiError, Listing, SearchResults, TrackResponse};

/// Remote operations of the aggregation backend.
#[async_trait::async_trait]
pub trait PriceApi: Send + Sync {
    async fn search(&self, query: &str) -> Result<SearchResults, ApiError>;
    async fn track(&self, listing: &Listing) -> Result<TrackResponse, ApiError>;
    async fn tracked(&self) -> Result<Vec<Listing>, ApiError>;
    async fn untrack(&self, product_id: &str) -> Result<TrackResponse, ApiError>;
    async fn set_price_alert(
        &self,
        product_id: &str,
        target_price: f64,
    ) -> Result<TrackResponse, ApiError>;
}
