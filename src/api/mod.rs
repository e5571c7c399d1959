pub mod client;
pub mod traits;

pub use client::{ApiClient, parse_search_payload};
pub use traits::PriceApi;
