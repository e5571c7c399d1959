// Analyzer module: cross-site grouping, comparison stats and price history.

pub mod comparison;
pub mod grouping;
pub mod price_history;

pub use comparison::{ProductGroup, compare, discount_percent};
pub use grouping::group_by_base_id;
pub use price_history::{HistorySummary, PricePoint, mock_history};
