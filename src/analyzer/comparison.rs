use crate::analyzer::grouping::group_by_base_id;
use crate::model::Listing;
use serde::Serialize;

/// The same product offered on several sites.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductGroup {
    pub base_product_id: String,
    pub title: String,
    pub image: String,
    pub listings: Vec<Listing>,
    pub lowest_price: f64,
    pub highest_price: f64,
    pub price_range: f64,
}

impl ProductGroup {
    /// Returns `None` for fewer than two listings; a single offer has nothing
    /// to be compared against.
    pub fn from_listings(listings: Vec<Listing>) -> Option<Self> {
        if listings.len() < 2 {
            return None;
        }
        let lowest_price = listings
            .iter()
            .map(|l| l.price)
            .fold(f64::INFINITY, f64::min);
        let highest_price = listings
            .iter()
            .map(|l| l.price)
            .fold(f64::NEG_INFINITY, f64::max);
        let first = &listings[0];

        Some(Self {
            base_product_id: first.base_product_id.clone(),
            title: first.title.clone(),
            image: first.image.clone(),
            lowest_price,
            highest_price,
            price_range: highest_price - lowest_price,
            listings,
        })
    }

    pub fn savings(&self) -> f64 {
        self.price_range
    }

    pub fn savings_percent(&self) -> i64 {
        if self.highest_price <= 0.0 {
            return 0;
        }
        (self.savings() / self.highest_price * 100.0).round() as i64
    }

    /// Cheapest first. Ties keep their first-seen order.
    pub fn sorted_by_price(&self) -> Vec<&Listing> {
        let mut sorted: Vec<&Listing> = self.listings.iter().collect();
        sorted.sort_by(|a, b| a.price.total_cmp(&b.price));
        sorted
    }

    pub fn is_lowest_price(&self, listing: &Listing) -> bool {
        listing.price == self.lowest_price
    }
}

/// Groups listings and materializes every multi-site group.
pub fn compare(listings: &[Listing]) -> Vec<ProductGroup> {
    group_by_base_id(listings)
        .into_iter()
        .filter_map(ProductGroup::from_listings)
        .collect()
}

/// Percent off the original price, rounded. Zero when there is no usable
/// original price.
pub fn discount_percent(listing: &Listing) -> i64 {
    match listing.original_price {
        Some(original) if original > 0.0 => {
            ((original - listing.price) / original * 100.0).round() as i64
        }
        _ => 0,
    }
}
