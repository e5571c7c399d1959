// Mocked price history. The API has no history endpoint yet, so charts get
// a plausible series scattered around the current price.
use chrono::{Days, NaiveDate};
use rand::Rng;
use serde::Serialize;

/// Maximum relative swing of a mocked point in either direction.
pub const MAX_VARIATION: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
    pub site: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistorySummary {
    pub min_price: f64,
    pub max_price: f64,
    /// Current price minus the oldest point.
    pub change: f64,
    pub change_percent: i64,
    pub savings: f64,
    pub savings_percent: i64,
}

/// `days + 1` points, oldest first, ending on `today`. Days that would fall
/// before the earliest representable date are left out.
pub fn mock_history<R: Rng>(
    current_price: f64,
    site: &str,
    days: u32,
    today: NaiveDate,
    rng: &mut R,
) -> Vec<PricePoint> {
    let reachable = today.signed_duration_since(NaiveDate::MIN).num_days();
    let span = u64::from(days).min(reachable.max(0) as u64);

    (0..=span)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .map(|date| {
            let variation = rng.random_range(-MAX_VARIATION..MAX_VARIATION);
            PricePoint {
                date,
                price: (current_price * (1.0 + variation)).round(),
                site: site.to_string(),
            }
        })
        .collect()
}

impl HistorySummary {
    pub fn from_points(current_price: f64, points: &[PricePoint]) -> Option<Self> {
        let first = points.first()?;
        let min_price = points.iter().map(|p| p.price).fold(f64::INFINITY, f64::min);
        let max_price = points.iter().map(|p| p.price).fold(f64::NEG_INFINITY, f64::max);
        let change = current_price - first.price;
        let savings = max_price - min_price;

        Some(Self {
            min_price,
            max_price,
            change,
            change_percent: percent_of(change, first.price),
            savings,
            savings_percent: percent_of(savings, max_price),
        })
    }

    pub fn is_trending_down(&self) -> bool {
        self.change < 0.0
    }
}

fn percent_of(part: f64, whole: f64) -> i64 {
    if whole == 0.0 {
        return 0;
    }
    (part / whole * 100.0).round() as i64
}
