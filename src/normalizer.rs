// Listing identity: stable ids, grouping keys and field defaults
use crate::model::{Listing, NormalizeError, RawListing, RawPrice};
use crate::utils::parse_datetime;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};

pub const DEFAULT_RATING: f64 = 4.0;
pub const DEFAULT_REVIEW_COUNT: u32 = 100;
pub const BASE_ID_MAX_LEN: usize = 50;

/// Where a raw listing came from. Bare search results get their id derived on
/// the client; tracked lists and wrapped search payloads keep the id the
/// server sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Search,
    Server,
}

#[derive(Debug, Default)]
pub struct NormalizedBatch {
    pub listings: Vec<Listing>,
    pub skipped: usize,
}

/// Resolves a wire price into a finite number.
pub fn parse_price(raw: Option<&RawPrice>) -> Result<f64, NormalizeError> {
    let value = match raw {
        None => return Err(NormalizeError::InvalidPrice("missing".into())),
        Some(RawPrice::Number(n)) => *n,
        Some(RawPrice::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| NormalizeError::InvalidPrice(format!("{s:?}")))?,
    };
    if !value.is_finite() {
        return Err(NormalizeError::InvalidPrice(value.to_string()));
    }
    Ok(value)
}

/// Builds the tracking id: `site-title-price`, where only the first space of
/// the title becomes a hyphen, the title is lowercased, the price is floored,
/// and anything outside `[a-zA-Z0-9-]` is then dropped.
///
/// The backend builds ids the same way, so this has to stay bit-exact.
pub fn derive_id(site: &str, title: &str, price: f64) -> Result<String, NormalizeError> {
    if !price.is_finite() {
        return Err(NormalizeError::InvalidPrice(price.to_string()));
    }
    let title = title.replacen(' ', "-", 1).to_lowercase();
    let price = integer_string(price.floor());
    let id = format!("{site}-{title}-{price}");
    Ok(id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect())
}

/// Prints a whole number the way the backend's number-to-string does: plain
/// digits below 1e21, exponent form from there on, and `-0` as `0`.
fn integer_string(value: f64) -> String {
    let value = value + 0.0;
    if value.abs() >= 1e21 {
        format!("{value:e}")
    } else {
        format!("{value:.0}")
    }
}

/// The `\s` class of the backend's regex engine. Narrower than
/// `char::is_whitespace` in one place (U+0085) and wider in another (U+FEFF).
pub fn is_title_space(c: char) -> bool {
    match c {
        '\t' | '\n' | '\u{0B}' | '\u{0C}' | '\r' | ' ' | '\u{A0}' | '\u{1680}' => true,
        '\u{2000}'..='\u{200A}' => true,
        '\u{2028}' | '\u{2029}' | '\u{202F}' | '\u{205F}' | '\u{3000}' | '\u{FEFF}' => true,
        _ => false,
    }
}

/// Coarse grouping key: lowercase, keep only `[a-z0-9]` and whitespace,
/// collapse whitespace runs into one hyphen, cut to 50 characters.
pub fn base_product_id(title: &str) -> String {
    let mut key = String::with_capacity(title.len());
    let mut in_space = false;

    for c in title.to_lowercase().chars() {
        if is_title_space(c) {
            if !in_space {
                key.push('-');
                in_space = true;
            }
        } else if c.is_ascii_lowercase() || c.is_ascii_digit() {
            key.push(c);
            in_space = false;
        }
    }

    // only ASCII is left, so byte truncation is char truncation
    key.truncate(BASE_ID_MAX_LEN);
    key
}

pub fn normalize_listing(
    raw: RawListing,
    source: Source,
    now: DateTime<Utc>,
) -> Result<Listing, NormalizeError> {
    let price = parse_price(raw.price.as_ref())?;

    let id = match (source, raw.id.as_deref()) {
        (Source::Server, Some(id)) if !id.is_empty() => id.to_string(),
        _ => derive_id(&raw.site, &raw.title, price)?,
    };

    let rating = raw
        .rating
        .filter(|r| r.is_finite() && *r != 0.0)
        .unwrap_or(DEFAULT_RATING);
    let review_count = raw
        .review_count
        .filter(|c| c.is_finite() && *c > 0.0)
        .map(|c| c as u32)
        .unwrap_or(DEFAULT_REVIEW_COUNT);
    let in_stock = match source {
        Source::Search => true,
        Source::Server => raw.in_stock.unwrap_or(true),
    };
    let last_updated = raw
        .last_updated
        .as_deref()
        .and_then(parse_datetime)
        .unwrap_or(now);

    Ok(Listing {
        id,
        base_product_id: base_product_id(&raw.title),
        title: raw.title,
        image: raw.image.unwrap_or_default(),
        site: raw.site,
        price,
        original_price: raw.original_price.filter(|p| p.is_finite()),
        rating,
        review_count,
        url: raw.url.unwrap_or_default(),
        in_stock,
        last_updated,
        alert_threshold: raw.alert_threshold.filter(|p| p.is_finite()),
        has_alert: raw.has_alert.unwrap_or(false),
    })
}

/// Decodes and normalizes a JSON batch item by item. A bad item is logged
/// and skipped; it never sinks the rest of the batch.
pub fn normalize_all(items: Vec<Value>, source: Source) -> NormalizedBatch {
    let now = Utc::now();
    let mut batch = NormalizedBatch::default();

    for (index, item) in items.into_iter().enumerate() {
        let result = serde_json::from_value::<RawListing>(item)
            .map_err(|e| NormalizeError::Malformed(e.to_string()))
            .and_then(|raw| normalize_listing(raw, source, now));

        match result {
            Ok(listing) => {
                debug!(
                    "Listing #{} -> id={} base={}",
                    index, listing.id, listing.base_product_id
                );
                batch.listings.push(listing);
            }
            Err(e) => {
                warn!("Skipping listing #{}: {}", index, e);
                batch.skipped += 1;
            }
        }
    }

    batch
}
