use price_compare::alerts::AlertConfig;
use price_compare::analyzer::{
    HistorySummary, ProductGroup, compare, discount_percent, mock_history,
};
use price_compare::api::{ApiClient, PriceApi};
use price_compare::config::{AppConfig, load_config};
use price_compare::model::SearchResults;
use price_compare::tracker::TrackerState;
use price_compare::utils::format_price;

use chrono::Utc;
use futures::future::join_all;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Panic occurred: {:?}", panic_info);
    }));

    let queries: Vec<String> = std::env::args().skip(1).collect();
    if queries.is_empty() {
        eprintln!("usage: price-compare <query> [<query> ...]");
        return;
    }

    let config = match load_config("config.json") {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("Config load error ({}), using defaults", e);
            AppConfig::default()
        }
    };

    let api = match ApiClient::new(&config) {
        Ok(api) => api,
        Err(e) => {
            error!("Failed to create API client: {}", e);
            return;
        }
    };

    let mut tracker = TrackerState::new();
    if let Err(e) = tracker.refresh(&api).await {
        warn!("Failed to load tracked products: {}", e);
    }

    // Run all searches concurrently
    let tasks: Vec<_> = queries.iter().map(|q| api.search(q)).collect();
    let results = join_all(tasks).await;

    for (query, result) in queries.iter().zip(results) {
        match result {
            Ok(results) => print_results(&results, &tracker, &config),
            Err(e) => error!("Search '{}' failed: {}", query, e),
        }
    }

    info!("Done.");
}

fn print_results(results: &SearchResults, tracker: &TrackerState, config: &AppConfig) {
    println!(
        "\n=== {} ({} results) ===",
        results.query, results.total_results
    );

    for listing in &results.listings {
        let marker = if tracker.is_tracked(&listing.id) { "*" } else { " " };
        let discount = match discount_percent(listing) {
            d if d > 0 => format!(" ({}% off)", d),
            _ => String::new(),
        };
        println!(
            "{} [{}] {} - {}{}  ★{:.1} ({})",
            marker,
            listing.site,
            listing.title,
            format_price(listing.price),
            discount,
            listing.rating,
            listing.review_count
        );

        // tracked copy carries the alert and the price it was tracked at
        if let Some(tracked) = tracker.get(&listing.id) {
            let alert = AlertConfig::from_threshold(
                tracked.has_alert,
                tracked.alert_threshold,
                tracked.price,
            );
            if let Some(alert) = alert {
                let hit = alert.is_triggered(tracked.price, listing.price, &[]);
                let status = if hit { " [TRIGGERED]" } else { "" };
                println!("    alert: {}{}", alert.description(), status);
            }
        }
    }

    let groups = compare(&results.listings);
    info!("'{}': {} cross-site groups", results.query, groups.len());
    for group in &groups {
        print_group(group, config);
    }
}

fn print_group(group: &ProductGroup, config: &AppConfig) {
    println!(
        "\n  Cross-site comparison: {} (available on {} platforms)",
        group.title,
        group.listings.len()
    );
    println!(
        "  Save {} ({}% difference)",
        format_price(group.savings()),
        group.savings_percent()
    );

    for listing in group.sorted_by_price() {
        let best = if group.is_lowest_price(listing) { "  <- best price" } else { "" };
        println!(
            "    {:<10} {}{}",
            listing.site,
            format_price(listing.price),
            best
        );
    }

    let history = mock_history(
        group.lowest_price,
        "all",
        config.history_days,
        Utc::now().date_naive(),
        &mut rand::rng(),
    );
    if let Some(summary) = HistorySummary::from_points(group.lowest_price, &history) {
        println!(
            "  {}d range {} - {}, change {}%",
            config.history_days,
            format_price(summary.min_price),
            format_price(summary.max_price),
            summary.change_percent
        );
    }
}
