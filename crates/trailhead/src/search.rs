// SPDX-FileCopyrightText: 2026 Trailhead Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `trailhead search` command implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use tracing::warn;

use trailhead_config::TrailheadConfig;
use trailhead_core::{Listing, TrailheadError};
use trailhead_search::{
    FacetOption, JsonFileListings, SearchEngine, SearchResults, StoreAggregates,
};
use trailhead_storage::SqliteReviewStore;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// JSON array of listing records.
    #[arg(long)]
    pub listings: PathBuf,

    /// Filter query string, e.g. `q=cottage&category=Stays&sort=rating`.
    #[arg(long, default_value = "")]
    pub query: String,

    /// Print at most this many results.
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output structured JSON.
    #[arg(long)]
    pub json: bool,
}

/// Run the `trailhead search` command.
///
/// Ratings and review counts come from the review database when one exists,
/// so reviews recorded with `reviews add` show up in results and in the
/// rating sort. A listing file that cannot be read produces a degraded
/// (empty) result rather than an error, matching what an interactive client
/// would render.
pub async fn run_search(config: &TrailheadConfig, args: SearchArgs) -> Result<(), TrailheadError> {
    let engine = SearchEngine::new(&config.search);
    let criteria = engine.codec().decode(&args.query);
    let listings = JsonFileListings::new(&args.listings);

    let mut results = match open_store(config).await {
        Some(store) => {
            let source = StoreAggregates::new(listings, store.clone());
            let results = engine.search_source(&source, &criteria).await;
            drop(source);
            crate::reviews::close(store).await?;
            results
        }
        None => engine.search_source(&listings, &criteria).await,
    };
    if let Some(limit) = args.limit {
        results = results.limited(limit);
    }

    if args.json {
        let out = serde_json::to_string_pretty(&results)
            .map_err(|e| TrailheadError::Internal(format!("failed to encode results: {e}")))?;
        println!("{out}");
        return Ok(());
    }

    let canonical = engine.codec().encode(&criteria);
    print!("{}", render(&results, &canonical));
    Ok(())
}

/// The review store, if its database file exists and opens.
async fn open_store(config: &TrailheadConfig) -> Option<Arc<SqliteReviewStore>> {
    let path = &config.storage.database_path;
    if !Path::new(path).exists() {
        return None;
    }
    match SqliteReviewStore::open(&config.storage).await {
        Ok(store) => Some(Arc::new(store)),
        Err(e) => {
            warn!(path = %path, error = %e, "review store unavailable, serving upstream ratings");
            None
        }
    }
}

fn render(results: &SearchResults, canonical_query: &str) -> String {
    let mut out = String::new();
    if results.degraded {
        out.push_str("Listings are unavailable right now. Try again.\n");
        return out;
    }

    let query = if canonical_query.is_empty() {
        "(none)"
    } else {
        canonical_query
    };
    out.push_str(&format!(
        "{} of {} listings (filters: {query})\n\n",
        results.results.len(),
        results.total
    ));
    for listing in &results.results {
        out.push_str(&format_listing(listing));
        out.push('\n');
    }

    out.push_str(&format!("\nCategories: {}\n", format_facet(&results.facets.categories)));
    out.push_str(&format!("Locations:  {}\n", format_facet(&results.facets.locations)));
    out.push_str(&format!("Amenities:  {}\n", format_facet(&results.facets.amenities)));
    out
}

fn format_listing(listing: &Listing) -> String {
    let price = if listing.is_free {
        "Free".to_string()
    } else {
        format!("{:.0}", listing.price_amount)
    };
    let distance = listing.distance.as_deref().unwrap_or("-");
    format!(
        "  {:<24} {:<8} {:<10} {:>8}  {:.1} ({})  {}",
        listing.title,
        listing.category,
        listing.location,
        price,
        listing.rating,
        listing.review_count,
        distance
    )
}

fn format_facet(options: &[FacetOption]) -> String {
    if options.is_empty() {
        return "-".to_string();
    }
    options
        .iter()
        .map(|o| format!("{} ({})", o.value, o.count))
        .collect::<Vec<_>>()
        .join(", ")
}
