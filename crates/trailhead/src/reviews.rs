// SPDX-FileCopyrightText: 2026 Trailhead Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `trailhead reviews add` and `trailhead reviews list` command implementations.

use std::sync::Arc;

use clap::Args;

use trailhead_config::TrailheadConfig;
use trailhead_core::{Identity, ListingId, ReviewStore, TrailheadError};
use trailhead_reviews::{Cursor, PageFetch, ReviewAggregator, ReviewPage, ReviewPager};
use trailhead_storage::SqliteReviewStore;

#[derive(Args, Debug)]
pub struct AddArgs {
    #[arg(long)]
    pub listing: String,

    /// Session token of the reviewer. Must be non-empty.
    #[arg(long)]
    pub token: String,

    /// Display name shown with the review.
    #[arg(long, default_value = "")]
    pub author: String,

    /// Star rating, 1 to 5.
    #[arg(long)]
    pub rating: u8,

    #[arg(long)]
    pub comment: String,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[arg(long)]
    pub listing: String,

    /// Continue after this cursor from a previous page.
    #[arg(long)]
    pub cursor: Option<String>,

    /// Reviews per page. Defaults to `reviews.page_size`.
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Output structured JSON.
    #[arg(long)]
    pub json: bool,
}

/// Run the `trailhead reviews add` command.
pub async fn run_add(config: &TrailheadConfig, args: AddArgs) -> Result<(), TrailheadError> {
    let store = Arc::new(SqliteReviewStore::open(&config.storage).await?);
    let aggregator = ReviewAggregator::new(store.clone(), &config.reviews);
    let listing_id = ListingId::from(args.listing.as_str());
    let identity = Identity::new(args.token, args.author);

    let outcome = async {
        let doc = aggregator
            .record_review(&listing_id, Some(&identity), args.rating, &args.comment)
            .await?;
        let aggregate = store
            .aggregate(&listing_id)
            .await?
            .ok_or_else(|| TrailheadError::ListingNotFound(listing_id.0.clone()))?;
        Ok::<_, TrailheadError>((doc, aggregate))
    }
    .await;
    drop(aggregator);
    close(store).await?;

    let (doc, aggregate) = outcome?;
    println!(
        "Recorded review {} for {}: now {:.1} from {} reviews",
        doc.id, listing_id, aggregate.rating(), aggregate.review_count
    );
    Ok(())
}

/// Run the `trailhead reviews list` command.
///
/// Each invocation is a fresh pager, so a `--cursor` from an earlier run
/// continues that feed.
pub async fn run_list(config: &TrailheadConfig, args: ListArgs) -> Result<(), TrailheadError> {
    let cursor = args.cursor.as_deref().map(Cursor::parse).transpose()?;
    let store = Arc::new(SqliteReviewStore::open(&config.storage).await?);
    let pager = ReviewPager::new(store.clone(), &config.reviews);
    let listing_id = ListingId::from(args.listing.as_str());
    let page_size = args.page_size.unwrap_or(pager.default_page_size());

    let fetched = match &cursor {
        Some(cursor) => pager.next_page(&listing_id, cursor, page_size).await,
        None => pager.first_page(&listing_id, page_size).await,
    };
    drop(pager);
    close(store).await?;

    let page = match fetched? {
        PageFetch::Loaded(page) => page,
        PageFetch::Ignored | PageFetch::Exhausted => ReviewPage {
            items: Vec::new(),
            cursor: None,
            has_more: false,
        },
    };

    if args.json {
        let out = serde_json::to_string_pretty(&page)
            .map_err(|e| TrailheadError::Internal(format!("failed to encode page: {e}")))?;
        println!("{out}");
    } else {
        print!("{}", render_page(&page));
    }
    Ok(())
}

pub(crate) async fn close(store: Arc<SqliteReviewStore>) -> Result<(), TrailheadError> {
    match Arc::try_unwrap(store) {
        Ok(store) => store.close().await,
        // Still shared; the connection closes on drop.
        Err(_) => Ok(()),
    }
}

fn render_page(page: &ReviewPage) -> String {
    let mut out = String::new();
    if page.items.is_empty() {
        out.push_str("No reviews.\n");
    }
    for doc in &page.items {
        out.push_str(&format!(
            "{} {} {} {}\n    {}\n",
            doc.created_at.format("%Y-%m-%d %H:%M"),
            stars(doc.rating),
            doc.author_display_name,
            doc.id,
            doc.comment
        ));
    }
    if let (true, Some(cursor)) = (page.has_more, &page.cursor) {
        out.push_str(&format!("\nMore reviews: --cursor {cursor}\n"));
    }
    out
}

fn stars(rating: u8) -> String {
    let filled = usize::from(rating.min(5));
    format!("{}{}", "*".repeat(filled), ".".repeat(5 - filled))
}
