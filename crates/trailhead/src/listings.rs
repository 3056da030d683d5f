// SPDX-FileCopyrightText: 2026 Trailhead Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `trailhead listings import` command implementation.
//!
//! Seeds the review store with each listing's upstream `{rating, reviewCount}`
//! pair. Listings already known to the store keep their aggregate; only the
//! review aggregator may change it afterwards.

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use trailhead_config::TrailheadConfig;
use trailhead_core::{ListingSource, ReviewStore, TrailheadError};
use trailhead_search::JsonFileListings;
use trailhead_storage::SqliteReviewStore;

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// JSON array of listing records.
    #[arg(long)]
    pub listings: PathBuf,
}

/// Counts from one import run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub registered: usize,
    pub unchanged: usize,
}

pub async fn run_import(config: &TrailheadConfig, args: ImportArgs) -> Result<(), TrailheadError> {
    let source = JsonFileListings::new(&args.listings);
    let store = SqliteReviewStore::open(&config.storage).await?;

    let summary = import(&source, &store).await;
    store.close().await?;
    let summary = summary?;

    println!(
        "Imported {} listings ({} new, {} already registered) into {}",
        summary.registered + summary.unchanged,
        summary.registered,
        summary.unchanged,
        config.storage.database_path
    );
    Ok(())
}

/// Registers every listing from `source` with `store`.
pub async fn import(
    source: &dyn ListingSource,
    store: &dyn ReviewStore,
) -> Result<ImportSummary, TrailheadError> {
    let listings = source.load().await?;
    let mut summary = ImportSummary::default();
    for listing in &listings {
        if store.register_listing(&listing.id, listing.aggregate()).await? {
            summary.registered += 1;
        } else {
            summary.unchanged += 1;
        }
    }
    info!(
        source = source.name(),
        registered = summary.registered,
        unchanged = summary.unchanged,
        "listing import complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    use trailhead_core::{ListingId, RatingAggregate};
    use trailhead_search::StaticListings;
    use trailhead_test_utils::MockReviewStore;
    use trailhead_test_utils::fixtures::sample_listings;

    #[tokio::test]
    async fn import_is_idempotent() {
        let source = StaticListings::new(sample_listings());
        let store = MockReviewStore::new();

        let first = import(&source, &store).await.unwrap();
        assert_eq!(first, ImportSummary { registered: 7, unchanged: 0 });

        let second = import(&source, &store).await.unwrap();
        assert_eq!(second, ImportSummary { registered: 0, unchanged: 7 });
    }

    #[tokio::test]
    async fn import_never_overwrites_an_aggregate() {
        let store = MockReviewStore::new();
        let id = ListingId::from("trek-hampta");
        let moved = RatingAggregate::from_rating(4.7, 113);
        store.set_aggregate(&id, moved).await;

        import(&StaticListings::new(sample_listings()), &store)
            .await
            .unwrap();
        assert_eq!(store.aggregate(&id).await.unwrap(), Some(moved));
    }

    #[tokio::test]
    async fn unreadable_file_is_an_error() {
        let store = MockReviewStore::new();
        let source = JsonFileListings::new("/definitely/not/here.json");
        let err = import(&source, &store).await.unwrap_err();
        assert!(matches!(err, TrailheadError::StoreUnavailable { .. }));
    }
}
