// SPDX-FileCopyrightText: 2026 Trailhead Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the search engine, review aggregator, and review
//! pager over either the in-memory mock store or a temp SQLite database, with
//! the sample listings registered.

use std::sync::Arc;

use tracing::debug;
use trailhead_config::TrailheadConfig;
use trailhead_config::model::{ReviewsConfig, SearchConfig, StorageConfig};
use trailhead_core::{
    Identity, Listing, ListingId, RatingAggregate, ReviewDocument, ReviewStore, TrailheadError,
};
use trailhead_reviews::{PageFetch, ReviewAggregator, ReviewPager};
use trailhead_search::SearchEngine;
use trailhead_storage::SqliteReviewStore;

use crate::fixtures::sample_listings;
use crate::mock_store::MockReviewStore;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    sqlite: bool,
    listings: Vec<Listing>,
    aggregates: Vec<(ListingId, RatingAggregate)>,
    reviews: ReviewsConfig,
    search: SearchConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            sqlite: false,
            listings: sample_listings(),
            aggregates: Vec::new(),
            reviews: ReviewsConfig {
                initial_backoff_ms: 0,
                ..ReviewsConfig::default()
            },
            search: SearchConfig::default(),
        }
    }

    /// Use a temp-file SQLite store instead of the mock.
    pub fn with_sqlite(mut self) -> Self {
        self.sqlite = true;
        self
    }

    /// Replace the sample listings.
    pub fn with_listings(mut self, listings: Vec<Listing>) -> Self {
        self.listings = listings;
        self
    }

    /// Register an extra listing aggregate in the store.
    pub fn with_aggregate(mut self, listing_id: &str, rating: f64, review_count: u32) -> Self {
        self.aggregates.push((
            ListingId::from(listing_id),
            RatingAggregate::from_rating(rating, review_count),
        ));
        self
    }

    pub fn with_reviews_config(mut self, config: ReviewsConfig) -> Self {
        self.reviews = config;
        self
    }

    pub fn with_search_config(mut self, config: SearchConfig) -> Self {
        self.search = config;
        self
    }

    /// Build the harness and register every listing's aggregate.
    pub async fn build(self) -> Result<TestHarness, TrailheadError> {
        let mut temp_dir = None;
        let mut mock = None;
        let mut storage = StorageConfig::default();

        let store: Arc<dyn ReviewStore> = if self.sqlite {
            let dir = tempfile::TempDir::new().map_err(TrailheadError::store)?;
            storage.database_path = dir.path().join("test.db").to_string_lossy().into_owned();
            let store = SqliteReviewStore::open(&storage).await?;
            temp_dir = Some(dir);
            Arc::new(store)
        } else {
            let store = Arc::new(MockReviewStore::new());
            mock = Some(Arc::clone(&store));
            store
        };

        for listing in &self.listings {
            store.register_listing(&listing.id, listing.aggregate()).await?;
        }
        for (id, aggregate) in &self.aggregates {
            store.register_listing(id, *aggregate).await?;
        }

        debug!(
            store = store.name(),
            listings = self.listings.len() + self.aggregates.len(),
            "test harness ready"
        );

        let config = TrailheadConfig {
            storage,
            search: self.search,
            reviews: self.reviews,
            ..TrailheadConfig::default()
        };

        Ok(TestHarness {
            search: SearchEngine::new(&config.search),
            aggregator: ReviewAggregator::new(Arc::clone(&store), &config.reviews),
            pager: ReviewPager::new(Arc::clone(&store), &config.reviews),
            store,
            mock,
            listings: self.listings,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete review and search environment.
pub struct TestHarness {
    pub store: Arc<dyn ReviewStore>,
    /// Same store as `store` when the harness runs on the mock.
    pub mock: Option<Arc<MockReviewStore>>,
    pub search: SearchEngine,
    pub aggregator: ReviewAggregator,
    pub pager: ReviewPager,
    pub listings: Vec<Listing>,
    pub config: TrailheadConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: Option<tempfile::TempDir>,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// The mock store. Panics when the harness was built with SQLite.
    pub fn mock(&self) -> &MockReviewStore {
        self.mock
            .as_deref()
            .unwrap_or_else(|| panic!("harness was built with SQLite, not the mock store"))
    }

    /// Identity used by [`TestHarness::submit`].
    pub fn identity() -> Identity {
        Identity::new("test-token", "Test Traveller")
    }

    /// Records a review as the default test identity.
    pub async fn submit(
        &self,
        listing_id: &str,
        rating: u8,
        comment: &str,
    ) -> Result<ReviewDocument, TrailheadError> {
        self.aggregator
            .record_review(
                &ListingId::from(listing_id),
                Some(&Self::identity()),
                rating,
                comment,
            )
            .await
    }

    pub async fn aggregate(&self, listing_id: &str) -> Result<RatingAggregate, TrailheadError> {
        self.store
            .aggregate(&ListingId::from(listing_id))
            .await?
            .ok_or_else(|| TrailheadError::ListingNotFound(listing_id.to_string()))
    }

    /// Walks the whole feed page by page and returns every review in order.
    pub async fn read_feed(
        &self,
        listing_id: &str,
        page_size: usize,
    ) -> Result<Vec<ReviewDocument>, TrailheadError> {
        let id = ListingId::from(listing_id);
        let mut all = Vec::new();
        let mut fetch = self.pager.first_page(&id, page_size).await?;
        while let PageFetch::Loaded(page) = fetch {
            all.extend(page.items);
            match (page.has_more, page.cursor) {
                (true, Some(cursor)) => {
                    fetch = self.pager.next_page(&id, &cursor, page_size).await?;
                }
                _ => break,
            }
        }
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builder_registers_sample_listings() {
        let harness = TestHarness::builder().build().await.unwrap();
        let registered = harness.store.listings().await.unwrap();
        assert_eq!(registered.len(), harness.listings.len());
        assert_eq!(harness.aggregate("trek-hampta").await.unwrap().review_count, 112);
    }

    #[tokio::test]
    async fn extra_aggregates_are_registered() {
        let harness = TestHarness::builder()
            .with_listings(Vec::new())
            .with_aggregate("lodge-kaza", 4.0, 10)
            .build()
            .await
            .unwrap();
        let agg = harness.aggregate("lodge-kaza").await.unwrap();
        assert_eq!(agg, RatingAggregate::from_rating(4.0, 10));
        assert_eq!(agg.rating(), 4.0);
    }

    #[tokio::test]
    async fn sqlite_harness_round_trips_a_review() {
        let harness = TestHarness::builder().with_sqlite().build().await.unwrap();
        assert!(harness.mock.is_none());

        harness.submit("guide-kasol", 5, "Knew every trail").await.unwrap();
        let feed = harness.read_feed("guide-kasol", 10).await.unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].author_display_name, "Test Traveller");
    }

    #[tokio::test]
    async fn temp_db_is_unique_per_harness() {
        let h1 = TestHarness::builder().with_sqlite().build().await.unwrap();
        let h2 = TestHarness::builder().with_sqlite().build().await.unwrap();

        h1.submit("cab-airport", 4, "On time").await.unwrap();
        assert_eq!(h1.aggregate("cab-airport").await.unwrap().review_count, 1);
        assert_eq!(h2.aggregate("cab-airport").await.unwrap().review_count, 0);
    }
}
