// SPDX-FileCopyrightText: 2026 Trailhead Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`ListingSource`] implementations.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use trailhead_core::{Listing, ListingSource, ReviewStore, TrailheadError};

use crate::ingest::ingest_json;

/// Reads a JSON array of raw listing records from disk on every load.
#[derive(Debug, Clone)]
pub struct JsonFileListings {
    path: PathBuf,
    name: String,
}

impl JsonFileListings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = format!("json:{}", path.display());
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ListingSource for JsonFileListings {
    fn name(&self) -> &str {
        &self.name
    }

    async fn load(&self) -> Result<Vec<Listing>, TrailheadError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(TrailheadError::store)?;
        let listings = ingest_json(&text)?;
        debug!(path = %self.path.display(), count = listings.len(), "loaded listings");
        Ok(listings)
    }
}

/// Fixed in-memory candidate set.
#[derive(Debug, Clone, Default)]
pub struct StaticListings {
    listings: Vec<Listing>,
}

impl StaticListings {
    pub fn new(listings: Vec<Listing>) -> Self {
        Self { listings }
    }
}

#[async_trait]
impl ListingSource for StaticListings {
    fn name(&self) -> &str {
        "static"
    }

    async fn load(&self) -> Result<Vec<Listing>, TrailheadError> {
        Ok(self.listings.clone())
    }
}

/// Serves listings from `inner` with each rating and review count replaced
/// by the aggregate the review store holds for it.
///
/// Listings the store has never registered keep their upstream values. When
/// the store cannot be read the upstream values are served unchanged, so a
/// review outage never takes search down with it.
pub struct StoreAggregates<S> {
    inner: S,
    store: Arc<dyn ReviewStore>,
    name: String,
}

impl<S: ListingSource> StoreAggregates<S> {
    pub fn new(inner: S, store: Arc<dyn ReviewStore>) -> Self {
        let name = format!("{}+{}", inner.name(), store.name());
        Self { inner, store, name }
    }
}

#[async_trait]
impl<S: ListingSource> ListingSource for StoreAggregates<S> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn load(&self) -> Result<Vec<Listing>, TrailheadError> {
        let mut listings = self.inner.load().await?;
        let aggregates: HashMap<_, _> = match self.store.listings().await {
            Ok(aggregates) => aggregates.into_iter().collect(),
            Err(e) => {
                warn!(store = self.store.name(), error = %e, "serving upstream ratings");
                return Ok(listings);
            }
        };

        let mut overlaid = 0usize;
        for listing in &mut listings {
            if let Some(aggregate) = aggregates.get(&listing.id) {
                listing.rating = aggregate.rating();
                listing.review_count = aggregate.review_count;
                overlaid += 1;
            }
        }
        debug!(source = %self.name, overlaid, "applied stored aggregates");
        Ok(listings)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use trailhead_core::{
        AppendOutcome, HealthStatus, ListingId, NewReview, PageKey, RatingAggregate,
        ReviewDocument,
    };

    use super::*;
    use crate::ingest::ingest_json;

    /// Store that only answers `listings()`, or fails it when empty-handed.
    struct AggregateTable(Option<Vec<(ListingId, RatingAggregate)>>);

    #[async_trait]
    impl ReviewStore for AggregateTable {
        fn name(&self) -> &str {
            "table"
        }
        async fn health_check(&self) -> Result<HealthStatus, TrailheadError> {
            unreachable!()
        }
        async fn register_listing(
            &self,
            _: &ListingId,
            _: RatingAggregate,
        ) -> Result<bool, TrailheadError> {
            unreachable!()
        }
        async fn aggregate(&self, _: &ListingId) -> Result<Option<RatingAggregate>, TrailheadError> {
            unreachable!()
        }
        async fn append_review(
            &self,
            _: NewReview,
            _: RatingAggregate,
            _: RatingAggregate,
        ) -> Result<AppendOutcome, TrailheadError> {
            unreachable!()
        }
        async fn reviews_page(
            &self,
            _: &ListingId,
            _: Option<&PageKey>,
            _: usize,
        ) -> Result<Vec<ReviewDocument>, TrailheadError> {
            unreachable!()
        }
        async fn count_reviews(&self, _: &ListingId) -> Result<u64, TrailheadError> {
            unreachable!()
        }
        async fn listings(&self) -> Result<Vec<(ListingId, RatingAggregate)>, TrailheadError> {
            self.0
                .clone()
                .ok_or_else(|| TrailheadError::store("table offline"))
        }
    }

    fn upstream() -> StaticListings {
        StaticListings::new(
            ingest_json(
                r#"[
                  {"id": "cab-1", "type": "Cab", "rating": 3.5, "reviewCount": 0},
                  {"id": "stay-1", "type": "Stay", "rating": 4.2, "reviewCount": 40}
                ]"#,
            )
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn loads_and_normalizes_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": "g-1", "profession": "Guide", "price": "Free", "location": "Leh"}}]"#
        )
        .unwrap();

        let source = JsonFileListings::new(file.path());
        let listings = source.load().await.unwrap();
        assert_eq!(listings.len(), 1);
        assert!(listings[0].is_free);
        assert!(source.name().starts_with("json:"));
    }

    #[tokio::test]
    async fn missing_file_is_store_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonFileListings::new(dir.path().join("absent.json"));
        let err = source.load().await.unwrap_err();
        assert!(matches!(err, TrailheadError::StoreUnavailable { .. }));
    }

    #[tokio::test]
    async fn stored_aggregates_replace_upstream_ratings() {
        let cab = RatingAggregate::EMPTY.with_review(5).with_review(4);
        let table = AggregateTable(Some(vec![(ListingId::from("cab-1"), cab)]));
        let source = StoreAggregates::new(upstream(), Arc::new(table));

        let listings = source.load().await.unwrap();
        assert_eq!(listings[0].rating, 4.5);
        assert_eq!(listings[0].review_count, 2);
        // Unregistered listings keep what upstream said.
        assert_eq!(listings[1].rating, 4.2);
        assert_eq!(listings[1].review_count, 40);
        assert_eq!(source.name(), "static+table");
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn store_failure_serves_upstream_ratings() {
        let source = StoreAggregates::new(upstream(), Arc::new(AggregateTable(None)));

        let listings = source.load().await.unwrap();
        assert_eq!(listings[0].rating, 3.5);
        assert_eq!(listings.len(), 2);
        assert!(logs_contain("serving upstream ratings"));
    }

    #[tokio::test]
    async fn static_source_returns_its_listings() {
        let source = StaticListings::default();
        assert!(source.load().await.unwrap().is_empty());
    }
}
