// SPDX-FileCopyrightText: 2026 Trailhead Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the ReviewStore trait.

use async_trait::async_trait;
use tracing::debug;

use trailhead_config::model::StorageConfig;
use trailhead_core::{
    AppendOutcome, HealthStatus, ListingId, NewReview, PageKey, RatingAggregate, ReviewDocument,
    ReviewStore, TrailheadError,
};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed review store.
///
/// Wraps a [`Database`] handle and delegates to the typed query modules.
pub struct SqliteReviewStore {
    db: Database,
}

impl SqliteReviewStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Opens the database at the configured path.
    pub async fn open(config: &StorageConfig) -> Result<Self, TrailheadError> {
        let db = Database::open_with(config).await?;
        debug!(path = %config.database_path, "SQLite review store ready");
        Ok(Self::new(db))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Checkpoints the WAL and closes the connection.
    pub async fn close(self) -> Result<(), TrailheadError> {
        self.db.close().await
    }
}

#[async_trait]
impl ReviewStore for SqliteReviewStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn health_check(&self) -> Result<HealthStatus, TrailheadError> {
        let result = self
            .db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> { conn.execute_batch("SELECT 1;") })
            .await
            .map_err(map_tr_err);
        Ok(match result {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        })
    }

    async fn register_listing(
        &self,
        listing_id: &ListingId,
        initial: RatingAggregate,
    ) -> Result<bool, TrailheadError> {
        queries::listings::register(&self.db, listing_id, initial).await
    }

    async fn aggregate(
        &self,
        listing_id: &ListingId,
    ) -> Result<Option<RatingAggregate>, TrailheadError> {
        queries::listings::get_aggregate(&self.db, listing_id).await
    }

    async fn append_review(
        &self,
        review: NewReview,
        expected: RatingAggregate,
        next: RatingAggregate,
    ) -> Result<AppendOutcome, TrailheadError> {
        queries::reviews::append(&self.db, review, expected, next).await
    }

    async fn reviews_page(
        &self,
        listing_id: &ListingId,
        after: Option<&PageKey>,
        limit: usize,
    ) -> Result<Vec<ReviewDocument>, TrailheadError> {
        queries::reviews::page(&self.db, listing_id, after, limit).await
    }

    async fn count_reviews(&self, listing_id: &ListingId) -> Result<u64, TrailheadError> {
        queries::reviews::count(&self.db, listing_id).await
    }

    async fn listings(&self) -> Result<Vec<(ListingId, RatingAggregate)>, TrailheadError> {
        queries::listings::list_aggregates(&self.db).await
    }
}
