// SPDX-FileCopyrightText: 2026 Trailhead Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Review store trait for document-oriented persistence backends.

use async_trait::async_trait;

use crate::error::TrailheadError;
use crate::types::{
    AppendOutcome, HealthStatus, ListingId, NewReview, PageKey, RatingAggregate, ReviewDocument,
};

/// Backend holding review documents and the per-listing aggregate pair.
///
/// Implementations must provide three primitives: server-assigned monotonic
/// timestamps, an ordered range query over `(created_at desc, id desc)`, and
/// an atomic conditional update of the aggregate.
#[async_trait]
pub trait ReviewStore: Send + Sync + 'static {
    /// Returns the human-readable name of this store.
    fn name(&self) -> &str;

    /// Performs a health check and returns the store's current status.
    async fn health_check(&self) -> Result<HealthStatus, TrailheadError>;

    /// Creates the aggregate record for a listing if it does not exist yet.
    ///
    /// Never overwrites an existing aggregate. Returns `true` if a record was inserted.
    async fn register_listing(
        &self,
        listing_id: &ListingId,
        initial: RatingAggregate,
    ) -> Result<bool, TrailheadError>;

    /// Reads the current aggregate, or `None` if the listing is unknown.
    async fn aggregate(
        &self,
        listing_id: &ListingId,
    ) -> Result<Option<RatingAggregate>, TrailheadError>;

    /// Appends a review and replaces the aggregate in a single atomic step.
    ///
    /// The write only happens when the stored aggregate still has
    /// `expected.review_count` reviews; otherwise nothing is written and
    /// [`AppendOutcome::Conflict`] carries the current value. The store
    /// assigns the review id and a `created_at` later than every review
    /// already stored for the listing.
    async fn append_review(
        &self,
        review: NewReview,
        expected: RatingAggregate,
        next: RatingAggregate,
    ) -> Result<AppendOutcome, TrailheadError>;

    /// Returns up to `limit` reviews in `(created_at desc, id desc)` order,
    /// starting strictly after `after` when given.
    async fn reviews_page(
        &self,
        listing_id: &ListingId,
        after: Option<&PageKey>,
        limit: usize,
    ) -> Result<Vec<ReviewDocument>, TrailheadError>;

    /// Counts the review documents stored for a listing.
    async fn count_reviews(&self, listing_id: &ListingId) -> Result<u64, TrailheadError>;

    /// Lists every registered listing with its aggregate, ordered by id.
    async fn listings(&self) -> Result<Vec<(ListingId, RatingAggregate)>, TrailheadError>;
}
