// SPDX-FileCopyrightText: 2026 Trailhead Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Review submission.
//!
//! The running `{rating, review_count}` pair is only ever changed through
//! [`ReviewStore::append_review`], which writes the review and swaps the
//! aggregate in one atomic step guarded by the expected review count. A lost
//! race writes nothing and is retried with exponential backoff, up to the
//! configured number of attempts.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use trailhead_config::model::ReviewsConfig;
use trailhead_core::{
    AppendOutcome, Identity, ListingId, NewReview, ReviewDocument, ReviewStore, TrailheadError,
};

use crate::validation::{author_name, validate_comment, validate_rating};

/// Records reviews and keeps listing aggregates consistent under concurrency.
#[derive(Clone)]
pub struct ReviewAggregator {
    store: Arc<dyn ReviewStore>,
    max_attempts: u32,
    initial_backoff: Duration,
    max_comment_chars: usize,
}

impl ReviewAggregator {
    pub fn new(store: Arc<dyn ReviewStore>, config: &ReviewsConfig) -> Self {
        Self {
            store,
            max_attempts: config.max_attempts.max(1),
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            max_comment_chars: config.max_comment_chars,
        }
    }

    /// Validates and stores one review, updating the listing's aggregate.
    ///
    /// Fails with [`TrailheadError::Auth`] when `identity` is missing or has a
    /// blank token, and with [`TrailheadError::Validation`] for a rating
    /// outside `1..=5` or an empty comment. Neither touches the store.
    ///
    /// Store failures are returned as-is and never retried here, since the
    /// caller cannot tell whether a retried submission would duplicate the
    /// review. Only lost compare-and-swap races are retried; when every
    /// attempt loses, the result is [`TrailheadError::StoreUnavailable`].
    pub async fn record_review(
        &self,
        listing_id: &ListingId,
        identity: Option<&Identity>,
        rating: u8,
        comment: &str,
    ) -> Result<ReviewDocument, TrailheadError> {
        let identity = identity
            .filter(|id| id.is_authenticated())
            .ok_or(TrailheadError::Auth)?;
        let rating = validate_rating(rating)?;
        let comment = validate_comment(comment, self.max_comment_chars)?;

        let review = NewReview {
            listing_id: listing_id.clone(),
            author_display_name: author_name(&identity.display_name),
            rating,
            comment,
        };

        let mut expected = self
            .store
            .aggregate(listing_id)
            .await?
            .ok_or_else(|| TrailheadError::ListingNotFound(listing_id.0.clone()))?;
        let mut backoff = self.initial_backoff;

        for attempt in 1..=self.max_attempts {
            if attempt > 1 {
                tokio::time::sleep(backoff).await;
                backoff = backoff.saturating_mul(2);
            }

            let next = expected.with_review(rating);
            match self
                .store
                .append_review(review.clone(), expected, next)
                .await?
            {
                AppendOutcome::Committed(doc) => {
                    info!(
                        listing = %listing_id,
                        review = %doc.id,
                        rating,
                        review_count = next.review_count,
                        average = next.rating(),
                        attempt,
                        "review recorded"
                    );
                    return Ok(doc);
                }
                AppendOutcome::Conflict { current } => {
                    warn!(
                        listing = %listing_id,
                        attempt,
                        max_attempts = self.max_attempts,
                        expected_count = expected.review_count,
                        current_count = current.review_count,
                        "aggregate changed concurrently"
                    );
                    expected = current;
                }
            }
        }

        debug!(listing = %listing_id, "conditional update attempts exhausted");
        Err(TrailheadError::store(TrailheadError::AggregateConflict {
            listing_id: listing_id.0.clone(),
        }))
    }
}
