// SPDX-FileCopyrightText: 2026 Trailhead Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory review store with knobs for forcing interleavings and faults.
//!
//! `MockReviewStore` implements [`ReviewStore`] with the same contract as the
//! SQLite store (atomic conditional append, strictly increasing timestamps,
//! keyset pages) and adds:
//!
//! - a read barrier, so N concurrent writers all read the same aggregate
//!   before any of them appends;
//! - a page gate, so a page request can be held in flight;
//! - injected store failures and forced aggregate conflicts;
//! - a manual clock.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::sync::{Barrier, Mutex, Semaphore};

use trailhead_core::{
    AppendOutcome, HealthStatus, ListingId, NewReview, PageKey, RatingAggregate, ReviewDocument,
    ReviewId, ReviewStore, TrailheadError,
};

/// Clock the mock store stamps reviews with. Starts at 2026-01-01T00:00:00Z.
#[derive(Debug)]
pub struct ManualClock {
    micros: AtomicI64,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            micros: AtomicI64::new(start.timestamp_micros()),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        micros_to_datetime(self.now_micros())
    }

    pub fn set(&self, at: DateTime<Utc>) {
        self.micros.store(at.timestamp_micros(), Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        let step = by.num_microseconds().unwrap_or(i64::MAX);
        self.micros.fetch_add(step, Ordering::SeqCst);
    }

    fn now_micros(&self) -> i64 {
        self.micros.load(Ordering::SeqCst)
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).single().unwrap_or_default())
    }
}

#[derive(Default)]
struct State {
    aggregates: BTreeMap<ListingId, RatingAggregate>,
    reviews: Vec<ReviewDocument>,
    next_id: u64,
}

struct ReadBarrier {
    barrier: Arc<Barrier>,
    remaining: usize,
}

/// In-memory [`ReviewStore`] for tests.
#[derive(Default)]
pub struct MockReviewStore {
    state: Mutex<State>,
    clock: ManualClock,
    read_barrier: StdMutex<Option<ReadBarrier>>,
    page_gate: StdMutex<Option<Arc<Semaphore>>>,
    pages_waiting: AtomicUsize,
    failures: AtomicUsize,
    forced_conflicts: AtomicUsize,
    aggregate_reads: AtomicUsize,
    append_attempts: AtomicUsize,
}

impl MockReviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    /// Registers a listing with the given aggregate, replacing any existing one.
    pub async fn set_aggregate(&self, listing_id: &ListingId, aggregate: RatingAggregate) {
        self.state
            .lock()
            .await
            .aggregates
            .insert(listing_id.clone(), aggregate);
    }

    /// Inserts a review document verbatim, bypassing the aggregate.
    ///
    /// Lets tests build feeds with shared timestamps or arbitrary ids.
    pub async fn seed_review(&self, doc: ReviewDocument) {
        self.state.lock().await.reviews.push(doc);
    }

    /// The next `parties` aggregate reads each wait until all of them have
    /// read, so they observe the same value.
    pub fn hold_reads_until(&self, parties: usize) {
        let slot = ReadBarrier {
            barrier: Arc::new(Barrier::new(parties)),
            remaining: parties,
        };
        *lock(&self.read_barrier) = Some(slot);
    }

    /// Page requests block until [`MockReviewStore::release_pages`] lets them through.
    pub fn close_page_gate(&self) {
        *lock(&self.page_gate) = Some(Arc::new(Semaphore::new(0)));
    }

    /// Lets `n` blocked (or future) page requests proceed.
    pub fn release_pages(&self, n: usize) {
        if let Some(gate) = lock(&self.page_gate).as_ref() {
            gate.add_permits(n);
        }
    }

    /// Removes the gate. Requests already waiting stay blocked until released.
    pub fn open_page_gate(&self) {
        *lock(&self.page_gate) = None;
    }

    /// Number of page requests currently blocked at the gate.
    pub fn pages_waiting(&self) -> usize {
        self.pages_waiting.load(Ordering::SeqCst)
    }

    /// Yields until at least `n` page requests are blocked at the gate.
    pub async fn wait_for_blocked_pages(&self, n: usize) {
        while self.pages_waiting() < n {
            tokio::task::yield_now().await;
        }
    }

    /// The next `n` store calls fail with [`TrailheadError::StoreUnavailable`].
    pub fn fail_next(&self, n: usize) {
        self.failures.store(n, Ordering::SeqCst);
    }

    /// The next `n` appends report a conflict even when the expectation matches.
    pub fn force_conflicts(&self, n: usize) {
        self.forced_conflicts.store(n, Ordering::SeqCst);
    }

    pub fn aggregate_reads(&self) -> usize {
        self.aggregate_reads.load(Ordering::SeqCst)
    }

    pub fn append_attempts(&self) -> usize {
        self.append_attempts.load(Ordering::SeqCst)
    }

    /// Every stored review for a listing, newest first.
    pub async fn reviews_for(&self, listing_id: &ListingId) -> Vec<ReviewDocument> {
        let state = self.state.lock().await;
        let mut docs: Vec<_> = state
            .reviews
            .iter()
            .filter(|d| &d.listing_id == listing_id)
            .cloned()
            .collect();
        docs.sort_by(|a, b| b.page_key().cmp(&a.page_key()));
        docs
    }

    fn injected_failure(&self) -> Result<(), TrailheadError> {
        if take_one(&self.failures) {
            Err(TrailheadError::store("injected store failure"))
        } else {
            Ok(())
        }
    }

    fn next_read_barrier(&self) -> Option<Arc<Barrier>> {
        let mut slot = lock(&self.read_barrier);
        let held = slot.as_mut()?;
        held.remaining -= 1;
        let barrier = Arc::clone(&held.barrier);
        if held.remaining == 0 {
            *slot = None;
        }
        Some(barrier)
    }

    fn current_gate(&self) -> Option<Arc<Semaphore>> {
        lock(&self.page_gate).clone()
    }
}

#[async_trait]
impl ReviewStore for MockReviewStore {
    fn name(&self) -> &str {
        "mock"
    }

    async fn health_check(&self) -> Result<HealthStatus, TrailheadError> {
        Ok(match self.failures.load(Ordering::SeqCst) {
            0 => HealthStatus::Healthy,
            n => HealthStatus::Degraded(format!("{n} injected failures pending")),
        })
    }

    async fn register_listing(
        &self,
        listing_id: &ListingId,
        initial: RatingAggregate,
    ) -> Result<bool, TrailheadError> {
        self.injected_failure()?;
        let mut state = self.state.lock().await;
        if state.aggregates.contains_key(listing_id) {
            return Ok(false);
        }
        state.aggregates.insert(listing_id.clone(), initial);
        Ok(true)
    }

    async fn aggregate(
        &self,
        listing_id: &ListingId,
    ) -> Result<Option<RatingAggregate>, TrailheadError> {
        self.injected_failure()?;
        self.aggregate_reads.fetch_add(1, Ordering::SeqCst);
        let value = self.state.lock().await.aggregates.get(listing_id).copied();
        if let Some(barrier) = self.next_read_barrier() {
            barrier.wait().await;
        }
        Ok(value)
    }

    async fn append_review(
        &self,
        review: NewReview,
        expected: RatingAggregate,
        next: RatingAggregate,
    ) -> Result<AppendOutcome, TrailheadError> {
        self.injected_failure()?;
        self.append_attempts.fetch_add(1, Ordering::SeqCst);

        let mut state = self.state.lock().await;
        let Some(current) = state.aggregates.get(&review.listing_id).copied() else {
            return Err(TrailheadError::ListingNotFound(review.listing_id.0));
        };
        if current.review_count != expected.review_count || take_one(&self.forced_conflicts) {
            return Ok(AppendOutcome::Conflict { current });
        }

        let last = state
            .reviews
            .iter()
            .filter(|d| d.listing_id == review.listing_id)
            .map(|d| d.created_at.timestamp_micros())
            .max();
        let now = self.clock.now_micros();
        let created = match last {
            Some(last) if last >= now => last + 1,
            _ => now,
        };

        state.next_id += 1;
        let doc = ReviewDocument {
            id: ReviewId(format!("rev-{:06}", state.next_id)),
            listing_id: review.listing_id,
            author_display_name: review.author_display_name,
            rating: review.rating,
            comment: review.comment,
            created_at: micros_to_datetime(created),
        };
        state.aggregates.insert(doc.listing_id.clone(), next);
        state.reviews.push(doc.clone());
        Ok(AppendOutcome::Committed(doc))
    }

    async fn reviews_page(
        &self,
        listing_id: &ListingId,
        after: Option<&PageKey>,
        limit: usize,
    ) -> Result<Vec<ReviewDocument>, TrailheadError> {
        if let Some(gate) = self.current_gate() {
            self.pages_waiting.fetch_add(1, Ordering::SeqCst);
            let permit = gate.acquire().await;
            self.pages_waiting.fetch_sub(1, Ordering::SeqCst);
            match permit {
                Ok(permit) => permit.forget(),
                Err(_) => return Err(TrailheadError::store("page gate closed")),
            }
        }
        self.injected_failure()?;

        let docs = self.reviews_for(listing_id).await;
        Ok(docs
            .into_iter()
            .filter(|d| after.is_none_or(|key| d.page_key() < *key))
            .take(limit)
            .collect())
    }

    async fn count_reviews(&self, listing_id: &ListingId) -> Result<u64, TrailheadError> {
        self.injected_failure()?;
        let state = self.state.lock().await;
        Ok(state
            .reviews
            .iter()
            .filter(|d| &d.listing_id == listing_id)
            .count() as u64)
    }

    async fn listings(&self) -> Result<Vec<(ListingId, RatingAggregate)>, TrailheadError> {
        self.injected_failure()?;
        let state = self.state.lock().await;
        Ok(state
            .aggregates
            .iter()
            .map(|(id, agg)| (id.clone(), *agg))
            .collect())
    }
}

fn lock<T>(mutex: &StdMutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Decrements `counter` if it is positive. Returns whether it did.
fn take_one(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

fn micros_to_datetime(micros: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_micros(micros).unwrap_or_default()
}
