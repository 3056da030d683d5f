// SPDX-FileCopyrightText: 2026 Trailhead Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cursor-based review feed.
//!
//! Each listing's feed moves through
//! `Idle -> Loading -> Loaded { has_more: true } -> Loading -> ... -> Loaded { has_more: false }`.
//! At most one page request per listing is in flight; a request made while
//! one is loading is ignored rather than queued, so a slow page can never
//! land after a faster later one.

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use tracing::debug;

use trailhead_config::model::ReviewsConfig;
use trailhead_core::{ListingId, PageKey, ReviewDocument, ReviewStore, TrailheadError};

use crate::cursor::Cursor;
use crate::validation::effective_page_size;

/// Per-listing feed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedState {
    #[default]
    Idle,
    Loading,
    /// `has_more: false` is terminal until the feed is restarted with
    /// [`ReviewPager::first_page`].
    Loaded { has_more: bool },
}

/// One page of reviews, newest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewPage {
    pub items: Vec<ReviewDocument>,
    /// Position of the last item; `None` for an empty page.
    pub cursor: Option<Cursor>,
    /// True iff the page is full.
    pub has_more: bool,
}

/// Outcome of a page request.
#[derive(Debug, Clone, PartialEq)]
pub enum PageFetch {
    Loaded(ReviewPage),
    /// Another request for this listing is still loading.
    Ignored,
    /// The feed already returned its last page.
    Exhausted,
}

impl PageFetch {
    pub fn into_page(self) -> Option<ReviewPage> {
        match self {
            PageFetch::Loaded(page) => Some(page),
            PageFetch::Ignored | PageFetch::Exhausted => None,
        }
    }
}

/// Serves review pages in `(created_at desc, id desc)` order.
pub struct ReviewPager {
    store: Arc<dyn ReviewStore>,
    default_page_size: usize,
    max_page_size: usize,
    feeds: DashMap<ListingId, FeedState>,
}

impl ReviewPager {
    pub fn new(store: Arc<dyn ReviewStore>, config: &ReviewsConfig) -> Self {
        Self {
            store,
            default_page_size: config.page_size,
            max_page_size: config.max_page_size,
            feeds: DashMap::new(),
        }
    }

    pub fn default_page_size(&self) -> usize {
        self.default_page_size
    }

    pub fn state(&self, listing_id: &ListingId) -> FeedState {
        self.feeds
            .get(listing_id)
            .map(|state| *state)
            .unwrap_or_default()
    }

    /// Fetches the newest page and restarts the feed.
    ///
    /// Ignored while a request for the same listing is loading.
    pub async fn first_page(
        &self,
        listing_id: &ListingId,
        page_size: usize,
    ) -> Result<PageFetch, TrailheadError> {
        let size = effective_page_size(page_size, self.max_page_size)?;
        let Some(guard) = self.begin(listing_id, false)? else {
            return Ok(self.blocked(listing_id));
        };
        self.load(guard, None, size).await
    }

    /// Fetches the page strictly after `cursor`.
    ///
    /// Reviews inserted after the first page was served are newer than every
    /// cursor and never appear on a continuation page.
    pub async fn next_page(
        &self,
        listing_id: &ListingId,
        cursor: &Cursor,
        page_size: usize,
    ) -> Result<PageFetch, TrailheadError> {
        let size = effective_page_size(page_size, self.max_page_size)?;
        let after = cursor.key()?;
        let Some(guard) = self.begin(listing_id, true)? else {
            return Ok(self.blocked(listing_id));
        };
        self.load(guard, Some(after), size).await
    }

    /// Forgets the feed state for a listing.
    pub fn reset(&self, listing_id: &ListingId) {
        self.feeds.remove(listing_id);
    }

    /// Moves the feed to `Loading`, or returns `None` when it cannot start.
    fn begin(
        &self,
        listing_id: &ListingId,
        continuing: bool,
    ) -> Result<Option<LoadingGuard<'_>>, TrailheadError> {
        let mut state = self.feeds.entry(listing_id.clone()).or_default();
        let previous = *state;
        match previous {
            FeedState::Loading => return Ok(None),
            FeedState::Loaded { has_more: false } if continuing => return Ok(None),
            FeedState::Idle | FeedState::Loaded { .. } => {}
        }
        *state = FeedState::Loading;
        drop(state);

        Ok(Some(LoadingGuard {
            feeds: &self.feeds,
            listing_id: listing_id.clone(),
            previous,
            settled: false,
        }))
    }

    fn blocked(&self, listing_id: &ListingId) -> PageFetch {
        match self.state(listing_id) {
            FeedState::Loading => {
                debug!(listing = %listing_id, "page request ignored while loading");
                PageFetch::Ignored
            }
            _ => PageFetch::Exhausted,
        }
    }

    async fn load(
        &self,
        guard: LoadingGuard<'_>,
        after: Option<PageKey>,
        size: usize,
    ) -> Result<PageFetch, TrailheadError> {
        let items = self
            .store
            .reviews_page(&guard.listing_id, after.as_ref(), size)
            .await?;

        let has_more = items.len() == size;
        let cursor = items.last().map(|doc| Cursor::from_key(&doc.page_key()));
        debug!(
            listing = %guard.listing_id,
            items = items.len(),
            has_more,
            "review page loaded"
        );
        guard.settle(FeedState::Loaded { has_more });

        Ok(PageFetch::Loaded(ReviewPage {
            items,
            cursor,
            has_more,
        }))
    }
}

/// Restores the previous feed state unless the load completes.
///
/// Covers both store errors and a caller dropping the page future.
struct LoadingGuard<'a> {
    feeds: &'a DashMap<ListingId, FeedState>,
    listing_id: ListingId,
    previous: FeedState,
    settled: bool,
}

impl LoadingGuard<'_> {
    fn settle(mut self, state: FeedState) {
        self.feeds.insert(self.listing_id.clone(), state);
        self.settled = true;
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.feeds.insert(self.listing_id.clone(), self.previous);
        }
    }
}
