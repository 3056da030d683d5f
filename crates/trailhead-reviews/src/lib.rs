// SPDX-FileCopyrightText: 2026 Trailhead Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Review aggregation and pagination for Trailhead.
//!
//! - [`ReviewAggregator`] appends reviews and maintains each listing's
//!   `{rating, review_count}` pair through an atomic conditional update.
//! - [`ReviewPager`] serves reviews newest first behind an opaque [`Cursor`],
//!   without duplicates or gaps across pages.

pub mod aggregator;
pub mod cursor;
pub mod pager;
pub mod validation;

pub use aggregator::ReviewAggregator;
pub use cursor::Cursor;
pub use pager::{FeedState, PageFetch, ReviewPage, ReviewPager};
