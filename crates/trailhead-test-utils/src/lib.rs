// SPDX-FileCopyrightText: 2026 Trailhead Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Trailhead integration tests.
//!
//! Provides a mock review store and a test harness for fast, deterministic
//! tests without a real database.
//!
//! # Components
//!
//! - [`MockReviewStore`] - In-memory review store with interleaving and fault injection
//! - [`TestHarness`] - Search engine, aggregator, and pager wired to a store
//! - [`fixtures`] - Sample listing data

pub mod fixtures;
pub mod harness;
pub mod mock_store;

pub use harness::TestHarness;
pub use mock_store::{ManualClock, MockReviewStore};
