// SPDX-FileCopyrightText: 2026 Trailhead Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Trailhead listing discovery engine.
//!
//! This crate provides the domain types, the error type, and the collaborator
//! traits shared by the search engine, the review engine, and the stores.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::TrailheadError;
pub use traits::{ListingSource, ReviewStore};
pub use types::{
    AppendOutcome, Category, HealthStatus, Identity, Listing, ListingId, NewReview, PageKey,
    RatingAggregate, ReviewDocument, ReviewId,
};
