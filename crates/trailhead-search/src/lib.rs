// SPDX-FileCopyrightText: 2026 Trailhead Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Faceted listing search for Trailhead.
//!
//! Loosely-typed upstream records are normalized by [`ingest`] into
//! [`trailhead_core::Listing`]s. A [`FilterCriteria`] snapshot (usually decoded
//! from query parameters by [`QueryCodec`]) is then applied by the
//! [`SearchEngine`], which filters with the [`matcher`], orders with the
//! [`ranker`], and derives the sidebar facet options.

pub mod criteria;
pub mod engine;
pub mod ingest;
pub mod matcher;
pub mod query;
pub mod ranker;
pub mod source;

pub use criteria::{FilterCriteria, PriceRange, RatingBucket, SortKey};
pub use engine::{FacetOption, FacetOptions, SearchEngine, SearchResults, derive_facets};
pub use ingest::{RawListing, ingest_json};
pub use matcher::{Matcher, matches};
pub use query::QueryCodec;
pub use ranker::sort_listings;
pub use source::{JsonFileListings, StaticListings, StoreAggregates};
