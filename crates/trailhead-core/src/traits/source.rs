// SPDX-FileCopyrightText: 2026 Trailhead Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Listing source trait for whatever supplies the search candidate set.

use async_trait::async_trait;

use crate::error::TrailheadError;
use crate::types::Listing;

/// Supplies the full candidate set for a search.
///
/// The search engine does not care whether listings come from static data
/// or a live fetch; it only needs a finite, already validated set.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Returns a human-readable name for logs.
    fn name(&self) -> &str;

    /// Loads every candidate listing.
    async fn load(&self) -> Result<Vec<Listing>, TrailheadError>;
}
