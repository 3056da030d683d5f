// SPDX-FileCopyrightText: 2026 Trailhead Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Trailhead discovery core.

use thiserror::Error;

/// The primary error type used across all Trailhead traits and core operations.
#[derive(Debug, Error)]
pub enum TrailheadError {
    /// Malformed caller input (review rating out of range, empty comment, bad page size).
    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// The caller supplied no usable identity token.
    #[error("authentication required")]
    Auth,

    /// Transient failure talking to the backing store.
    #[error("store unavailable: {source}")]
    StoreUnavailable {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A conditional aggregate update lost a race with a concurrent writer.
    #[error("aggregate for listing {listing_id} changed concurrently")]
    AggregateConflict { listing_id: String },

    /// The listing has no aggregate record in the store.
    #[error("listing not found: {0}")]
    ListingNotFound(String),

    /// A pagination cursor could not be decoded.
    #[error("invalid cursor: {0}")]
    InvalidCursor(String),

    /// Configuration errors surfaced at runtime.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TrailheadError {
    /// Shorthand for a [`TrailheadError::Validation`].
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Wraps any error as [`TrailheadError::StoreUnavailable`].
    pub fn store<E>(source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::StoreUnavailable {
            source: source.into(),
        }
    }

    /// Whether the failed operation may be repeated automatically.
    ///
    /// Only lost compare-and-swap races qualify. Store outages are never
    /// retried implicitly because a review submission could be duplicated.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::AggregateConflict { .. })
    }
}
