// SPDX-FileCopyrightText: 2026 Trailhead Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the search engine, review engine, and stores.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Unique identifier for a listing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ListingId(pub String);

/// Unique identifier for a review document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReviewId(pub String);

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ListingId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for ReviewId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Health status reported by store health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Store is fully operational.
    Healthy,
    /// Store is operational but experiencing issues.
    Degraded(String),
    /// Store is not operational.
    Unhealthy(String),
}

/// The closed set of listing kinds.
///
/// Upstream records call this field `type` or `profession`; both parse into
/// this enum. Parsing is case-insensitive and accepts the plural form.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum Category {
    #[strum(to_string = "Stay", serialize = "stays")]
    Stay,
    #[strum(to_string = "Place", serialize = "places")]
    Place,
    #[strum(to_string = "Trek", serialize = "treks")]
    Trek,
    #[strum(to_string = "Bike", serialize = "bikes")]
    Bike,
    #[strum(to_string = "Cab", serialize = "cabs")]
    Cab,
    #[strum(to_string = "Guide", serialize = "guides")]
    Guide,
}

/// A validated, bookable or viewable listing.
///
/// Constructed at the ingestion boundary with every optional field defaulted,
/// so matchers and rankers never deal with missing data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub location: String,
    /// Price in whole currency units. Always `0.0` when `is_free` is set.
    pub price_amount: f64,
    pub is_free: bool,
    /// Mean review rating in `[0, 5]`, one decimal place.
    pub rating: f64,
    pub review_count: u32,
    pub amenities: BTreeSet<String>,
    /// Precomputed human-readable distance such as `"12 km"`.
    pub distance: Option<String>,
}

impl Listing {
    /// The aggregate pair owned by the review engine.
    ///
    /// Upstream data only carries the rounded mean, so the imported star
    /// total is `rating * review_count`.
    pub fn aggregate(&self) -> RatingAggregate {
        RatingAggregate::from_rating(self.rating, self.review_count)
    }
}

/// Running `{rating, reviewCount}` pair stored alongside each listing.
///
/// The sum of stars is kept unrounded so the mean never drifts; rounding to
/// one decimal happens only in [`RatingAggregate::rating`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingAggregate {
    pub star_total: f64,
    pub review_count: u32,
}

impl RatingAggregate {
    /// Aggregate for a listing nobody has reviewed.
    pub const EMPTY: RatingAggregate = RatingAggregate {
        star_total: 0.0,
        review_count: 0,
    };

    /// Aggregate whose mean is `rating` over `review_count` reviews.
    pub fn from_rating(rating: f64, review_count: u32) -> RatingAggregate {
        RatingAggregate {
            star_total: rating * f64::from(review_count),
            review_count,
        }
    }

    /// Mean rating rounded to one decimal place, `0.0` with no reviews.
    pub fn rating(&self) -> f64 {
        if self.review_count == 0 {
            return 0.0;
        }
        let mean = self.star_total / f64::from(self.review_count);
        round_to_tenth(mean.clamp(0.0, 5.0))
    }

    /// Folds one more review into the running total.
    pub fn with_review(self, stars: u8) -> RatingAggregate {
        RatingAggregate {
            star_total: self.star_total + f64::from(stars),
            review_count: self.review_count + 1,
        }
    }
}

/// Rounds half away from zero to one decimal place.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// An authenticated caller as supplied by the identity collaborator.
///
/// The token is opaque; only its presence is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub token: String,
    pub display_name: String,
}

impl Identity {
    pub fn new(token: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            display_name: display_name.into(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !self.token.trim().is_empty()
    }
}

/// A validated review waiting for the store to assign an id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub listing_id: ListingId,
    pub author_display_name: String,
    pub rating: u8,
    pub comment: String,
}

/// A persisted, immutable review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewDocument {
    pub id: ReviewId,
    pub listing_id: ListingId,
    pub author_display_name: String,
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl ReviewDocument {
    pub fn page_key(&self) -> PageKey {
        PageKey {
            created_at: self.created_at,
            id: self.id.clone(),
        }
    }
}

/// Compound `(created_at, id)` position of a review in its listing's feed.
///
/// `Ord` is ascending on both components; feeds are served in descending
/// order, so the documents after a key are exactly those that compare less.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageKey {
    pub created_at: DateTime<Utc>,
    pub id: ReviewId,
}

impl Ord for PageKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.created_at
            .cmp(&other.created_at)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for PageKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Result of an atomic append-and-update against a [`crate::ReviewStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum AppendOutcome {
    /// The review was written and the aggregate replaced in one step.
    Committed(ReviewDocument),
    /// The stored aggregate no longer matched the expected value; nothing was written.
    Conflict { current: RatingAggregate },
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::TimeZone;
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn category_parses_case_insensitively_and_plural() {
        assert_eq!(Category::from_str("stay").unwrap(), Category::Stay);
        assert_eq!(Category::from_str("TREK").unwrap(), Category::Trek);
        assert_eq!(Category::from_str("Guides").unwrap(), Category::Guide);
        assert!(Category::from_str("spaceship").is_err());
    }

    #[test]
    fn category_display_round_trips() {
        for category in Category::iter() {
            let parsed = Category::from_str(&category.to_string()).unwrap();
            assert_eq!(parsed, category);
        }
    }

    #[test]
    fn category_serializes_as_name() {
        let json = serde_json::to_string(&Category::Cab).unwrap();
        assert_eq!(json, "\"Cab\"");
        let parsed: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Category::Cab);
    }

    #[test]
    fn with_review_uses_closed_form_mean() {
        let start = RatingAggregate::from_rating(4.0, 10);
        let next = start.with_review(5);
        assert_eq!(next.review_count, 11);
        assert_eq!(next.rating(), 4.1);
    }

    #[test]
    fn first_review_sets_rating() {
        let next = RatingAggregate::EMPTY.with_review(3);
        assert_eq!(next, RatingAggregate { star_total: 3.0, review_count: 1 });
        assert_eq!(next.rating(), 3.0);
    }

    #[test]
    fn empty_aggregate_rates_zero() {
        assert_eq!(RatingAggregate::EMPTY.rating(), 0.0);
    }

    #[test]
    fn long_run_of_reviews_does_not_drift() {
        let mut agg = RatingAggregate::EMPTY;
        for _ in 0..10 {
            agg = agg.with_review(1);
        }
        for _ in 0..90 {
            agg = agg.with_review(5);
        }
        assert_eq!(agg.review_count, 100);
        assert_eq!(agg.star_total, 460.0);
        assert_eq!(agg.rating(), 4.6);
    }

    #[test]
    fn page_key_orders_by_time_then_id() {
        let t = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let a = PageKey { created_at: t, id: "a".into() };
        let b = PageKey { created_at: t, id: "b".into() };
        let later = PageKey {
            created_at: t + chrono::Duration::seconds(1),
            id: "a".into(),
        };
        assert!(a < b);
        assert!(b < later);
    }

    #[test]
    fn blank_token_is_not_authenticated() {
        assert!(!Identity::new("  ", "Asha").is_authenticated());
        assert!(Identity::new("tok-1", "Asha").is_authenticated());
    }

    proptest::proptest! {
        #[test]
        fn aggregate_stays_in_rating_bounds(count in 0u32..10_000, tenths in 0u32..=50, stars in 1u8..=5) {
            let start = RatingAggregate::from_rating(f64::from(tenths) / 10.0, count);
            let next = start.with_review(stars);
            proptest::prop_assert!(next.rating() >= 0.0 && next.rating() <= 5.0);
            proptest::prop_assert_eq!(next.review_count, count + 1);
        }

        #[test]
        fn rating_matches_exact_mean(stars in proptest::collection::vec(1u8..=5, 1..200)) {
            let agg = stars.iter().fold(RatingAggregate::EMPTY, |agg, s| agg.with_review(*s));
            let sum: u32 = stars.iter().map(|s| u32::from(*s)).sum();
            let exact = round_to_tenth(f64::from(sum) / stars.len() as f64);
            proptest::prop_assert_eq!(agg.rating(), exact);
        }
    }
}
