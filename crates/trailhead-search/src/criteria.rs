// SPDX-FileCopyrightText: 2026 Trailhead Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filter criteria: an immutable snapshot of a session's facet selections.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use trailhead_core::Category;

/// Default lower bound of the price domain.
pub const DEFAULT_MIN_PRICE: f64 = 0.0;
/// Default upper bound of the price domain.
pub const DEFAULT_MAX_PRICE: f64 = 100_000.0;

/// Closed price interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Inclusive on both ends.
    pub fn contains(&self, amount: f64) -> bool {
        amount >= self.min && amount <= self.max
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_PRICE, DEFAULT_MAX_PRICE)
    }
}

/// A "N+" minimum-rating bucket, `N` in `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RatingBucket(u8);

impl RatingBucket {
    pub fn new(stars: u8) -> Option<Self> {
        (1..=5).contains(&stars).then_some(Self(stars))
    }

    pub fn stars(self) -> u8 {
        self.0
    }

    /// Minimum listing rating that satisfies this bucket.
    pub fn threshold(self) -> f64 {
        f64::from(self.0)
    }
}

impl fmt::Display for RatingBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+", self.0)
    }
}

impl FromStr for RatingBucket {
    type Err = String;

    /// Accepts `"4+"` or `"4"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_end_matches('+').trim();
        digits
            .parse::<u8>()
            .ok()
            .and_then(RatingBucket::new)
            .ok_or_else(|| format!("`{s}` is not a rating bucket (expected 1+ to 5+)"))
    }
}

impl TryFrom<String> for RatingBucket {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RatingBucket> for String {
    fn from(bucket: RatingBucket) -> Self {
        bucket.to_string()
    }
}

/// Result ordering.
///
/// Displays in snake_case. Parsing also accepts the camelCase spelling that
/// older links use, in any letter case.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Most reviewed first.
    #[default]
    Popularity,
    #[strum(to_string = "price_asc", serialize = "priceAsc")]
    PriceAsc,
    #[strum(to_string = "price_desc", serialize = "priceDesc")]
    PriceDesc,
    /// Highest rated first.
    Rating,
    Distance,
}

impl SortKey {
    /// Parses a sort key, falling back to [`SortKey::Popularity`] for
    /// anything unrecognized. An unknown key is never an error.
    pub fn parse_lenient(s: &str) -> SortKey {
        SortKey::from_str(s.trim()).unwrap_or_default()
    }
}

/// The user's current facet selections.
///
/// Empty sets mean "no restriction on this facet". Reconstructed by the
/// caller on every change and passed into the engine; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    pub free_text: Option<String>,
    pub price_range: PriceRange,
    pub rating_thresholds: BTreeSet<RatingBucket>,
    pub categories: BTreeSet<Category>,
    pub locations: BTreeSet<String>,
    pub amenities: BTreeSet<String>,
    pub sort_key: SortKey,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_free_text(mut self, text: impl Into<String>) -> Self {
        self.free_text = Some(text.into());
        self
    }

    pub fn with_price_range(mut self, min: f64, max: f64) -> Self {
        self.price_range = PriceRange::new(min, max);
        self
    }

    pub fn with_rating_bucket(mut self, bucket: RatingBucket) -> Self {
        self.rating_thresholds.insert(bucket);
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.categories.insert(category);
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.locations.insert(location.into());
        self
    }

    pub fn with_amenity(mut self, amenity: impl Into<String>) -> Self {
        self.amenities.insert(amenity.into());
        self
    }

    pub fn sorted_by(mut self, key: SortKey) -> Self {
        self.sort_key = key;
        self
    }

    /// Lowercased free-text needle, or `None` when the query is absent or
    /// whitespace-only (which disables the free-text filter entirely).
    pub fn search_needle(&self) -> Option<String> {
        self.free_text
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase)
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn rating_bucket_parses_both_forms() {
        assert_eq!("4+".parse::<RatingBucket>().unwrap().stars(), 4);
        assert_eq!(" 3 ".parse::<RatingBucket>().unwrap().stars(), 3);
        assert!("0+".parse::<RatingBucket>().is_err());
        assert!("6+".parse::<RatingBucket>().is_err());
        assert!("great".parse::<RatingBucket>().is_err());
    }

    #[test]
    fn rating_bucket_displays_with_plus() {
        assert_eq!(RatingBucket::new(5).unwrap().to_string(), "5+");
    }

    #[test]
    fn sort_key_round_trips_through_text() {
        for key in SortKey::iter() {
            assert_eq!(SortKey::parse_lenient(&key.to_string()), key);
        }
        assert_eq!(SortKey::PriceAsc.to_string(), "price_asc");
    }

    #[test]
    fn unknown_sort_key_falls_back_to_popularity() {
        assert_eq!(SortKey::parse_lenient("cheapest"), SortKey::Popularity);
        assert_eq!(SortKey::parse_lenient(""), SortKey::Popularity);
    }

    #[test]
    fn whitespace_query_disables_free_text() {
        assert_eq!(FilterCriteria::new().with_free_text("   ").search_needle(), None);
        assert_eq!(FilterCriteria::new().search_needle(), None);
        assert_eq!(
            FilterCriteria::new().with_free_text(" Manali ").search_needle(),
            Some("manali".to_string())
        );
    }

    #[test]
    fn price_range_is_inclusive() {
        let range = PriceRange::new(5000.0, 9000.0);
        assert!(range.contains(5000.0));
        assert!(range.contains(9000.0));
        assert!(!range.contains(4999.99));
        assert!(!range.contains(9000.01));
    }

    #[test]
    fn criteria_serializes_buckets_as_labels() {
        let criteria = FilterCriteria::new().with_rating_bucket(RatingBucket::new(4).unwrap());
        let json = serde_json::to_value(&criteria).unwrap();
        assert_eq!(json["rating_thresholds"][0], "4+");
        let back: FilterCriteria = serde_json::from_value(json).unwrap();
        assert_eq!(back, criteria);
    }
}
