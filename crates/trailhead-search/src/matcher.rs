// SPDX-FileCopyrightText: 2026 Trailhead Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Listing predicate: does one listing satisfy a set of criteria?
//!
//! Facets compose with AND. Within a facet, categories and locations use
//! ANY-of semantics and amenities use ALL-of. An empty selection never
//! restricts.

use trailhead_core::Listing;

use crate::criteria::FilterCriteria;

/// Criteria prepared for repeated matching.
///
/// Holds the lowercased free-text needle so a scan over many listings does
/// not re-normalize the query for every candidate.
#[derive(Debug, Clone)]
pub struct Matcher<'a> {
    criteria: &'a FilterCriteria,
    needle: Option<String>,
}

impl<'a> Matcher<'a> {
    pub fn new(criteria: &'a FilterCriteria) -> Self {
        Self {
            criteria,
            needle: criteria.search_needle(),
        }
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        self.text_matches(listing)
            && self.price_matches(listing)
            && self.rating_matches(listing)
            && self.category_matches(listing)
            && self.location_matches(listing)
            && self.amenities_match(listing)
    }

    fn text_matches(&self, listing: &Listing) -> bool {
        let Some(needle) = &self.needle else {
            return true;
        };
        let category = listing.category.to_string();
        [
            listing.title.as_str(),
            listing.description.as_str(),
            listing.location.as_str(),
            category.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(needle.as_str()))
    }

    /// Free listings bypass the price range entirely.
    fn price_matches(&self, listing: &Listing) -> bool {
        listing.is_free || self.criteria.price_range.contains(listing.price_amount)
    }

    fn rating_matches(&self, listing: &Listing) -> bool {
        let buckets = &self.criteria.rating_thresholds;
        buckets.is_empty() || buckets.iter().any(|b| b.threshold() <= listing.rating)
    }

    fn category_matches(&self, listing: &Listing) -> bool {
        let categories = &self.criteria.categories;
        categories.is_empty() || categories.contains(&listing.category)
    }

    fn location_matches(&self, listing: &Listing) -> bool {
        let locations = &self.criteria.locations;
        locations.is_empty() || locations.contains(&listing.location)
    }

    fn amenities_match(&self, listing: &Listing) -> bool {
        self.criteria
            .amenities
            .iter()
            .all(|amenity| listing.amenities.contains(amenity))
    }
}

/// One-shot form of [`Matcher::matches`].
pub fn matches(listing: &Listing, criteria: &FilterCriteria) -> bool {
    Matcher::new(criteria).matches(listing)
}
