// SPDX-FileCopyrightText: 2026 Trailhead Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Search engine: filter, rank, and derive sidebar facet options.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use trailhead_config::model::{FacetSource, SearchConfig};
use trailhead_core::{Listing, ListingSource};

use crate::criteria::{FilterCriteria, PriceRange};
use crate::matcher::Matcher;
use crate::query::QueryCodec;
use crate::ranker::sort_listings;

/// One selectable sidebar value and how many listings carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetOption {
    pub value: String,
    pub count: usize,
}

/// Deduplicated, lexicographically ordered option lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FacetOptions {
    pub categories: Vec<FacetOption>,
    pub locations: Vec<FacetOption>,
    pub amenities: Vec<FacetOption>,
}

/// Output of one search.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResults {
    /// Matching listings in ranked order.
    pub results: Vec<Listing>,
    /// Number of matching listings before any [`SearchResults::limited`] cut.
    pub total: usize,
    pub facets: FacetOptions,
    /// Set when the listing source failed; `results` is then empty and the
    /// caller should offer a retry.
    pub degraded: bool,
}

impl SearchResults {
    /// Empty response for a failed listing source.
    pub fn degraded() -> Self {
        Self {
            degraded: true,
            ..Self::default()
        }
    }

    /// Keeps the first `limit` results. `total` is unchanged.
    pub fn limited(mut self, limit: usize) -> Self {
        self.results.truncate(limit);
        self
    }
}

/// Composes the matcher and ranker over a candidate set.
#[derive(Debug, Clone)]
pub struct SearchEngine {
    facet_source: FacetSource,
    codec: QueryCodec,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new(&SearchConfig::default())
    }
}

impl SearchEngine {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            facet_source: config.facet_source,
            codec: QueryCodec::new(PriceRange::new(config.min_price, config.max_price)),
        }
    }

    /// Codec bound to the configured price domain.
    pub fn codec(&self) -> &QueryCodec {
        &self.codec
    }

    /// Filters and ranks `candidates`.
    pub fn search(&self, candidates: &[Listing], criteria: &FilterCriteria) -> SearchResults {
        let matcher = Matcher::new(criteria);
        let mut hits: Vec<&Listing> = candidates.iter().filter(|l| matcher.matches(l)).collect();
        sort_listings(&mut hits, criteria.sort_key);

        let facets = match self.facet_source {
            FacetSource::Candidates => derive_facets(candidates),
            FacetSource::Results => derive_facets(hits.iter().copied()),
        };

        debug!(
            candidates = candidates.len(),
            matched = hits.len(),
            sort = %criteria.sort_key,
            "search complete"
        );

        SearchResults {
            total: hits.len(),
            results: hits.into_iter().cloned().collect(),
            facets,
            degraded: false,
        }
    }

    /// Decodes a query string and searches.
    pub fn search_query(&self, candidates: &[Listing], query: &str) -> SearchResults {
        self.search(candidates, &self.codec.decode(query))
    }

    /// Loads candidates from `source` and searches them.
    ///
    /// A source failure is not surfaced as an error: the response is
    /// [`SearchResults::degraded`] so the caller can render a retry.
    pub async fn search_source(
        &self,
        source: &dyn ListingSource,
        criteria: &FilterCriteria,
    ) -> SearchResults {
        match source.load().await {
            Ok(candidates) => self.search(&candidates, criteria),
            Err(e) => {
                warn!(source = source.name(), error = %e, "listing source failed, returning degraded results");
                SearchResults::degraded()
            }
        }
    }
}

/// Builds facet option lists from a listing set.
///
/// Blank locations and amenities are not offered as options.
pub fn derive_facets<'a>(listings: impl IntoIterator<Item = &'a Listing>) -> FacetOptions {
    let mut categories = BTreeMap::<String, usize>::new();
    let mut locations = BTreeMap::<String, usize>::new();
    let mut amenities = BTreeMap::<String, usize>::new();

    for listing in listings {
        *categories.entry(listing.category.to_string()).or_default() += 1;
        if !listing.location.trim().is_empty() {
            *locations.entry(listing.location.clone()).or_default() += 1;
        }
        for amenity in listing.amenities.iter().filter(|a| !a.trim().is_empty()) {
            *amenities.entry(amenity.clone()).or_default() += 1;
        }
    }

    FacetOptions {
        categories: into_options(categories),
        locations: into_options(locations),
        amenities: into_options(amenities),
    }
}

fn into_options(counts: BTreeMap<String, usize>) -> Vec<FacetOption> {
    counts
        .into_iter()
        .map(|(value, count)| FacetOption { value, count })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use async_trait::async_trait;
    use trailhead_core::{Category, ListingId, TrailheadError};

    use super::*;
    use crate::criteria::SortKey;

    fn listing(id: &str, category: Category, location: &str, amenities: &[&str], reviews: u32) -> Listing {
        Listing {
            id: ListingId(id.into()),
            title: format!("Listing {id}"),
            description: String::new(),
            category,
            location: location.into(),
            price_amount: 1000.0,
            is_free: false,
            rating: 4.0,
            review_count: reviews,
            amenities: amenities.iter().map(|a| a.to_string()).collect::<BTreeSet<_>>(),
            distance: None,
        }
    }

    fn candidates() -> Vec<Listing> {
        vec![
            listing("s1", Category::Stay, "Manali", &["WiFi", "Parking"], 4),
            listing("t1", Category::Trek, "Kasol", &["Guide"], 12),
            listing("s2", Category::Stay, "Kasol", &["WiFi"], 30),
            listing("c1", Category::Cab, "", &[], 1),
        ]
    }

    fn values(options: &[FacetOption]) -> Vec<&str> {
        options.iter().map(|o| o.value.as_str()).collect()
    }

    #[test]
    fn filters_then_ranks() {
        let engine = SearchEngine::default();
        let criteria = FilterCriteria::new()
            .with_category(Category::Stay)
            .sorted_by(SortKey::Popularity);
        let out = engine.search(&candidates(), &criteria);
        let ids: Vec<_> = out.results.iter().map(|l| l.id.0.as_str()).collect();
        assert_eq!(ids, vec!["s2", "s1"]);
        assert_eq!(out.total, 2);
        assert!(!out.degraded);
    }

    #[test]
    fn facets_come_from_unfiltered_candidates_by_default() {
        let engine = SearchEngine::default();
        let criteria = FilterCriteria::new().with_category(Category::Trek);
        let out = engine.search(&candidates(), &criteria);

        assert_eq!(out.results.len(), 1);
        assert_eq!(values(&out.facets.categories), vec!["Cab", "Stay", "Trek"]);
        assert_eq!(values(&out.facets.locations), vec!["Kasol", "Manali"]);
        assert_eq!(values(&out.facets.amenities), vec!["Guide", "Parking", "WiFi"]);
        assert_eq!(
            out.facets.amenities[2],
            FacetOption {
                value: "WiFi".into(),
                count: 2
            }
        );
    }

    #[test]
    fn facets_can_follow_results() {
        let config = SearchConfig {
            facet_source: FacetSource::Results,
            ..SearchConfig::default()
        };
        let engine = SearchEngine::new(&config);
        let out = engine.search(&candidates(), &FilterCriteria::new().with_category(Category::Trek));
        assert_eq!(values(&out.facets.categories), vec!["Trek"]);
        assert_eq!(values(&out.facets.locations), vec!["Kasol"]);
    }

    #[test]
    fn search_query_uses_configured_domain() {
        let config = SearchConfig {
            min_price: 0.0,
            max_price: 500.0,
            ..SearchConfig::default()
        };
        let engine = SearchEngine::new(&config);
        // No price params: the domain itself is the range, and every listing costs 1000.
        assert_eq!(engine.search_query(&candidates(), "").total, 0);
        assert_eq!(engine.search_query(&candidates(), "max_price=2000").total, 4);
    }

    #[test]
    fn limited_keeps_total() {
        let out = SearchEngine::default()
            .search(&candidates(), &FilterCriteria::new())
            .limited(1);
        assert_eq!(out.results.len(), 1);
        assert_eq!(out.total, 4);
    }

    struct FailingSource;

    #[async_trait]
    impl ListingSource for FailingSource {
        fn name(&self) -> &str {
            "failing"
        }

        async fn load(&self) -> Result<Vec<Listing>, TrailheadError> {
            Err(TrailheadError::store("connection reset"))
        }
    }

    #[tokio::test]
    async fn source_failure_degrades_instead_of_erroring() {
        let out = SearchEngine::default()
            .search_source(&FailingSource, &FilterCriteria::new())
            .await;
        assert!(out.degraded);
        assert!(out.results.is_empty());
        assert_eq!(out.total, 0);
    }
}
