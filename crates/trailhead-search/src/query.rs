// SPDX-FileCopyrightText: 2026 Trailhead Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query-parameter form of [`FilterCriteria`].
//!
//! This is the only externally observable shape of the search surface:
//!
//! | param       | value                                   |
//! |-------------|-----------------------------------------|
//! | `q`         | free text                               |
//! | `min_price` | number, omitted at the domain minimum   |
//! | `max_price` | number, omitted at the domain maximum   |
//! | `rating`    | comma-separated buckets (`3+,4+`)       |
//! | `category`  | comma-separated category names          |
//! | `location`  | comma-separated locations               |
//! | `amenities` | comma-separated amenities               |
//! | `sort`      | sort key, omitted for `popularity`      |
//!
//! List items are form-encoded individually and joined with a literal comma,
//! so values containing commas (`"Leh, Ladakh"`) survive the round trip. Decoding is
//! lenient: unknown parameters, unparseable numbers, and unknown facet values
//! are dropped rather than rejected.

use std::collections::BTreeSet;
use std::fmt::Display;
use std::str::FromStr;

use tracing::debug;
use url::form_urlencoded;

use crate::criteria::{FilterCriteria, PriceRange, SortKey};

pub const PARAM_QUERY: &str = "q";
pub const PARAM_MIN_PRICE: &str = "min_price";
pub const PARAM_MAX_PRICE: &str = "max_price";
pub const PARAM_RATING: &str = "rating";
pub const PARAM_CATEGORY: &str = "category";
pub const PARAM_LOCATION: &str = "location";
pub const PARAM_AMENITIES: &str = "amenities";
pub const PARAM_SORT: &str = "sort";

/// Encodes and decodes criteria against a fixed price domain.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryCodec {
    domain: PriceRange,
}

impl QueryCodec {
    /// `domain` is the full price slider range; it is also what an absent
    /// `min_price` / `max_price` decodes to.
    pub fn new(domain: PriceRange) -> Self {
        Self { domain }
    }

    pub fn domain(&self) -> PriceRange {
        self.domain
    }

    /// Criteria with nothing selected and the full price domain.
    pub fn empty_criteria(&self) -> FilterCriteria {
        FilterCriteria {
            price_range: self.domain,
            ..FilterCriteria::default()
        }
    }

    /// `(name, values)` in a fixed parameter order, values not yet encoded.
    /// Scalar parameters carry exactly one value.
    pub fn to_params(&self, criteria: &FilterCriteria) -> Vec<(&'static str, Vec<String>)> {
        let mut params = Vec::new();

        if let Some(text) = &criteria.free_text {
            params.push((PARAM_QUERY, vec![text.clone()]));
        }
        if criteria.price_range.min != self.domain.min {
            params.push((PARAM_MIN_PRICE, vec![criteria.price_range.min.to_string()]));
        }
        if criteria.price_range.max != self.domain.max {
            params.push((PARAM_MAX_PRICE, vec![criteria.price_range.max.to_string()]));
        }
        push_list(&mut params, PARAM_RATING, &criteria.rating_thresholds);
        push_list(&mut params, PARAM_CATEGORY, &criteria.categories);
        push_list(&mut params, PARAM_LOCATION, &criteria.locations);
        push_list(&mut params, PARAM_AMENITIES, &criteria.amenities);
        if criteria.sort_key != SortKey::Popularity {
            params.push((PARAM_SORT, vec![criteria.sort_key.to_string()]));
        }

        params
    }

    /// Query string without a leading `?`. List separators stay literal.
    pub fn encode(&self, criteria: &FilterCriteria) -> String {
        self.to_params(criteria)
            .into_iter()
            .map(|(name, values)| {
                let encoded: Vec<String> = values.iter().map(|v| encode_component(v)).collect();
                format!("{name}={}", encoded.join(","))
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Parses a query string (a leading `?` is ignored).
    pub fn decode(&self, query: &str) -> FilterCriteria {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut criteria = self.empty_criteria();

        for segment in query.split('&').filter(|s| !s.is_empty()) {
            let (raw_name, raw_value) = segment.split_once('=').unwrap_or((segment, ""));
            match decode_component(raw_name).as_str() {
                PARAM_QUERY => criteria.free_text = Some(decode_component(raw_value)),
                PARAM_MIN_PRICE => {
                    criteria.price_range.min =
                        parse_price(&decode_component(raw_value)).unwrap_or(self.domain.min)
                }
                PARAM_MAX_PRICE => {
                    criteria.price_range.max =
                        parse_price(&decode_component(raw_value)).unwrap_or(self.domain.max)
                }
                PARAM_RATING => criteria.rating_thresholds = parse_list(raw_value),
                PARAM_CATEGORY => criteria.categories = parse_list(raw_value),
                PARAM_LOCATION => criteria.locations = parse_list(raw_value),
                PARAM_AMENITIES => criteria.amenities = parse_list(raw_value),
                PARAM_SORT => {
                    criteria.sort_key = SortKey::parse_lenient(&decode_component(raw_value))
                }
                other => debug!(param = other, "ignoring unknown query parameter"),
            }
        }

        criteria
    }
}

fn push_list<T: Display>(
    params: &mut Vec<(&'static str, Vec<String>)>,
    name: &'static str,
    items: &BTreeSet<T>,
) {
    if !items.is_empty() {
        params.push((name, items.iter().map(ToString::to_string).collect()));
    }
}

/// Splits a still-encoded list value on literal commas and decodes each item.
/// Empty and unparseable items are dropped.
fn parse_list<T: FromStr + Ord>(raw: &str) -> BTreeSet<T> {
    raw.split(',')
        .map(decode_component)
        .filter(|item| !item.is_empty())
        .filter_map(|item| match item.parse::<T>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                debug!(value = %item, "dropping unrecognized facet value");
                None
            }
        })
        .collect()
}

fn encode_component(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Form-decodes one component. A stray unencoded `=` is kept as-is.
fn decode_component(raw: &str) -> String {
    raw.split('=')
        .map(|piece| {
            form_urlencoded::parse(piece.as_bytes())
                .next()
                .map(|(decoded, _)| decoded.into_owned())
                .unwrap_or_default()
        })
        .collect::<Vec<_>>()
        .join("=")
}

fn parse_price(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use trailhead_core::Category;

    use super::*;
    use crate::criteria::RatingBucket;

    fn codec() -> QueryCodec {
        QueryCodec::default()
    }

    fn round_trip(criteria: &FilterCriteria) -> FilterCriteria {
        codec().decode(&codec().encode(criteria))
    }

    #[test]
    fn empty_criteria_round_trips_to_empty_string() {
        let criteria = codec().empty_criteria();
        assert_eq!(codec().encode(&criteria), "");
        assert_eq!(round_trip(&criteria), criteria);
    }

    #[test]
    fn fully_populated_criteria_round_trips() {
        let criteria = FilterCriteria::new()
            .with_free_text("river rafting & camps")
            .with_price_range(1500.0, 8999.5)
            .with_rating_bucket(RatingBucket::new(3).unwrap())
            .with_rating_bucket(RatingBucket::new(4).unwrap())
            .with_category(Category::Stay)
            .with_category(Category::Trek)
            .with_location("Leh, Ladakh")
            .with_location("Manali")
            .with_amenity("WiFi")
            .with_amenity("Hot water, 24h")
            .with_amenity("100% veg")
            .sorted_by(SortKey::PriceDesc);

        assert_eq!(round_trip(&criteria), criteria);
    }

    #[test]
    fn domain_boundary_price_range_round_trips() {
        let at_domain = codec().empty_criteria().with_price_range(0.0, 100_000.0);
        assert_eq!(round_trip(&at_domain), at_domain);

        let at_min_only = codec().empty_criteria().with_price_range(0.0, 0.0);
        assert_eq!(round_trip(&at_min_only), at_min_only);
    }

    #[test]
    fn encoded_form_is_flat_and_readable() {
        let criteria = FilterCriteria::new()
            .with_category(Category::Cab)
            .with_category(Category::Bike)
            .with_rating_bucket(RatingBucket::new(4).unwrap())
            .sorted_by(SortKey::Rating);
        assert_eq!(
            codec().encode(&criteria),
            "rating=4%2B&category=Bike,Cab&sort=rating"
        );
    }

    #[test]
    fn decode_is_lenient() {
        let criteria = codec().decode(
            "?min_price=abc&category=Stay,Yacht&rating=9%2B,4%2B&sort=nearest&utm_source=x",
        );
        assert_eq!(criteria.price_range.min, 0.0);
        assert_eq!(criteria.categories.len(), 1);
        assert!(criteria.categories.contains(&Category::Stay));
        assert_eq!(criteria.rating_thresholds.len(), 1);
        assert_eq!(criteria.sort_key, SortKey::Popularity);
    }

    #[test]
    fn camel_case_sort_keys_decode_and_encode_canonically() {
        for (query, key) in [
            ("sort=priceAsc", SortKey::PriceAsc),
            ("sort=PriceAsc", SortKey::PriceAsc),
            ("sort=priceDesc", SortKey::PriceDesc),
            ("sort=PRICE_DESC", SortKey::PriceDesc),
        ] {
            let criteria = codec().decode(query);
            assert_eq!(criteria.sort_key, key, "{query}");
        }
        let criteria = codec().decode("sort=PriceAsc");
        assert_eq!(codec().encode(&criteria), "sort=price_asc");
    }

    #[test]
    fn custom_domain_drives_defaults() {
        let codec = QueryCodec::new(PriceRange::new(100.0, 5000.0));
        let criteria = codec.decode("");
        assert_eq!(criteria.price_range, PriceRange::new(100.0, 5000.0));
        assert_eq!(codec.encode(&criteria), "");
    }

    proptest! {
        #[test]
        fn arbitrary_facets_round_trip(
            text in proptest::option::of(".{0,20}"),
            min in 0u32..50_000,
            span in 0u32..50_000,
            locations in proptest::collection::btree_set("[A-Za-z ,%&+=]{1,12}", 0..4),
            amenities in proptest::collection::btree_set("[A-Za-z ,%&+=]{1,12}", 0..4),
        ) {
            let mut criteria = FilterCriteria::new()
                .with_price_range(f64::from(min), f64::from(min + span));
            criteria.free_text = text;
            criteria.locations = locations;
            criteria.amenities = amenities;
            prop_assert_eq!(round_trip(&criteria), criteria);
        }
    }
}
