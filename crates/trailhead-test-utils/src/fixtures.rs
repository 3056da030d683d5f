// SPDX-FileCopyrightText: 2026 Trailhead Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sample listing data.

use trailhead_core::Listing;
use trailhead_search::ingest_json;

/// Raw upstream records in the loosely-typed shape the ingestion boundary
/// accepts: mixed `type`/`profession` keys, prices as numbers, strings, and
/// `"Free"`, missing amenities, and one record that must be skipped.
pub const SAMPLE_LISTINGS_JSON: &str = r#"[
  {"id": "stay-manali-cottage", "name": "Riverside Cottage", "type": "Stay",
   "description": "Wooden cottage beside the Beas river", "location": "Manali",
   "price": "₹2,500", "rating": 4.2, "reviewCount": 31,
   "amenities": ["WiFi", "Parking", "Hot water"], "distance": "12 km"},
  {"id": "stay-leh-homestay", "title": "Old Town Homestay", "type": "stay",
   "description": "Family run rooms with rooftop views", "location": "Leh",
   "price": 1800, "rating": "4.6", "reviewCount": "58",
   "amenities": "WiFi, Breakfast", "distance": "430 km"},
  {"id": "trek-hampta", "title": "Hampta Pass Trek", "type": "Trek",
   "description": "Five day crossing from Kullu to Lahaul", "location": "Manali",
   "price": 9500, "rating": 4.8, "reviewCount": 112,
   "amenities": ["Guide", "Meals", "Tents"], "distance": "18 km"},
  {"id": "guide-kasol", "title": "Parvati Valley Guide", "profession": "Guide",
   "description": "Local guide for day hikes", "location": "Kasol",
   "price": 1200, "rating": 3.9, "reviewCount": 14},
  {"id": "place-hadimba", "title": "Hadimba Temple", "type": "Place",
   "description": "Cedar forest temple", "location": "Manali",
   "price": "Free", "rating": 4.5, "reviewCount": 240, "distance": "2 km"},
  {"id": "bike-enfield", "title": "Royal Enfield 350", "type": "Bike",
   "location": "Leh", "price": "1,100 / day", "rating": 4.0, "reviewCount": 9,
   "amenities": ["Helmet"]},
  {"id": "cab-airport", "title": "Airport Transfer", "type": "Cab",
   "description": "Bhuntar airport pickup", "location": "Kullu",
   "price": "call us", "rating": 3.5, "reviewCount": 0},
  {"id": "mystery", "title": "Unknown kind", "type": "Submarine", "location": "Goa"}
]"#;

/// The seven valid sample listings, normalized.
pub fn sample_listings() -> Vec<Listing> {
    ingest_json(SAMPLE_LISTINGS_JSON).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_set_drops_only_the_invalid_record() {
        let listings = sample_listings();
        assert_eq!(listings.len(), 7);
        assert!(listings.iter().all(|l| l.id.0 != "mystery"));
    }

    #[test]
    fn sample_set_exercises_coercions() {
        let listings = sample_listings();
        let by_id = |id: &str| listings.iter().find(|l| l.id.0 == id).unwrap();
        assert!(by_id("place-hadimba").is_free);
        assert_eq!(by_id("stay-manali-cottage").price_amount, 2500.0);
        assert_eq!(by_id("stay-leh-homestay").review_count, 58);
        assert_eq!(by_id("stay-leh-homestay").amenities.len(), 2);
        assert_eq!(by_id("cab-airport").price_amount, 0.0);
        assert!(by_id("guide-kasol").amenities.is_empty());
    }
}
