use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use super::catalog::PropertyListing;

/// City membership plus inclusive price, BHK and size windows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingFilter {
    pub cities: BTreeSet<String>,
    pub price: RangeInclusive<f64>,
    pub bhk: RangeInclusive<i64>,
    pub size: RangeInclusive<i64>,
}

impl ListingFilter {
    /// Every city and the full observed range of each slider; `None` when
    /// there are no listings to span. Non-finite prices never widen the
    /// price window.
    pub fn spanning(listings: &[PropertyListing]) -> Option<Self> {
        let first = &listings.first()?.record;
        let mut filter = Self {
            cities: BTreeSet::new(),
            price: f64::INFINITY..=f64::NEG_INFINITY,
            bhk: first.bhk..=first.bhk,
            size: first.size_sqft..=first.size_sqft,
        };

        for listing in listings {
            let record = &listing.record;
            filter.cities.insert(record.city.clone());
            if record.price_in_lakhs.is_finite() {
                filter.price = widen(&filter.price, record.price_in_lakhs);
            }
            filter.bhk = widen(&filter.bhk, record.bhk);
            filter.size = widen(&filter.size, record.size_sqft);
        }

        // Sliders move in whole lakhs; round outward so the extremes stay in.
        filter.price = if filter.price.start() <= filter.price.end() {
            filter.price.start().floor()..=filter.price.end().ceil()
        } else {
            0.0..=0.0
        };
        Some(filter)
    }

    pub fn matches(&self, listing: &PropertyListing) -> bool {
        let record = &listing.record;
        self.cities.contains(&record.city)
            && self.price.contains(&record.price_in_lakhs)
            && self.bhk.contains(&record.bhk)
            && self.size.contains(&record.size_sqft)
    }

    /// Lazily yield matching listings in their original order.
    pub fn apply<'a>(
        &'a self,
        listings: &'a [PropertyListing],
    ) -> impl Iterator<Item = &'a PropertyListing> + 'a {
        listings.iter().filter(move |listing| self.matches(listing))
    }
}

fn widen<T: PartialOrd + Copy>(range: &RangeInclusive<T>, value: T) -> RangeInclusive<T> {
    let start = if value < *range.start() {
        value
    } else {
        *range.start()
    };
    let end = if value > *range.end() {
        value
    } else {
        *range.end()
    };
    start..=end
}

/// Partially specified filter; absent pieces fall back to the spanning defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingQuery {
    pub cities: Option<Vec<String>>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub bhk_min: Option<i64>,
    pub bhk_max: Option<i64>,
    pub size_min: Option<i64>,
    pub size_max: Option<i64>,
}

impl ListingQuery {
    pub fn resolve(&self, defaults: &ListingFilter) -> ListingFilter {
        let cities = match &self.cities {
            Some(cities) => cities.iter().cloned().collect(),
            None => defaults.cities.clone(),
        };

        ListingFilter {
            cities,
            price: self.price_min.unwrap_or(*defaults.price.start())
                ..=self.price_max.unwrap_or(*defaults.price.end()),
            bhk: self.bhk_min.unwrap_or(*defaults.bhk.start())
                ..=self.bhk_max.unwrap_or(*defaults.bhk.end()),
            size: self.size_min.unwrap_or(*defaults.size.start())
                ..=self.size_max.unwrap_or(*defaults.size.end()),
        }
    }
}
