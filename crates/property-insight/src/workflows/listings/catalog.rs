use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;
use tracing::warn;

use crate::workflows::dataset::{self, DatasetError};
use crate::workflows::valuation::project;

/// One usable row of the listing dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingRecord {
    #[serde(rename = "ID")]
    pub id: Option<i64>,
    #[serde(rename = "State")]
    pub state: Option<String>,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Locality")]
    pub locality: Option<String>,
    #[serde(rename = "Property_Type")]
    pub property_type: Option<String>,
    #[serde(rename = "BHK")]
    pub bhk: i64,
    #[serde(rename = "Size_in_SqFt")]
    pub size_sqft: i64,
    #[serde(rename = "Price_in_Lakhs")]
    pub price_in_lakhs: f64,
    #[serde(rename = "growth_rate_location")]
    pub growth_rate_location: f64,
}

/// A row as stored on disk. Blank or non-finite numeric cells are `None`.
#[derive(Debug, Deserialize)]
struct ListingRow {
    #[serde(rename = "ID", default, deserialize_with = "optional_whole_number")]
    id: Option<i64>,
    #[serde(rename = "State", default)]
    state: Option<String>,
    #[serde(rename = "City", default)]
    city: Option<String>,
    #[serde(rename = "Locality", default)]
    locality: Option<String>,
    #[serde(rename = "Property_Type", default)]
    property_type: Option<String>,
    #[serde(rename = "BHK", deserialize_with = "optional_whole_number")]
    bhk: Option<i64>,
    #[serde(rename = "Size_in_SqFt", deserialize_with = "optional_whole_number")]
    size_sqft: Option<i64>,
    #[serde(rename = "Price_in_Lakhs", deserialize_with = "optional_number")]
    price_in_lakhs: Option<f64>,
    #[serde(rename = "growth_rate_location", deserialize_with = "optional_number")]
    growth_rate_location: Option<f64>,
}

impl ListingRow {
    /// `None` when any value the filter or projection needs is missing.
    fn into_record(self) -> Option<ListingRecord> {
        Some(ListingRecord {
            id: self.id,
            state: self.state,
            city: self.city.unwrap_or_default(),
            locality: self.locality,
            property_type: self.property_type,
            bhk: self.bhk?,
            size_sqft: self.size_sqft?,
            price_in_lakhs: self.price_in_lakhs?,
            growth_rate_location: self.growth_rate_location?,
        })
    }
}

/// A listing with its price projected over the dashboard's horizon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyListing {
    #[serde(flatten)]
    pub record: ListingRecord,
    pub years: u32,
    pub future_price: f64,
}

impl PropertyListing {
    pub fn from_record(record: ListingRecord, years: u32) -> Self {
        let future_price = project(record.price_in_lakhs, record.growth_rate_location, years);
        Self {
            record,
            years,
            future_price,
        }
    }
}

/// Read-only listing rows loaded once from the regression dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingCatalog {
    records: Vec<ListingRecord>,
}

impl ListingCatalog {
    pub fn new(records: Vec<ListingRecord>) -> Self {
        Self { records }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let file = dataset::open(path.as_ref())?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut csv_reader = dataset::csv_reader(reader);
        let mut records = Vec::new();
        let mut incomplete = 0_usize;
        for row in csv_reader.deserialize::<ListingRow>() {
            match row?.into_record() {
                Some(record) => records.push(record),
                None => incomplete += 1,
            }
        }

        if incomplete > 0 {
            warn!(
                skipped = incomplete,
                kept = records.len(),
                "listings missing BHK, size, price or growth rate were skipped"
            );
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[ListingRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn cities(&self) -> BTreeSet<&str> {
        self.records
            .iter()
            .map(|record| record.city.as_str())
            .collect()
    }

    /// Every listing projected with the same `years` as the user's property.
    pub fn project(&self, years: u32) -> Vec<PropertyListing> {
        self.records
            .iter()
            .cloned()
            .map(|record| PropertyListing::from_record(record, years))
            .collect()
    }
}

fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    let Some(raw) = opt.filter(|value| !value.trim().is_empty()) else {
        return Ok(None);
    };

    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| serde::de::Error::custom(format!("expected a number, got '{raw}'")))?;
    Ok(value.is_finite().then_some(value))
}

fn optional_whole_number<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match optional_number(deserializer)? {
        Some(value) if value.fract() != 0.0 => Err(serde::de::Error::custom(format!(
            "expected a whole number, got '{value}'"
        ))),
        value => Ok(value.map(|value| value as i64)),
    }
}
