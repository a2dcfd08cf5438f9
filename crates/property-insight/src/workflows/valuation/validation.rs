use serde::Serialize;
use std::fmt::Display;

use super::domain::{CategoricalField, PropertyForm};

/// Inclusive bounds for one numeric form control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bound<T> {
    pub min: T,
    pub max: T,
}

impl<T: Copy + PartialOrd> Bound<T> {
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: T) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Limits enforced on every numeric field before a record is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldBounds {
    pub bhk: Bound<i64>,
    pub size_sqft: Bound<i64>,
    pub price_in_lakhs: Bound<f64>,
    pub price_per_sqft: Bound<f64>,
    pub year_built: Bound<i64>,
    pub floor_no: Bound<i64>,
    pub total_floors: Bound<i64>,
    pub nearby_schools: Bound<i64>,
    pub nearby_hospitals: Bound<i64>,
    pub growth_rate_location: Bound<f64>,
    pub years: Bound<u32>,
}

impl FieldBounds {
    /// Dashboard limits; construction year may not pass the reference year.
    pub fn standard(reference_year: i32) -> Self {
        Self {
            bhk: Bound::new(1, 10),
            size_sqft: Bound::new(200, 10_000),
            price_in_lakhs: Bound::new(1.0, 5000.0),
            price_per_sqft: Bound::new(0.01, 1.0),
            year_built: Bound::new(1950, i64::from(reference_year)),
            floor_no: Bound::new(0, 200),
            total_floors: Bound::new(1, 200),
            nearby_schools: Bound::new(0, 50),
            nearby_hospitals: Bound::new(0, 50),
            growth_rate_location: Bound::new(0.0, 0.20),
            years: Bound::new(1, 50),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: String,
        min: String,
        max: String,
    },
    #[error("{value:?} is not a known {} value", .field.label())]
    UnknownCategory {
        field: CategoricalField,
        value: String,
    },
    #[error("{value:?} is not a known amenity")]
    UnknownAmenity { value: String },
    #[error("property form from {origin} is not valid JSON: {detail}")]
    MalformedForm { origin: String, detail: String },
}

fn check<T>(field: &'static str, bound: Bound<T>, value: T) -> Result<(), InputError>
where
    T: Copy + PartialOrd + Display,
{
    if bound.contains(value) {
        Ok(())
    } else {
        Err(InputError::OutOfRange {
            field,
            value: value.to_string(),
            min: bound.min.to_string(),
            max: bound.max.to_string(),
        })
    }
}

impl PropertyForm {
    /// Parse a JSON form; absent fields take the dashboard defaults.
    pub fn from_json(origin: &str, raw: &str) -> Result<Self, InputError> {
        serde_json::from_str(raw).map_err(|err| InputError::MalformedForm {
            origin: origin.to_string(),
            detail: err.to_string(),
        })
    }

    /// Reject any numeric field outside `bounds`. NaN never passes.
    pub fn validate(&self, bounds: &FieldBounds) -> Result<(), InputError> {
        check("bhk", bounds.bhk, self.bhk)?;
        check("size_sqft", bounds.size_sqft, self.size_sqft)?;
        check("price_in_lakhs", bounds.price_in_lakhs, self.price_in_lakhs)?;
        check("price_per_sqft", bounds.price_per_sqft, self.price_per_sqft)?;
        check("year_built", bounds.year_built, self.year_built)?;
        check("floor_no", bounds.floor_no, self.floor_no)?;
        check("total_floors", bounds.total_floors, self.total_floors)?;
        check("nearby_schools", bounds.nearby_schools, self.nearby_schools)?;
        check(
            "nearby_hospitals",
            bounds.nearby_hospitals,
            self.nearby_hospitals,
        )?;
        check(
            "growth_rate_location",
            bounds.growth_rate_location,
            self.growth_rate_location,
        )?;
        check("years", bounds.years, self.years)?;
        Ok(())
    }
}
