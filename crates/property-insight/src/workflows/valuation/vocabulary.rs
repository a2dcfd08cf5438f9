use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::Path;

use super::domain::{CategoricalField, PropertyForm};
use super::validation::InputError;
use crate::workflows::dataset::{self, DatasetError};

const AMENITIES_COLUMN: &str = "Amenities";

/// Allowed values for every categorical control, taken from the reference dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormVocabulary {
    pub categories: BTreeMap<CategoricalField, BTreeSet<String>>,
    /// Single amenities split out of the dataset's comma lists. The models
    /// were trained on the whole lists as distinct values, so a selection
    /// here can produce an `Amenities` string and count they never saw.
    pub amenities: BTreeSet<String>,
}

impl FormVocabulary {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let file = dataset::open(path.as_ref())?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut csv_reader = dataset::csv_reader(reader);
        let headers = csv_reader.headers()?.clone();

        let mut columns = Vec::with_capacity(CategoricalField::ordered().len());
        for field in CategoricalField::ordered() {
            columns.push((field, dataset::require_column(&headers, field.column())?));
        }
        let amenities_index = dataset::require_column(&headers, AMENITIES_COLUMN)?;

        let mut vocabulary = Self::default();
        for record in csv_reader.records() {
            let record = record?;
            for (field, index) in &columns {
                if let Some(value) = record.get(*index).filter(|value| !value.is_empty()) {
                    vocabulary
                        .categories
                        .entry(*field)
                        .or_default()
                        .insert(value.to_string());
                }
            }

            if let Some(raw) = record.get(amenities_index) {
                vocabulary.amenities.extend(
                    raw.split(',')
                        .map(str::trim)
                        .filter(|amenity| !amenity.is_empty())
                        .map(str::to_string),
                );
            }
        }

        Ok(vocabulary)
    }

    pub fn values(&self, field: CategoricalField) -> impl Iterator<Item = &str> {
        self.categories
            .get(&field)
            .into_iter()
            .flat_map(|values| values.iter().map(String::as_str))
    }

    /// Reject non-blank values the reference dataset has never seen.
    pub fn check(&self, form: &PropertyForm) -> Result<(), InputError> {
        for field in CategoricalField::ordered() {
            let Some(value) = form.categorical(field).filter(|value| !value.trim().is_empty())
            else {
                continue;
            };

            let known = self
                .categories
                .get(&field)
                .is_some_and(|values| values.contains(value));
            if !known {
                return Err(InputError::UnknownCategory {
                    field,
                    value: value.to_string(),
                });
            }
        }

        for amenity in &form.amenities {
            let trimmed = amenity.trim();
            if !trimmed.is_empty() && !self.amenities.contains(trimmed) {
                return Err(InputError::UnknownAmenity {
                    value: trimmed.to_string(),
                });
            }
        }

        Ok(())
    }
}
