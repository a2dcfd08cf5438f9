use serde::{Deserialize, Serialize};

use super::domain::{CategoricalField, PropertyInput};

/// A single typed cell in the model input frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl FeatureValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            Self::Text(_) => None,
        }
    }
}

/// One-row frame in the column order and dtypes the models were trained on.
///
/// Serializes as the `dataframe_split` layout model servers accept:
/// `{"columns": [...], "data": [[...]]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureFrame {
    pub columns: Vec<String>,
    pub data: Vec<Vec<FeatureValue>>,
}

impl FeatureFrame {
    pub fn from_record(record: &PropertyInput) -> Self {
        let text = |field: CategoricalField| {
            (
                field.column(),
                FeatureValue::Text(record.categorical(field).to_string()),
            )
        };
        let int = |column: &'static str, value: i64| (column, FeatureValue::Int(value));
        let float = |column: &'static str, value: f64| (column, FeatureValue::Float(value));

        let cells = vec![
            int("ID", record.id),
            text(CategoricalField::State),
            text(CategoricalField::City),
            text(CategoricalField::Locality),
            text(CategoricalField::PropertyType),
            int("BHK", record.bhk),
            int("Size_in_SqFt", record.size_sqft),
            float("Price_in_Lakhs", record.price_in_lakhs),
            float("Price_per_SqFt", record.price_per_sqft),
            int("Year_Built", record.year_built),
            text(CategoricalField::FurnishedStatus),
            int("Floor_No", record.floor_no),
            int("Total_Floors", record.total_floors),
            int("Age_of_Property", record.age_of_property),
            int("Nearby_Schools", record.nearby_schools),
            int("Nearby_Hospitals", record.nearby_hospitals),
            text(CategoricalField::PublicTransportAccessibility),
            text(CategoricalField::ParkingSpace),
            text(CategoricalField::Security),
            ("Amenities", FeatureValue::Text(record.amenities.clone())),
            text(CategoricalField::Facing),
            text(CategoricalField::OwnerType),
            text(CategoricalField::AvailabilityStatus),
            int("Amenities_Count", record.amenities_count),
            float("growth_rate_location", record.growth_rate_location),
            int("RERA", i64::from(record.rera)),
            float("Investment_Score", record.investment_score),
            int("multi_factor_score", record.multi_factor_score),
            float("future_price", record.future_price),
        ];

        let (columns, row): (Vec<&str>, Vec<FeatureValue>) = cells.into_iter().unzip();
        Self {
            columns: columns.into_iter().map(str::to_string).collect(),
            data: vec![row],
        }
    }

    pub fn value(&self, column: &str) -> Option<&FeatureValue> {
        let index = self.columns.iter().position(|name| name == column)?;
        self.data.first()?.get(index)
    }
}
