use serde::{Deserialize, Serialize};

/// Placeholder written into categorical fields the user left blank.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Identifier attached to every dashboard record; the models never key on it.
pub const DEFAULT_PROPERTY_ID: i64 = 101;

/// Fixed score the models were trained against for user-entered properties.
pub const INVESTMENT_SCORE: f64 = 0.6;

/// Availability tokens that make a property RERA eligible.
pub const RERA_AVAILABILITY: [&str; 2] = ["ready_to_move", "under_construction"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalField {
    State,
    City,
    Locality,
    PropertyType,
    FurnishedStatus,
    PublicTransportAccessibility,
    ParkingSpace,
    Security,
    Facing,
    OwnerType,
    AvailabilityStatus,
}

impl CategoricalField {
    pub const fn ordered() -> [Self; 11] {
        [
            Self::State,
            Self::City,
            Self::Locality,
            Self::PropertyType,
            Self::FurnishedStatus,
            Self::PublicTransportAccessibility,
            Self::ParkingSpace,
            Self::Security,
            Self::Facing,
            Self::OwnerType,
            Self::AvailabilityStatus,
        ]
    }

    /// Column name in the datasets and in the model feature frame.
    pub const fn column(self) -> &'static str {
        match self {
            Self::State => "State",
            Self::City => "City",
            Self::Locality => "Locality",
            Self::PropertyType => "Property_Type",
            Self::FurnishedStatus => "Furnished_Status",
            Self::PublicTransportAccessibility => "Public_Transport_Accessibility",
            Self::ParkingSpace => "Parking_Space",
            Self::Security => "Security",
            Self::Facing => "Facing",
            Self::OwnerType => "Owner_Type",
            Self::AvailabilityStatus => "Availability_Status",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::State => "State",
            Self::City => "City",
            Self::Locality => "Locality",
            Self::PropertyType => "Property Type",
            Self::FurnishedStatus => "Furnished Status",
            Self::PublicTransportAccessibility => "Public Transport Accessibility",
            Self::ParkingSpace => "Parking Space",
            Self::Security => "Security",
            Self::Facing => "Facing",
            Self::OwnerType => "Owner Type",
            Self::AvailabilityStatus => "Availability Status",
        }
    }
}

/// Raw values as submitted by the dashboard form or the CLI.
///
/// Numeric fields fall back to the dashboard's initial control values when
/// omitted, categorical fields stay empty until normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyForm {
    pub id: i64,
    pub state: Option<String>,
    pub city: Option<String>,
    pub locality: Option<String>,
    pub property_type: Option<String>,
    pub furnished_status: Option<String>,
    pub public_transport_accessibility: Option<String>,
    pub parking_space: Option<String>,
    pub security: Option<String>,
    pub facing: Option<String>,
    pub owner_type: Option<String>,
    pub availability_status: Option<String>,
    pub amenities: Vec<String>,
    pub bhk: i64,
    pub size_sqft: i64,
    pub price_in_lakhs: f64,
    pub price_per_sqft: f64,
    pub year_built: i64,
    pub floor_no: i64,
    pub total_floors: i64,
    pub nearby_schools: i64,
    pub nearby_hospitals: i64,
    pub growth_rate_location: f64,
    pub years: u32,
}

impl Default for PropertyForm {
    fn default() -> Self {
        Self {
            id: DEFAULT_PROPERTY_ID,
            state: None,
            city: None,
            locality: None,
            property_type: None,
            furnished_status: None,
            public_transport_accessibility: None,
            parking_space: None,
            security: None,
            facing: None,
            owner_type: None,
            availability_status: None,
            amenities: Vec::new(),
            bhk: 3,
            size_sqft: 1500,
            price_in_lakhs: 489.76,
            price_per_sqft: 0.08,
            year_built: 2015,
            floor_no: 10,
            total_floors: 20,
            nearby_schools: 5,
            nearby_hospitals: 3,
            growth_rate_location: 0.09,
            years: 5,
        }
    }
}

impl PropertyForm {
    pub fn categorical(&self, field: CategoricalField) -> Option<&str> {
        let value = match field {
            CategoricalField::State => &self.state,
            CategoricalField::City => &self.city,
            CategoricalField::Locality => &self.locality,
            CategoricalField::PropertyType => &self.property_type,
            CategoricalField::FurnishedStatus => &self.furnished_status,
            CategoricalField::PublicTransportAccessibility => &self.public_transport_accessibility,
            CategoricalField::ParkingSpace => &self.parking_space,
            CategoricalField::Security => &self.security,
            CategoricalField::Facing => &self.facing,
            CategoricalField::OwnerType => &self.owner_type,
            CategoricalField::AvailabilityStatus => &self.availability_status,
        };
        value.as_deref()
    }
}

/// One fully derived property record, ready for normalization and scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyInput {
    pub id: i64,
    pub state: String,
    pub city: String,
    pub locality: String,
    pub property_type: String,
    pub furnished_status: String,
    pub public_transport_accessibility: String,
    pub parking_space: String,
    pub security: String,
    pub facing: String,
    pub owner_type: String,
    pub availability_status: String,
    pub amenities: String,
    pub amenities_count: i64,
    pub bhk: i64,
    pub size_sqft: i64,
    pub price_in_lakhs: f64,
    pub price_per_sqft: f64,
    pub year_built: i64,
    pub floor_no: i64,
    pub total_floors: i64,
    pub age_of_property: i64,
    pub nearby_schools: i64,
    pub nearby_hospitals: i64,
    pub growth_rate_location: f64,
    pub rera: bool,
    pub investment_score: f64,
    pub multi_factor_score: i64,
    pub years: u32,
    pub future_price: f64,
}

impl PropertyInput {
    pub fn categorical(&self, field: CategoricalField) -> &str {
        match field {
            CategoricalField::State => &self.state,
            CategoricalField::City => &self.city,
            CategoricalField::Locality => &self.locality,
            CategoricalField::PropertyType => &self.property_type,
            CategoricalField::FurnishedStatus => &self.furnished_status,
            CategoricalField::PublicTransportAccessibility => &self.public_transport_accessibility,
            CategoricalField::ParkingSpace => &self.parking_space,
            CategoricalField::Security => &self.security,
            CategoricalField::Facing => &self.facing,
            CategoricalField::OwnerType => &self.owner_type,
            CategoricalField::AvailabilityStatus => &self.availability_status,
        }
    }

    pub(crate) fn categorical_mut(&mut self, field: CategoricalField) -> &mut String {
        match field {
            CategoricalField::State => &mut self.state,
            CategoricalField::City => &mut self.city,
            CategoricalField::Locality => &mut self.locality,
            CategoricalField::PropertyType => &mut self.property_type,
            CategoricalField::FurnishedStatus => &mut self.furnished_status,
            CategoricalField::PublicTransportAccessibility => {
                &mut self.public_transport_accessibility
            }
            CategoricalField::ParkingSpace => &mut self.parking_space,
            CategoricalField::Security => &mut self.security,
            CategoricalField::Facing => &mut self.facing,
            CategoricalField::OwnerType => &mut self.owner_type,
            CategoricalField::AvailabilityStatus => &mut self.availability_status,
        }
    }
}

/// Case-insensitive exact match against [`RERA_AVAILABILITY`].
pub fn is_rera_availability(status: &str) -> bool {
    let lowered = status.to_lowercase();
    RERA_AVAILABILITY.iter().any(|token| *token == lowered)
}

/// Distinct amenities in first-seen order, blanks dropped.
pub fn distinct_amenities(amenities: &[String]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::with_capacity(amenities.len());
    for amenity in amenities {
        let trimmed = amenity.trim();
        if !trimmed.is_empty() && !seen.contains(&trimmed) {
            seen.push(trimmed);
        }
    }
    seen
}
