use super::domain::{
    distinct_amenities, is_rera_availability, PropertyForm, PropertyInput, INVESTMENT_SCORE,
};
use super::projection::project;

/// Turns validated form values into a [`PropertyInput`] with derived fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureRecordBuilder {
    reference_year: i32,
}

impl FeatureRecordBuilder {
    pub const fn new(reference_year: i32) -> Self {
        Self { reference_year }
    }

    pub const fn reference_year(&self) -> i32 {
        self.reference_year
    }

    /// Never fails; callers validate bounds first with [`PropertyForm::validate`].
    pub fn build(&self, form: &PropertyForm) -> PropertyInput {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        let availability_status = text(&form.availability_status);

        let amenities = distinct_amenities(&form.amenities);
        let amenities_count = amenities.len() as i64;
        let amenities = amenities.join(", ");

        let rera = is_rera_availability(&availability_status);
        // Availability feeds both the RERA flag and its own term, so it is
        // counted twice. The models were trained on this exact score.
        let multi_factor_score = i64::from(form.bhk >= 3)
            + i64::from(rera)
            + i64::from(is_rera_availability(&availability_status));

        PropertyInput {
            id: form.id,
            state: text(&form.state),
            city: text(&form.city),
            locality: text(&form.locality),
            property_type: text(&form.property_type),
            furnished_status: text(&form.furnished_status),
            public_transport_accessibility: text(&form.public_transport_accessibility),
            parking_space: text(&form.parking_space),
            security: text(&form.security),
            facing: text(&form.facing),
            owner_type: text(&form.owner_type),
            availability_status,
            amenities,
            amenities_count,
            bhk: form.bhk,
            size_sqft: form.size_sqft,
            price_in_lakhs: form.price_in_lakhs,
            price_per_sqft: form.price_per_sqft,
            year_built: form.year_built,
            floor_no: form.floor_no,
            total_floors: form.total_floors,
            age_of_property: i64::from(self.reference_year) - form.year_built,
            nearby_schools: form.nearby_schools,
            nearby_hospitals: form.nearby_hospitals,
            growth_rate_location: form.growth_rate_location,
            rera,
            investment_score: INVESTMENT_SCORE,
            multi_factor_score,
            years: form.years,
            future_price: project(form.price_in_lakhs, form.growth_rate_location, form.years),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_to_move_form() -> PropertyForm {
        PropertyForm {
            availability_status: Some("Ready_To_Move".to_string()),
            bhk: 3,
            year_built: 2015,
            ..PropertyForm::default()
        }
    }

    #[test]
    fn ready_to_move_three_bhk_scores_three() {
        let record = FeatureRecordBuilder::new(2025).build(&ready_to_move_form());

        assert_eq!(record.age_of_property, 10);
        assert!(record.rera);
        assert_eq!(record.multi_factor_score, 3);
        assert_eq!(record.investment_score, 0.6);
        assert_eq!(record.id, 101);
    }

    #[test]
    fn availability_outside_rera_tokens_scores_only_bhk() {
        let form = PropertyForm {
            availability_status: Some("Resale".to_string()),
            bhk: 4,
            ..PropertyForm::default()
        };
        let record = FeatureRecordBuilder::new(2025).build(&form);

        assert!(!record.rera);
        assert_eq!(record.multi_factor_score, 1);
    }

    #[test]
    fn availability_match_is_exact_not_substring() {
        let form = PropertyForm {
            availability_status: Some("ready_to_move_soon".to_string()),
            bhk: 1,
            ..PropertyForm::default()
        };
        let record = FeatureRecordBuilder::new(2025).build(&form);

        assert!(!record.rera);
        assert_eq!(record.multi_factor_score, 0);
    }

    #[test]
    fn under_construction_small_unit_scores_two() {
        let form = PropertyForm {
            availability_status: Some("UNDER_CONSTRUCTION".to_string()),
            bhk: 2,
            ..PropertyForm::default()
        };
        let record = FeatureRecordBuilder::new(2025).build(&form);

        assert!(record.rera);
        assert_eq!(record.multi_factor_score, 2);
    }

    #[test]
    fn empty_amenities_produce_empty_string_and_zero_count() {
        let record = FeatureRecordBuilder::new(2025).build(&PropertyForm::default());

        assert_eq!(record.amenities, "");
        assert_eq!(record.amenities_count, 0);
    }

    #[test]
    fn amenities_keep_insertion_order_and_drop_duplicates() {
        let form = PropertyForm {
            amenities: vec![
                "Pool".to_string(),
                "Gym".to_string(),
                " Pool ".to_string(),
                "Clubhouse".to_string(),
            ],
            ..PropertyForm::default()
        };
        let record = FeatureRecordBuilder::new(2025).build(&form);

        assert_eq!(record.amenities, "Pool, Gym, Clubhouse");
        assert_eq!(record.amenities_count, 3);
    }

    #[test]
    fn future_price_uses_form_years() {
        let form = PropertyForm {
            years: 0,
            ..PropertyForm::default()
        };
        let record = FeatureRecordBuilder::new(2025).build(&form);
        assert_eq!(record.future_price, form.price_in_lakhs);

        let record = FeatureRecordBuilder::new(2025).build(&PropertyForm::default());
        assert!((record.future_price - 753.56).abs() < 0.01);
        assert_eq!(record.years, 5);
    }

    #[test]
    fn missing_categoricals_become_empty_strings() {
        let record = FeatureRecordBuilder::new(2025).build(&PropertyForm::default());
        assert_eq!(record.city, "");
        assert_eq!(record.availability_status, "");
    }
}
