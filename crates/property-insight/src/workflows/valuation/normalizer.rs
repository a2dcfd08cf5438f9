use super::domain::{CategoricalField, PropertyInput, UNKNOWN_CATEGORY};

fn fill_blank(value: &mut String) {
    if value.trim().is_empty() {
        *value = UNKNOWN_CATEGORY.to_string();
    }
}

/// Replace blank categorical values (and a blank amenities list) with
/// [`UNKNOWN_CATEGORY`]. Numeric fields pass through untouched.
pub fn normalize(mut record: PropertyInput) -> PropertyInput {
    for field in CategoricalField::ordered() {
        fill_blank(record.categorical_mut(field));
    }
    fill_blank(&mut record.amenities);
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::valuation::builder::FeatureRecordBuilder;
    use crate::workflows::valuation::domain::PropertyForm;

    fn blank_record() -> PropertyInput {
        FeatureRecordBuilder::new(2025).build(&PropertyForm {
            city: Some("Pune".to_string()),
            locality: Some("   ".to_string()),
            ..PropertyForm::default()
        })
    }

    #[test]
    fn blank_categoricals_become_unknown() {
        let normalized = normalize(blank_record());

        assert_eq!(normalized.city, "Pune");
        assert_eq!(normalized.locality, UNKNOWN_CATEGORY);
        assert_eq!(normalized.state, UNKNOWN_CATEGORY);
        for field in CategoricalField::ordered() {
            assert!(
                !normalized.categorical(field).trim().is_empty(),
                "{} left blank",
                field.label()
            );
        }
    }

    #[test]
    fn empty_amenities_are_marked_unknown_but_count_stays_zero() {
        let normalized = normalize(blank_record());

        assert_eq!(normalized.amenities, UNKNOWN_CATEGORY);
        assert_eq!(normalized.amenities_count, 0);
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize(blank_record());
        let twice = normalize(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn numeric_fields_pass_through() {
        let record = blank_record();
        let normalized = normalize(record.clone());

        assert_eq!(normalized.price_in_lakhs, record.price_in_lakhs);
        assert_eq!(normalized.future_price, record.future_price);
        assert_eq!(normalized.multi_factor_score, record.multi_factor_score);
        assert_eq!(normalized.age_of_property, record.age_of_property);
    }
}
