use serde::Serialize;

use super::domain::PropertyInput;
use super::features::FeatureFrame;
use super::prediction::{FeatureImportances, InvestmentLabel};
use crate::workflows::analytics::{Chart, ChartKind, ChartPoint};

/// The normalized record and the exact frame the models would receive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordPreview {
    pub record: PropertyInput,
    pub frame: FeatureFrame,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationView {
    pub good_investment: &'static str,
    pub raw_prediction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceView {
    pub years: u32,
    pub predicted_price: f64,
    pub predicted_price_display: String,
    pub formula_future_price: f64,
    pub formula_future_price_display: String,
}

/// Everything shown after a prediction run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionReport {
    pub record: PropertyInput,
    pub classification: ClassificationView,
    pub price: PriceView,
    pub feature_importances: FeatureImportances,
    pub importance_chart: Chart,
}

impl PredictionReport {
    pub fn new(
        record: PropertyInput,
        label: InvestmentLabel,
        predicted_price: f64,
        feature_importances: FeatureImportances,
    ) -> Self {
        let price = PriceView {
            years: record.years,
            predicted_price,
            predicted_price_display: format!("{predicted_price:.2}"),
            formula_future_price: record.future_price,
            formula_future_price_display: format!("{:.2}", record.future_price),
        };
        let importance_chart = importance_chart(&feature_importances);

        Self {
            classification: ClassificationView {
                good_investment: label.label(),
                raw_prediction: label.raw,
            },
            price,
            feature_importances,
            importance_chart,
            record,
        }
    }
}

fn importance_chart(importances: &FeatureImportances) -> Chart {
    Chart {
        title: "Feature Importance",
        kind: ChartKind::Bar,
        x_label: "Feature",
        y_label: "Importance",
        points: importances
            .ranked()
            .into_iter()
            .map(|(name, weight)| ChartPoint {
                label: name.to_string(),
                value: weight,
            })
            .collect(),
    }
}
