use async_trait::async_trait;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use super::features::FeatureFrame;

/// Classifier verdict on whether the property is a good investment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InvestmentLabel {
    /// Value exactly as the classifier returned it.
    pub raw: f64,
}

impl InvestmentLabel {
    /// Only an exact 1 counts as a positive verdict.
    pub fn is_good_investment(&self) -> bool {
        self.raw == 1.0
    }

    pub fn label(&self) -> &'static str {
        if self.is_good_investment() {
            "Yes"
        } else {
            "No"
        }
    }
}

/// Location of a training artifact in the tracking server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    pub run_id: String,
    pub path: String,
}

/// Per-feature weight computed when the models were trained, kept in the
/// order the artifact lists them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct FeatureImportances(Vec<(String, f64)>);

impl FeatureImportances {
    pub fn entries(&self) -> &[(String, f64)] {
        &self.0
    }

    pub fn weight(&self, feature: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|(name, _)| name == feature)
            .map(|(_, weight)| *weight)
    }

    /// Weights sorted heaviest first, ties broken by feature name.
    pub fn ranked(&self) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self
            .0
            .iter()
            .map(|(name, weight)| (name.as_str(), *weight))
            .collect();
        ranked.sort_by(|left, right| right.1.total_cmp(&left.1).then(left.0.cmp(right.0)));
        ranked
    }
}

impl FromIterator<(String, f64)> for FeatureImportances {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl TryFrom<Map<String, Value>> for FeatureImportances {
    type Error = String;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        map.into_iter()
            .map(|(name, value)| match value.as_f64() {
                Some(weight) => Ok((name, weight)),
                None => Err(format!("importance for '{name}' is not a number: {value}")),
            })
            .collect()
    }
}

impl Serialize for FeatureImportances {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(name, weight)| (name, weight)))
    }
}

/// Failures talking to the model host or the artifact store. Surfaced verbatim.
#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("model host unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{service} returned HTTP {status}: {body}")]
    Status {
        service: String,
        status: u16,
        body: String,
    },
    #[error("{service} returned an unexpected payload: {detail}")]
    Payload { service: String, detail: String },
}

/// The two registered models the dashboard consults.
#[async_trait]
pub trait InvestmentModels: Send + Sync {
    async fn classify(&self, frame: &FeatureFrame) -> Result<InvestmentLabel, PredictionError>;
    async fn regress(&self, frame: &FeatureFrame) -> Result<f64, PredictionError>;
}

/// Read access to artifacts logged alongside the training runs.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn feature_importances(
        &self,
        artifact: &ArtifactRef,
    ) -> Result<FeatureImportances, PredictionError>;
}
