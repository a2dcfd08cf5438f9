//! Turning a user-described property into model features and predictions.

mod builder;
pub mod domain;
mod features;
pub mod mlflow;
mod normalizer;
mod prediction;
mod projection;
pub mod report;
mod service;
mod validation;
mod vocabulary;

pub use builder::FeatureRecordBuilder;
pub use domain::{CategoricalField, PropertyForm, PropertyInput, UNKNOWN_CATEGORY};
pub use features::{FeatureFrame, FeatureValue};
pub use mlflow::{MlflowArtifacts, MlflowModels, RegisteredModel};
pub use normalizer::normalize;
pub use prediction::{
    ArtifactRef, ArtifactStore, FeatureImportances, InvestmentLabel, InvestmentModels,
    PredictionError,
};
pub use projection::project;
pub use report::{PredictionReport, RecordPreview};
pub use service::{FeaturePipeline, ValuationError, ValuationService};
pub use validation::{Bound, FieldBounds, InputError};
pub use vocabulary::FormVocabulary;
