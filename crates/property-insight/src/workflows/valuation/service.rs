use std::sync::Arc;
use tracing::{info, warn};

use super::builder::FeatureRecordBuilder;
use super::domain::PropertyForm;
use super::features::FeatureFrame;
use super::normalizer::normalize;
use super::prediction::{ArtifactRef, ArtifactStore, InvestmentModels, PredictionError};
use super::report::{PredictionReport, RecordPreview};
use super::validation::{FieldBounds, InputError};
use super::vocabulary::FormVocabulary;

/// Validation, record building and normalization; no model access needed.
#[derive(Debug, Clone)]
pub struct FeaturePipeline {
    vocabulary: Arc<FormVocabulary>,
    bounds: FieldBounds,
    builder: FeatureRecordBuilder,
}

impl FeaturePipeline {
    pub fn new(vocabulary: Arc<FormVocabulary>, reference_year: i32) -> Self {
        Self {
            vocabulary,
            bounds: FieldBounds::standard(reference_year),
            builder: FeatureRecordBuilder::new(reference_year),
        }
    }

    pub fn vocabulary(&self) -> &FormVocabulary {
        &self.vocabulary
    }

    pub fn bounds(&self) -> &FieldBounds {
        &self.bounds
    }

    pub fn reference_year(&self) -> i32 {
        self.builder.reference_year()
    }

    pub fn preview(&self, form: &PropertyForm) -> Result<RecordPreview, InputError> {
        form.validate(&self.bounds)?;
        self.vocabulary.check(form)?;

        let record = normalize(self.builder.build(form));
        let frame = FeatureFrame::from_record(&record);
        Ok(RecordPreview { record, frame })
    }
}

/// Composes the feature pipeline with the injected model and artifact clients.
pub struct ValuationService<M, A> {
    pipeline: FeaturePipeline,
    models: Arc<M>,
    artifacts: Arc<A>,
    importance_artifact: ArtifactRef,
}

impl<M, A> ValuationService<M, A>
where
    M: InvestmentModels + 'static,
    A: ArtifactStore + 'static,
{
    pub fn new(
        pipeline: FeaturePipeline,
        models: Arc<M>,
        artifacts: Arc<A>,
        importance_artifact: ArtifactRef,
    ) -> Self {
        Self {
            pipeline,
            models,
            artifacts,
            importance_artifact,
        }
    }

    pub fn pipeline(&self) -> &FeaturePipeline {
        &self.pipeline
    }

    pub fn preview(&self, form: &PropertyForm) -> Result<RecordPreview, ValuationError> {
        Ok(self.pipeline.preview(form)?)
    }

    /// Classify, regress and attach feature importances. Any collaborator
    /// failure aborts the run; nothing is retried.
    pub async fn predict(&self, form: &PropertyForm) -> Result<PredictionReport, ValuationError> {
        let RecordPreview { record, frame } = self.pipeline.preview(form)?;

        let label = self.models.classify(&frame).await.inspect_err(|err| {
            warn!(error = %err, "classifier call failed");
        })?;
        let predicted_price = self.models.regress(&frame).await.inspect_err(|err| {
            warn!(error = %err, "regressor call failed");
        })?;
        let importances = self
            .artifacts
            .feature_importances(&self.importance_artifact)
            .await
            .inspect_err(|err| warn!(error = %err, "feature importance download failed"))?;

        info!(
            city = %record.city,
            years = record.years,
            good_investment = label.label(),
            predicted_price,
            "prediction completed"
        );

        Ok(PredictionReport::new(
            record,
            label,
            predicted_price,
            importances,
        ))
    }
}

/// Error raised by the valuation service.
#[derive(Debug, thiserror::Error)]
pub enum ValuationError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Prediction(#[from] PredictionError),
}
