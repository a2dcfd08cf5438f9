use metrics_exporter_prometheus::PrometheusHandle;
use property_insight::config::AppConfig;
use property_insight::error::AppError;
use property_insight::workflows::listings::ListingCatalog;
use property_insight::workflows::valuation::{
    ArtifactRef, FeaturePipeline, FormVocabulary, MlflowArtifacts, MlflowModels, PropertyForm,
    ValuationService,
};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

use crate::dashboard::Dashboard;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type MlflowDashboard = Dashboard<MlflowModels, MlflowArtifacts>;

/// Static datasets and model clients resolved once at startup.
pub(crate) async fn load_dashboard(config: &AppConfig) -> Result<MlflowDashboard, AppError> {
    let pipeline = load_pipeline(config)?;
    let catalog = ListingCatalog::from_path(&config.datasets.regression)?;
    info!(
        listings = catalog.len(),
        path = %config.datasets.regression.display(),
        "listing catalog loaded"
    );

    let models = MlflowModels::load(&config.models).await?;
    let artifacts = MlflowArtifacts::new(&config.models.tracking_uri);

    Ok(Dashboard {
        valuation: ValuationService::new(
            pipeline,
            Arc::new(models),
            Arc::new(artifacts),
            importance_artifact(config),
        ),
        catalog,
        analytics_path: config.datasets.analytics.clone(),
    })
}

/// Vocabulary and bounds only; used by commands that never call a model.
pub(crate) fn load_pipeline(config: &AppConfig) -> Result<FeaturePipeline, AppError> {
    let vocabulary = FormVocabulary::from_path(&config.datasets.classification)?;
    info!(
        amenities = vocabulary.amenities.len(),
        path = %config.datasets.classification.display(),
        "form vocabulary loaded"
    );
    Ok(FeaturePipeline::new(
        Arc::new(vocabulary),
        config.reference_year,
    ))
}

pub(crate) fn importance_artifact(config: &AppConfig) -> ArtifactRef {
    ArtifactRef {
        run_id: config.models.importance_run_id.clone(),
        path: config.models.importance_artifact.clone(),
    }
}

/// Read a JSON property form; absent fields take the dashboard defaults.
pub(crate) fn read_form(path: Option<&Path>) -> Result<PropertyForm, AppError> {
    let Some(path) = path else {
        return Ok(PropertyForm::default());
    };
    let raw = std::fs::read_to_string(path)?;
    Ok(PropertyForm::from_json(&path.display().to_string(), &raw)?)
}
