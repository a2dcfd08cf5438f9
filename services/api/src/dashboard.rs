use property_insight::workflows::analytics::AnalyticsReport;
use property_insight::workflows::dataset::DatasetError;
use property_insight::workflows::listings::{
    ListingCatalog, ListingFilter, ListingQuery, PropertyListing,
};
use property_insight::workflows::valuation::{
    ArtifactStore, FeaturePipeline, FieldBounds, FormVocabulary, InputError, InvestmentModels,
    PredictionReport, PropertyForm, RecordPreview, ValuationError, ValuationService,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Form controls a client needs to render the property input panel.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct FormOptions<'a> {
    pub(crate) reference_year: i32,
    pub(crate) vocabulary: &'a FormVocabulary,
    pub(crate) bounds: &'a FieldBounds,
    pub(crate) defaults: PropertyForm,
}

/// One dashboard interaction: the property form and the listing filter.
/// The form's `years` is the only projection horizon.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct DashboardRequest {
    pub(crate) form: PropertyForm,
    pub(crate) query: ListingQuery,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ListingSearchResponse {
    pub(crate) years: u32,
    pub(crate) total: usize,
    pub(crate) matched: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) filter: Option<ListingFilter>,
    pub(crate) listings: Vec<PropertyListing>,
}

/// The user's record next to the listings, projected over the same years.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct DashboardSession {
    #[serde(flatten)]
    pub(crate) preview: RecordPreview,
    pub(crate) listings: ListingSearchResponse,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct DashboardPrediction {
    #[serde(flatten)]
    pub(crate) report: PredictionReport,
    pub(crate) listings: ListingSearchResponse,
}

/// Everything a dashboard session reads: models, listings and analytics.
pub(crate) struct Dashboard<M, A> {
    pub(crate) valuation: ValuationService<M, A>,
    pub(crate) catalog: ListingCatalog,
    pub(crate) analytics_path: PathBuf,
}

impl<M, A> Dashboard<M, A>
where
    M: InvestmentModels + 'static,
    A: ArtifactStore + 'static,
{
    pub(crate) fn form_options(&self) -> FormOptions<'_> {
        let pipeline = self.valuation.pipeline();
        FormOptions {
            reference_year: pipeline.reference_year(),
            vocabulary: pipeline.vocabulary(),
            bounds: pipeline.bounds(),
            defaults: PropertyForm::default(),
        }
    }

    pub(crate) fn session(
        &self,
        request: &DashboardRequest,
    ) -> Result<DashboardSession, ValuationError> {
        Ok(build_session(
            self.valuation.pipeline(),
            &self.catalog,
            request,
        )?)
    }

    pub(crate) async fn predict(
        &self,
        request: &DashboardRequest,
    ) -> Result<DashboardPrediction, ValuationError> {
        let report = self.valuation.predict(&request.form).await?;
        let listings = search_catalog(&self.catalog, report.record.years, &request.query);
        Ok(DashboardPrediction { report, listings })
    }

    pub(crate) fn analytics(&self) -> Result<AnalyticsReport, DatasetError> {
        AnalyticsReport::from_path(&self.analytics_path)
    }
}

/// Build the record and filter the listings with the record's horizon.
pub(crate) fn build_session(
    pipeline: &FeaturePipeline,
    catalog: &ListingCatalog,
    request: &DashboardRequest,
) -> Result<DashboardSession, InputError> {
    let preview = pipeline.preview(&request.form)?;
    let listings = search_catalog(catalog, preview.record.years, &request.query);
    Ok(DashboardSession { preview, listings })
}

/// Project the catalog over `years` and apply the query.
pub(crate) fn search_catalog(
    catalog: &ListingCatalog,
    years: u32,
    query: &ListingQuery,
) -> ListingSearchResponse {
    let projected = catalog.project(years);
    let filter = ListingFilter::spanning(&projected).map(|defaults| query.resolve(&defaults));
    let listings: Vec<PropertyListing> = match &filter {
        Some(filter) => filter.apply(&projected).cloned().collect(),
        None => Vec::new(),
    };

    ListingSearchResponse {
        years,
        total: projected.len(),
        matched: listings.len(),
        filter,
        listings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use property_insight::workflows::listings::ListingRecord;
    use property_insight::workflows::valuation::{
        project, ArtifactRef, FeatureFrame, FeatureImportances, InvestmentLabel, PredictionError,
    };
    use std::sync::Arc;

    struct FlatModels;

    #[async_trait]
    impl InvestmentModels for FlatModels {
        async fn classify(&self, _frame: &FeatureFrame) -> Result<InvestmentLabel, PredictionError> {
            Ok(InvestmentLabel { raw: 0.0 })
        }

        async fn regress(&self, _frame: &FeatureFrame) -> Result<f64, PredictionError> {
            Ok(500.0)
        }
    }

    struct NoArtifacts;

    #[async_trait]
    impl ArtifactStore for NoArtifacts {
        async fn feature_importances(
            &self,
            _artifact: &ArtifactRef,
        ) -> Result<FeatureImportances, PredictionError> {
            Ok(FeatureImportances::default())
        }
    }

    fn record(city: &str, price: f64, bhk: i64) -> ListingRecord {
        ListingRecord {
            id: None,
            state: None,
            city: city.to_string(),
            locality: None,
            property_type: None,
            bhk,
            size_sqft: 1000,
            price_in_lakhs: price,
            growth_rate_location: 0.1,
        }
    }

    fn catalog() -> ListingCatalog {
        ListingCatalog::new(vec![
            record("Pune", 150.0, 2),
            record("Pune", 420.0, 3),
            record("Chennai", 90.0, 1),
        ])
    }

    fn dashboard(catalog: ListingCatalog) -> Dashboard<FlatModels, NoArtifacts> {
        Dashboard {
            valuation: ValuationService::new(
                FeaturePipeline::new(Arc::new(FormVocabulary::default()), 2025),
                Arc::new(FlatModels),
                Arc::new(NoArtifacts),
                ArtifactRef {
                    run_id: "run".to_string(),
                    path: "feature_importances.json".to_string(),
                },
            ),
            catalog,
            analytics_path: PathBuf::from("cleaned_data.csv"),
        }
    }

    fn request(years: u32, query: ListingQuery) -> DashboardRequest {
        DashboardRequest {
            form: PropertyForm {
                years,
                ..PropertyForm::default()
            },
            query,
        }
    }

    #[test]
    fn search_defaults_to_every_listing() {
        let response = search_catalog(&catalog(), 5, &ListingQuery::default());

        assert_eq!(response.years, 5);
        assert_eq!(response.total, 3);
        assert_eq!(response.matched, 3);
    }

    #[test]
    fn session_projects_record_and_listings_with_form_years() {
        let query = ListingQuery {
            cities: Some(vec!["Pune".to_string()]),
            price_max: Some(200.0),
            ..ListingQuery::default()
        };
        let session = dashboard(catalog())
            .session(&request(2, query))
            .expect("session builds");

        let record = &session.preview.record;
        assert_eq!(record.years, 2);
        assert_eq!(
            record.future_price,
            project(record.price_in_lakhs, record.growth_rate_location, 2)
        );

        assert_eq!(session.listings.years, 2);
        assert_eq!(session.listings.matched, 1);
        let listing = &session.listings.listings[0];
        assert_eq!(listing.years, record.years);
        assert!((listing.future_price - 181.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn prediction_and_listings_share_the_horizon() {
        let prediction = dashboard(catalog())
            .predict(&request(12, ListingQuery::default()))
            .await
            .expect("prediction runs");

        assert_eq!(prediction.report.price.years, 12);
        assert_eq!(prediction.listings.years, 12);
        assert!(prediction
            .listings
            .listings
            .iter()
            .all(|listing| listing.years == prediction.report.record.years));
    }

    #[test]
    fn session_rejects_out_of_range_years() {
        assert!(matches!(
            dashboard(catalog()).session(&request(51, ListingQuery::default())),
            Err(ValuationError::Input(InputError::OutOfRange {
                field: "years",
                ..
            }))
        ));
    }

    #[test]
    fn nan_price_does_not_empty_the_default_search() {
        let catalog = ListingCatalog::new(vec![
            record("Pune", f64::NAN, 2),
            record("Pune", 150.0, 2),
            record("Pune", 420.0, 3),
        ]);
        let response = search_catalog(&catalog, 5, &ListingQuery::default());

        assert_eq!(response.matched, 2);
        let filter = response.filter.expect("catalog not empty");
        assert_eq!(filter.price, 150.0..=420.0);
    }

    #[test]
    fn empty_catalog_returns_no_filter() {
        let response = search_catalog(&ListingCatalog::default(), 5, &ListingQuery::default());

        assert_eq!(response.matched, 0);
        assert!(response.filter.is_none());
    }
}
