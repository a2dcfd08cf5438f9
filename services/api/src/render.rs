use crate::dashboard::{build_session, DashboardRequest, DashboardSession};
use crate::infra::{importance_artifact, load_pipeline, read_form};
use clap::Args;
use property_insight::config::AppConfig;
use property_insight::error::AppError;
use property_insight::workflows::analytics::{AnalyticsReport, PanelOutcome};
use property_insight::workflows::listings::{ListingCatalog, ListingQuery};
use property_insight::workflows::valuation::{
    FeatureValue, MlflowArtifacts, MlflowModels, PredictionReport, RecordPreview,
    ValuationService,
};
use std::path::PathBuf;
use std::sync::Arc;

const BAR_WIDTH: usize = 40;

#[derive(Args, Debug, Default)]
pub(crate) struct FormArgs {
    /// JSON file with the property form; omitted fields use the dashboard defaults
    #[arg(long)]
    pub(crate) form: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ListingsArgs {
    /// JSON property form; its `years` sets the projection horizon
    #[arg(long)]
    pub(crate) form: Option<PathBuf>,
    /// Restrict to these cities (repeatable). Defaults to every city.
    #[arg(long = "city")]
    pub(crate) cities: Vec<String>,
    #[arg(long)]
    pub(crate) price_min: Option<f64>,
    #[arg(long)]
    pub(crate) price_max: Option<f64>,
    #[arg(long)]
    pub(crate) bhk_min: Option<i64>,
    #[arg(long)]
    pub(crate) bhk_max: Option<i64>,
    #[arg(long)]
    pub(crate) size_min: Option<i64>,
    #[arg(long)]
    pub(crate) size_max: Option<i64>,
}

impl ListingsArgs {
    fn query(self) -> ListingQuery {
        ListingQuery {
            cities: (!self.cities.is_empty()).then_some(self.cities),
            price_min: self.price_min,
            price_max: self.price_max,
            bhk_min: self.bhk_min,
            bhk_max: self.bhk_max,
            size_min: self.size_min,
            size_max: self.size_max,
        }
    }
}

#[derive(Args, Debug, Default)]
pub(crate) struct AnalyticsArgs {
    /// Cleaned dataset to chart (defaults to APP_ANALYTICS_DATA)
    #[arg(long)]
    pub(crate) data: Option<PathBuf>,
}

pub(crate) fn run_preview(config: &AppConfig, args: FormArgs) -> Result<(), AppError> {
    let pipeline = load_pipeline(config)?;
    let form = read_form(args.form.as_deref())?;
    let preview = pipeline.preview(&form)?;
    render_preview(&preview);
    Ok(())
}

pub(crate) async fn run_predict(config: &AppConfig, args: FormArgs) -> Result<(), AppError> {
    let pipeline = load_pipeline(config)?;
    let form = read_form(args.form.as_deref())?;
    let models = MlflowModels::load(&config.models).await?;
    let service = ValuationService::new(
        pipeline,
        Arc::new(models),
        Arc::new(MlflowArtifacts::new(&config.models.tracking_uri)),
        importance_artifact(config),
    );

    let report = service.predict(&form).await?;
    render_prediction(&report);
    Ok(())
}

pub(crate) fn run_listings(config: &AppConfig, mut args: ListingsArgs) -> Result<(), AppError> {
    let pipeline = load_pipeline(config)?;
    let catalog = ListingCatalog::from_path(&config.datasets.regression)?;
    let form = read_form(args.form.take().as_deref())?;
    let request = DashboardRequest {
        form,
        query: args.query(),
    };

    let session = build_session(&pipeline, &catalog, &request)?;
    render_listings(&session);
    Ok(())
}

pub(crate) fn run_analytics(config: &AppConfig, args: AnalyticsArgs) -> Result<(), AppError> {
    let path = args
        .data
        .unwrap_or_else(|| config.datasets.analytics.clone());
    let report = AnalyticsReport::from_path(&path)?;
    render_analytics(&report);
    Ok(())
}

fn render_preview(preview: &RecordPreview) {
    let record = &preview.record;
    println!("Property record");
    println!(
        "- {} | {} | {} | {} BHK | {} sqft",
        record.city, record.locality, record.property_type, record.bhk, record.size_sqft
    );
    println!(
        "- Age {} years | RERA {} | multi-factor score {}",
        record.age_of_property,
        if record.rera { "yes" } else { "no" },
        record.multi_factor_score
    );
    println!(
        "- Amenities: {} ({} listed)",
        record.amenities, record.amenities_count
    );
    println!(
        "- Future price after {} years: {:.2} lakhs",
        record.years, record.future_price
    );

    println!("\nModel features");
    let Some(row) = preview.frame.data.first() else {
        return;
    };
    let width = preview
        .frame
        .columns
        .iter()
        .map(|column| column.len())
        .max()
        .unwrap_or(0);
    for (column, value) in preview.frame.columns.iter().zip(row) {
        println!("  {column:<width$}  {}", feature_text(value));
    }
}

fn render_prediction(report: &PredictionReport) {
    println!("Valuation for {} ({})", report.record.city, report.record.locality);
    println!(
        "- Good investment: {} (raw prediction {})",
        report.classification.good_investment, report.classification.raw_prediction
    );
    println!(
        "- Estimated price in {} years: {} lakhs",
        report.price.years, report.price.predicted_price_display
    );
    println!(
        "- Formula projection: {} lakhs",
        report.price.formula_future_price_display
    );

    if report.importance_chart.points.is_empty() {
        println!("\nNo feature importances recorded for the model run.");
        return;
    }
    println!("\n{}", report.importance_chart.title);
    print!("{}", report.importance_chart.render_text(BAR_WIDTH));
}

fn render_listings(session: &DashboardSession) {
    let record = &session.preview.record;
    println!(
        "Your property: {:.2} -> {:.2} lakhs after {} years",
        record.price_in_lakhs, record.future_price, record.years
    );

    let response = &session.listings;
    println!(
        "{} of {} listings match (prices projected {} years)",
        response.matched, response.total, response.years
    );
    for listing in &response.listings {
        let record = &listing.record;
        println!(
            "- {} | {} | {} | {} BHK | {} sqft | {:.2} -> {:.2} lakhs",
            record
                .id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string()),
            record.city,
            record.locality.as_deref().unwrap_or("-"),
            record.bhk,
            record.size_sqft,
            record.price_in_lakhs,
            listing.future_price
        );
    }
}

fn render_analytics(report: &AnalyticsReport) {
    println!("Market analytics ({} rows)", report.rows);
    for view in &report.panels {
        println!("\n{}", view.title);
        match &view.outcome {
            PanelOutcome::Rendered { chart } => {
                println!("{} vs {}", chart.y_label, chart.x_label);
                print!("{}", chart.render_text(BAR_WIDTH));
            }
            PanelOutcome::Skipped { warning } => println!("warning: {warning}"),
        }
    }
}

fn feature_text(value: &FeatureValue) -> String {
    match value {
        FeatureValue::Int(value) => value.to_string(),
        FeatureValue::Float(value) => format!("{value}"),
        FeatureValue::Text(value) => value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_city_list_means_every_city() {
        assert!(ListingsArgs::default().query().cities.is_none());

        let query = ListingsArgs {
            cities: vec!["Pune".to_string()],
            bhk_max: Some(3),
            ..ListingsArgs::default()
        }
        .query();
        assert_eq!(query.cities, Some(vec!["Pune".to_string()]));
        assert_eq!(query.bhk_max, Some(3));
    }

    #[test]
    fn feature_cells_print_without_type_tags() {
        assert_eq!(feature_text(&FeatureValue::Int(3)), "3");
        assert_eq!(feature_text(&FeatureValue::Float(0.08)), "0.08");
        assert_eq!(feature_text(&FeatureValue::Text("Pune".to_string())), "Pune");
    }
}
