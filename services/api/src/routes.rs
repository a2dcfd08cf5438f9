use crate::dashboard::{
    Dashboard, DashboardPrediction, DashboardRequest, DashboardSession, ListingSearchResponse,
};
use crate::infra::AppState;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use property_insight::error::AppError;
use property_insight::workflows::analytics::AnalyticsReport;
use property_insight::workflows::valuation::{
    ArtifactStore, InvestmentModels, PredictionReport, PropertyForm, RecordPreview,
};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn dashboard_router<M, A>(dashboard: Arc<Dashboard<M, A>>) -> Router
where
    M: InvestmentModels + 'static,
    A: ArtifactStore + 'static,
{
    Router::new()
        .route("/api/v1/valuation/form", get(form_handler::<M, A>))
        .route("/api/v1/valuation/preview", post(preview_handler::<M, A>))
        .route("/api/v1/valuation/predict", post(predict_handler::<M, A>))
        .route("/api/v1/listings/search", post(search_handler::<M, A>))
        .route("/api/v1/dashboard/session", post(session_handler::<M, A>))
        .route(
            "/api/v1/dashboard/predict",
            post(dashboard_predict_handler::<M, A>),
        )
        .route("/api/v1/analytics", get(analytics_handler::<M, A>))
        .with_state(dashboard)
}

pub(crate) fn with_dashboard_routes<M, A>(dashboard: Arc<Dashboard<M, A>>) -> Router
where
    M: InvestmentModels + 'static,
    A: ArtifactStore + 'static,
{
    dashboard_router(dashboard)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

async fn form_handler<M, A>(State(dashboard): State<Arc<Dashboard<M, A>>>) -> Response
where
    M: InvestmentModels + 'static,
    A: ArtifactStore + 'static,
{
    Json(dashboard.form_options()).into_response()
}

async fn preview_handler<M, A>(
    State(dashboard): State<Arc<Dashboard<M, A>>>,
    Json(form): Json<PropertyForm>,
) -> Result<Json<RecordPreview>, AppError>
where
    M: InvestmentModels + 'static,
    A: ArtifactStore + 'static,
{
    Ok(Json(dashboard.valuation.preview(&form)?))
}

async fn predict_handler<M, A>(
    State(dashboard): State<Arc<Dashboard<M, A>>>,
    Json(form): Json<PropertyForm>,
) -> Result<Json<PredictionReport>, AppError>
where
    M: InvestmentModels + 'static,
    A: ArtifactStore + 'static,
{
    Ok(Json(dashboard.valuation.predict(&form).await?))
}

async fn search_handler<M, A>(
    State(dashboard): State<Arc<Dashboard<M, A>>>,
    Json(request): Json<DashboardRequest>,
) -> Result<Json<ListingSearchResponse>, AppError>
where
    M: InvestmentModels + 'static,
    A: ArtifactStore + 'static,
{
    Ok(Json(dashboard.session(&request)?.listings))
}

async fn session_handler<M, A>(
    State(dashboard): State<Arc<Dashboard<M, A>>>,
    Json(request): Json<DashboardRequest>,
) -> Result<Json<DashboardSession>, AppError>
where
    M: InvestmentModels + 'static,
    A: ArtifactStore + 'static,
{
    Ok(Json(dashboard.session(&request)?))
}

async fn dashboard_predict_handler<M, A>(
    State(dashboard): State<Arc<Dashboard<M, A>>>,
    Json(request): Json<DashboardRequest>,
) -> Result<Json<DashboardPrediction>, AppError>
where
    M: InvestmentModels + 'static,
    A: ArtifactStore + 'static,
{
    Ok(Json(dashboard.predict(&request).await?))
}

async fn analytics_handler<M, A>(
    State(dashboard): State<Arc<Dashboard<M, A>>>,
) -> Result<Json<AnalyticsReport>, AppError>
where
    M: InvestmentModels + 'static,
    A: ArtifactStore + 'static,
{
    Ok(Json(dashboard.analytics()?))
}
