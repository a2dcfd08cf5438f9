//! Adapters for an MLflow tracking server and its model scoring endpoints.
//!
//! Registered models are resolved through their alias once, when
//! [`MlflowModels::load`] runs; every later prediction reuses the resolved
//! versions and the shared HTTP client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::features::FeatureFrame;
use super::prediction::{
    ArtifactRef, ArtifactStore, FeatureImportances, InvestmentLabel, InvestmentModels,
    PredictionError,
};
use crate::config::ModelRegistryConfig;

fn trim_base(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

async fn read_success(
    service: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, PredictionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(err) => format!("<response body unreadable: {err}>"),
    };
    Err(PredictionError::Status {
        service: service.to_string(),
        status: status.as_u16(),
        body,
    })
}

/// A `models:/<name>@<alias>` reference pinned to the version it resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredModel {
    pub name: String,
    pub alias: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    pub endpoint: String,
}

impl RegisteredModel {
    pub fn uri(&self) -> String {
        format!("models:/{}@{}", self.name, self.alias)
    }
}

#[derive(Debug, Deserialize)]
struct AliasResponse {
    model_version: ModelVersion,
}

#[derive(Debug, Deserialize)]
struct ModelVersion {
    version: String,
    #[serde(default)]
    run_id: Option<String>,
}

async fn resolve_alias(
    http: &Client,
    tracking_uri: &str,
    name: &str,
    alias: &str,
    endpoint: &str,
) -> Result<RegisteredModel, PredictionError> {
    let service = format!("model registry ({name}@{alias})");
    let response = http
        .get(format!("{tracking_uri}/api/2.0/mlflow/registered-models/alias"))
        .query(&[("name", name), ("alias", alias)])
        .send()
        .await?;
    let response = read_success(&service, response).await?;
    let payload: AliasResponse = response
        .json()
        .await
        .map_err(|err| PredictionError::Payload {
            service: service.clone(),
            detail: err.to_string(),
        })?;

    Ok(RegisteredModel {
        name: name.to_string(),
        alias: alias.to_string(),
        version: payload.model_version.version,
        run_id: payload.model_version.run_id,
        endpoint: trim_base(endpoint),
    })
}

/// Pull the first prediction out of a scoring response.
///
/// Servers answer either `{"predictions": [..]}` or a bare list.
fn first_prediction(service: &str, payload: &Value) -> Result<f64, PredictionError> {
    let predictions = payload.get("predictions").unwrap_or(payload);
    let first = match predictions {
        Value::Array(values) => values.first(),
        other => Some(other),
    };

    let unexpected = |detail: String| PredictionError::Payload {
        service: service.to_string(),
        detail,
    };

    match first {
        Some(Value::Number(number)) => number
            .as_f64()
            .ok_or_else(|| unexpected(format!("non-finite prediction {number}"))),
        Some(Value::Bool(flag)) => Ok(if *flag { 1.0 } else { 0.0 }),
        Some(other) => Err(unexpected(format!("prediction is not numeric: {other}"))),
        None => Err(unexpected("no predictions returned".to_string())),
    }
}

/// Classifier and regressor served from an MLflow deployment.
#[derive(Debug, Clone)]
pub struct MlflowModels {
    http: Client,
    classifier: RegisteredModel,
    regressor: RegisteredModel,
}

impl MlflowModels {
    /// Resolve both registered aliases. Fails if the registry is unreachable.
    pub async fn load(config: &ModelRegistryConfig) -> Result<Self, PredictionError> {
        let http = Client::new();
        let tracking_uri = trim_base(&config.tracking_uri);

        let classifier = resolve_alias(
            &http,
            &tracking_uri,
            &config.classifier_name,
            &config.alias,
            &config.classifier_endpoint,
        )
        .await?;
        let regressor = resolve_alias(
            &http,
            &tracking_uri,
            &config.regressor_name,
            &config.alias,
            &config.regressor_endpoint,
        )
        .await?;

        info!(
            classifier = %classifier.uri(),
            classifier_version = %classifier.version,
            regressor = %regressor.uri(),
            regressor_version = %regressor.version,
            "registered models resolved"
        );

        Ok(Self {
            http,
            classifier,
            regressor,
        })
    }

    pub fn classifier(&self) -> &RegisteredModel {
        &self.classifier
    }

    pub fn regressor(&self) -> &RegisteredModel {
        &self.regressor
    }

    async fn invoke(
        &self,
        model: &RegisteredModel,
        frame: &FeatureFrame,
    ) -> Result<f64, PredictionError> {
        let service = model.uri();
        debug!(model = %service, version = %model.version, "invoking model");

        let response = self
            .http
            .post(format!("{}/invocations", model.endpoint))
            .json(&json!({ "dataframe_split": frame }))
            .send()
            .await?;
        let response = read_success(&service, response).await?;
        let payload: Value = response
            .json()
            .await
            .map_err(|err| PredictionError::Payload {
                service: service.clone(),
                detail: err.to_string(),
            })?;

        first_prediction(&service, &payload)
    }
}

#[async_trait]
impl InvestmentModels for MlflowModels {
    async fn classify(&self, frame: &FeatureFrame) -> Result<InvestmentLabel, PredictionError> {
        let raw = self.invoke(&self.classifier, frame).await?;
        Ok(InvestmentLabel { raw })
    }

    async fn regress(&self, frame: &FeatureFrame) -> Result<f64, PredictionError> {
        self.invoke(&self.regressor, frame).await
    }
}

/// Artifact downloads from the tracking server.
#[derive(Debug, Clone)]
pub struct MlflowArtifacts {
    http: Client,
    tracking_uri: String,
}

impl MlflowArtifacts {
    pub fn new(tracking_uri: &str) -> Self {
        Self {
            http: Client::new(),
            tracking_uri: trim_base(tracking_uri),
        }
    }
}

#[async_trait]
impl ArtifactStore for MlflowArtifacts {
    async fn feature_importances(
        &self,
        artifact: &ArtifactRef,
    ) -> Result<FeatureImportances, PredictionError> {
        let service = format!("artifact store ({}/{})", artifact.run_id, artifact.path);
        let response = self
            .http
            .get(format!("{}/get-artifact", self.tracking_uri))
            .query(&[
                ("path", artifact.path.as_str()),
                ("run_uuid", artifact.run_id.as_str()),
            ])
            .send()
            .await?;
        let response = read_success(&service, response).await?;

        response
            .json::<FeatureImportances>()
            .await
            .map_err(|err| PredictionError::Payload {
                service,
                detail: err.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use std::collections::HashMap;

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("test server runs");
        });
        format!("http://{addr}")
    }

    async fn alias_handler(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        let version = match params.get("name").map(String::as_str) {
            Some("Random_Forest_Classifier") => "7",
            _ => "4",
        };
        Json(json!({
            "model_version": {
                "name": params.get("name"),
                "version": version,
                "run_id": "run-abc",
                "aliases": [params.get("alias")],
            }
        }))
    }

    async fn classifier_handler(Json(body): Json<Value>) -> Json<Value> {
        let columns = body["dataframe_split"]["columns"]
            .as_array()
            .map(Vec::len)
            .unwrap_or_default();
        let label = if columns == 29 { 1 } else { 0 };
        Json(json!({ "predictions": [label] }))
    }

    async fn regressor_handler() -> Json<Value> {
        Json(json!([812.4]))
    }

    fn config(tracking: &str, serving: &str) -> ModelRegistryConfig {
        ModelRegistryConfig {
            tracking_uri: format!("{tracking}/"),
            alias: "challenger".to_string(),
            classifier_name: "Random_Forest_Classifier".to_string(),
            regressor_name: "Random_Forest_Regressor".to_string(),
            classifier_endpoint: format!("{serving}/classifier"),
            regressor_endpoint: format!("{serving}/regressor"),
            importance_run_id: "run-abc".to_string(),
            importance_artifact: "feature_importances.json".to_string(),
        }
    }

    fn sample_frame() -> FeatureFrame {
        use crate::workflows::valuation::builder::FeatureRecordBuilder;
        use crate::workflows::valuation::domain::PropertyForm;
        use crate::workflows::valuation::normalizer::normalize;

        let record = normalize(FeatureRecordBuilder::new(2025).build(&PropertyForm::default()));
        FeatureFrame::from_record(&record)
    }

    #[tokio::test]
    async fn load_resolves_aliases_and_invokes_models() {
        let tracking = spawn(Router::new().route(
            "/api/2.0/mlflow/registered-models/alias",
            get(alias_handler),
        ))
        .await;
        let serving = spawn(
            Router::new()
                .route("/classifier/invocations", post(classifier_handler))
                .route("/regressor/invocations", post(regressor_handler)),
        )
        .await;

        let models = MlflowModels::load(&config(&tracking, &serving))
            .await
            .expect("aliases resolve");
        assert_eq!(models.classifier().version, "7");
        assert_eq!(models.regressor().version, "4");
        assert_eq!(
            models.classifier().uri(),
            "models:/Random_Forest_Classifier@challenger"
        );

        let frame = sample_frame();
        let label = models.classify(&frame).await.expect("classifier answers");
        assert_eq!(label.label(), "Yes");
        let price = models.regress(&frame).await.expect("regressor answers");
        assert!((price - 812.4).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn unknown_alias_surfaces_registry_error() {
        let tracking = spawn(Router::new().route(
            "/api/2.0/mlflow/registered-models/alias",
            get(|| async {
                (
                    StatusCode::NOT_FOUND,
                    "RESOURCE_DOES_NOT_EXIST: alias challenger not found",
                )
            }),
        ))
        .await;

        match MlflowModels::load(&config(&tracking, &tracking)).await {
            Err(PredictionError::Status { status, body, .. }) => {
                assert_eq!(status, 404);
                assert!(body.contains("RESOURCE_DOES_NOT_EXIST"));
            }
            other => panic!("expected registry status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn truncated_error_body_is_reported() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("client connects");
            let mut request = Vec::new();
            let mut buf = [0_u8; 1024];
            while !request.windows(4).any(|window| window == b"\r\n\r\n") {
                let read = socket.read(&mut buf).await.expect("request readable");
                if read == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..read]);
            }
            socket
                .write_all(
                    b"HTTP/1.1 503 Service Unavailable\r\nContent-Length: 64\r\n\r\nmodel is lo",
                )
                .await
                .expect("response written");
        });

        let tracking = format!("http://{addr}");
        match MlflowModels::load(&config(&tracking, &tracking)).await {
            Err(PredictionError::Status { status, body, .. }) => {
                assert_eq!(status, 503);
                assert!(body.contains("response body unreadable"));
            }
            other => panic!("expected registry status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn artifacts_download_feature_importances() {
        let tracking = spawn(Router::new().route(
            "/get-artifact",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params.get("run_uuid").map(String::as_str), Some("run-abc"));
                Json(json!({ "Price_in_Lakhs": 0.5, "BHK": 0.2 }))
            }),
        ))
        .await;

        let store = MlflowArtifacts::new(&tracking);
        let importances = store
            .feature_importances(&ArtifactRef {
                run_id: "run-abc".to_string(),
                path: "feature_importances.json".to_string(),
            })
            .await
            .expect("artifact downloads");

        assert_eq!(importances.ranked()[0], ("Price_in_Lakhs", 0.5));
    }

    #[test]
    fn first_prediction_rejects_non_numeric_payloads() {
        let payload = json!({ "predictions": ["maybe"] });
        assert!(matches!(
            first_prediction("classifier", &payload),
            Err(PredictionError::Payload { .. })
        ));

        let empty = json!({ "predictions": [] });
        assert!(matches!(
            first_prediction("classifier", &empty),
            Err(PredictionError::Payload { .. })
        ));

        assert_eq!(
            first_prediction("classifier", &json!({ "predictions": [true] })).ok(),
            Some(1.0)
        );
    }
}
