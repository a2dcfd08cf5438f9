use chrono::Datelike;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Year used for `Age_of_Property` when nothing is configured.
pub const DEFAULT_REFERENCE_YEAR: i32 = 2025;

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub datasets: DatasetConfig,
    pub models: ModelRegistryConfig,
    pub reference_year: i32,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let reference_year = parse_reference_year(env::var("APP_REFERENCE_YEAR").ok())?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            datasets: DatasetConfig::from_env(),
            models: ModelRegistryConfig::from_env(),
            reference_year,
        })
    }
}

fn parse_reference_year(raw: Option<String>) -> Result<i32, ConfigError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_REFERENCE_YEAR);
    };

    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("current") {
        return Ok(chrono::Local::now().year());
    }

    trimmed
        .parse::<i32>()
        .map_err(|_| ConfigError::InvalidReferenceYear { value: raw.clone() })
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Locations of the static CSV datasets backing the dashboard.
#[derive(Debug, Clone)]
pub struct DatasetConfig {
    /// Reference dataset the form vocabulary is derived from.
    pub classification: PathBuf,
    /// Property listings offered for filtering.
    pub regression: PathBuf,
    /// Cleaned dataset behind the analytics charts.
    pub analytics: PathBuf,
}

impl DatasetConfig {
    fn from_env() -> Self {
        Self {
            classification: env_or("APP_CLASSIFICATION_DATA", "classification_data.csv").into(),
            regression: env_or("APP_REGRESSION_DATA", "regression_data.csv").into(),
            analytics: env_or("APP_ANALYTICS_DATA", "cleaned_data.csv").into(),
        }
    }
}

/// Where the registered models and their training artifacts live.
#[derive(Debug, Clone)]
pub struct ModelRegistryConfig {
    pub tracking_uri: String,
    pub alias: String,
    pub classifier_name: String,
    pub regressor_name: String,
    pub classifier_endpoint: String,
    pub regressor_endpoint: String,
    pub importance_run_id: String,
    pub importance_artifact: String,
}

impl ModelRegistryConfig {
    fn from_env() -> Self {
        Self {
            tracking_uri: env_or("APP_MLFLOW_TRACKING_URI", "http://127.0.0.1:5000"),
            alias: env_or("APP_MODEL_ALIAS", "challenger"),
            classifier_name: env_or("APP_CLASSIFIER_MODEL", "Random_Forest_Classifier"),
            regressor_name: env_or("APP_REGRESSOR_MODEL", "Random_Forest_Regressor"),
            classifier_endpoint: env_or("APP_CLASSIFIER_ENDPOINT", "http://127.0.0.1:5001"),
            regressor_endpoint: env_or("APP_REGRESSOR_ENDPOINT", "http://127.0.0.1:5002"),
            importance_run_id: env_or(
                "APP_IMPORTANCE_RUN_ID",
                "92a47046fd3f428db542560d0cd2c2c0",
            ),
            importance_artifact: env_or("APP_IMPORTANCE_ARTIFACT", "feature_importances.json"),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidReferenceYear { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidReferenceYear { value } => write!(
                f,
                "APP_REFERENCE_YEAR must be a year or 'current', got '{}'",
                value
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidReferenceYear { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_REFERENCE_YEAR",
            "APP_MODEL_ALIAS",
            "APP_IMPORTANCE_RUN_ID",
            "APP_REGRESSION_DATA",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.reference_year, DEFAULT_REFERENCE_YEAR);
        assert_eq!(config.models.alias, "challenger");
        assert_eq!(
            config.models.importance_run_id,
            "92a47046fd3f428db542560d0cd2c2c0"
        );
        assert_eq!(
            config.datasets.regression,
            PathBuf::from("regression_data.csv")
        );
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn reference_year_accepts_current_and_rejects_garbage() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();

        env::set_var("APP_REFERENCE_YEAR", "current");
        let config = AppConfig::load().expect("current year accepted");
        assert_eq!(config.reference_year, chrono::Local::now().year());

        env::set_var("APP_REFERENCE_YEAR", "2030");
        let config = AppConfig::load().expect("explicit year accepted");
        assert_eq!(config.reference_year, 2030);

        env::set_var("APP_REFERENCE_YEAR", "next year");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidReferenceYear { .. })
        ));
        reset_env();
    }
}
