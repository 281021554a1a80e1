use std::env;
use std::fmt;

/// Intake hook receiving every submission unless overridden.
pub const DEFAULT_INTAKE_ENDPOINT: &str =
    "https://hook.eu2.make.com/pe4x8bw7zt813js84ln78r4lwfh2gb99";

/// Distinguishes runtime behavior for different stages of the tool.
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

/// Top-level configuration for the intake client.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub intake: IntakeConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("INTAKE_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let endpoint =
            env::var("INTAKE_ENDPOINT").unwrap_or_else(|_| DEFAULT_INTAKE_ENDPOINT.to_string());
        let intake = IntakeConfig::new(endpoint)?;

        let log_level = env::var("INTAKE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            intake,
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Where submissions are delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeConfig {
    endpoint: String,
}

impl IntakeConfig {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ConfigError> {
        let endpoint = endpoint.into();
        let trimmed = endpoint.trim();
        let has_scheme = trimmed.starts_with("https://") || trimmed.starts_with("http://");
        let has_host = trimmed
            .split_once("://")
            .map(|(_, rest)| !rest.is_empty())
            .unwrap_or(false);

        if !has_scheme || !has_host {
            return Err(ConfigError::InvalidEndpoint { value: endpoint });
        }

        Ok(Self {
            endpoint: trimmed.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidEndpoint { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidEndpoint { value } => write!(
                f,
                "INTAKE_ENDPOINT must be an http(s) URL, got '{}'",
                value
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

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
        env::remove_var("INTAKE_ENV");
        env::remove_var("INTAKE_ENDPOINT");
        env::remove_var("INTAKE_LOG_LEVEL");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.intake.endpoint(), DEFAULT_INTAKE_ENDPOINT);
        assert_eq!(config.telemetry.log_level, "info");
    }

    #[test]
    fn load_reads_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("INTAKE_ENV", "CI");
        env::set_var("INTAKE_ENDPOINT", " http://127.0.0.1:8080/hook ");
        env::set_var("INTAKE_LOG_LEVEL", "debug");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.environment, AppEnvironment::Test);
        assert_eq!(config.intake.endpoint(), "http://127.0.0.1:8080/hook");
        assert_eq!(config.telemetry.log_level, "debug");
        reset_env();
    }

    #[test]
    fn rejects_endpoint_without_scheme() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("INTAKE_ENDPOINT", "hook.example.com/intake");
        match AppConfig::load() {
            Err(ConfigError::InvalidEndpoint { value }) => {
                assert_eq!(value, "hook.example.com/intake")
            }
            other => panic!("expected invalid endpoint, got {other:?}"),
        }
        reset_env();
    }

    #[test]
    fn rejects_endpoint_without_host() {
        assert!(IntakeConfig::new("https://").is_err());
        assert!(IntakeConfig::new("https://hook.example.com").is_ok());
    }
}
