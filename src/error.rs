use crate::routes::RouteError;
use crate::types::ExchangeType;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum OptimizeError {
    #[error("Missing config field '{field}' (required for {exchange_type} exchanges)")]
    MissingField {
        field: &'static str,
        exchange_type: ExchangeType,
    },

    #[error("Invalid cpu_cores value: {0}")]
    InvalidCpuCores(String),

    #[error("Route error: {0}")]
    Route(#[from] RouteError),

    #[error("Failed to construct optimizer")]
    OptimizerBuild(#[source] BoxError),

    #[error("Optimizer run failed")]
    OptimizerRun(#[source] BoxError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Worker '{program}' exited with {status}: {stderr}")]
    WorkerFailed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Config source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, OptimizeError>;
