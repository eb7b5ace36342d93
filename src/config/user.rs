use super::traits::ConfigSection;
use crate::error::{OptimizeError, Result};
use crate::types::{ExchangeType, LeverageMode};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variables with this prefix override file values
/// (`OPTIMIZE_CPU_CORES=8` overrides `cpu_cores`).
pub const ENV_PREFIX: &str = "OPTIMIZE";

/// Flat, user-facing configuration accepted by the optimize entry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    pub starting_balance: f64,
    pub fee: f64,
    #[serde(rename = "type")]
    pub exchange_type: ExchangeType,
    pub exchange: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub futures_leverage: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub futures_leverage_mode: Option<LeverageMode>,
    pub warm_up_candles: u64,
    pub ratio: f64,
    pub cpu_cores: CpuCores,
}

/// `cpu_cores` as supplied: a number or a numeric string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CpuCores {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl CpuCores {
    pub fn parse(&self) -> Result<usize> {
        match self {
            Self::Integer(n) => usize::try_from(*n)
                .map_err(|_| OptimizeError::InvalidCpuCores(n.to_string())),
            Self::Float(f) => {
                if f.is_finite() && f.fract() == 0.0 && *f >= 0.0 && *f < usize::MAX as f64 {
                    Ok(*f as usize)
                } else {
                    Err(OptimizeError::InvalidCpuCores(f.to_string()))
                }
            }
            Self::Text(s) => s
                .trim()
                .parse::<usize>()
                .map_err(|_| OptimizeError::InvalidCpuCores(format!("'{}'", s))),
        }
    }
}

impl UserConfig {
    /// Load from a TOML or JSON file, with `OPTIMIZE_*` environment overrides on top.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(OptimizeError::Configuration(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

impl ConfigSection for UserConfig {
    fn validate(&self) -> Result<()> {
        if self.starting_balance <= 0.0 {
            return Err(OptimizeError::Configuration(
                "Starting balance must be positive".to_string(),
            ));
        }
        if self.fee < 0.0 {
            return Err(OptimizeError::Configuration(
                "Fee cannot be negative".to_string(),
            ));
        }
        if self.ratio <= 0.0 || self.ratio >= 1.0 {
            return Err(OptimizeError::Configuration(
                "Ratio must be between 0 and 1".to_string(),
            ));
        }
        if self.exchange.trim().is_empty() {
            return Err(OptimizeError::Configuration(
                "Exchange name cannot be empty".to_string(),
            ));
        }
        self.cpu_cores.parse()?;
        Ok(())
    }
}
