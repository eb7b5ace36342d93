use super::traits::ConfigSection;
use crate::error::{OptimizeError, Result};
use crate::types::{ExchangeType, LeverageMode};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration in the shape the backtesting framework consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameworkConfig {
    pub exchange: ExchangeConfig,
    pub logging: LoggingConfig,
    pub warm_up_candles: u64,
    /// Same value as `warm_up_candles`; older framework code reads this key.
    pub warmup_candles_num: u64,
    pub ratio: f64,
}

/// Exchange settings. The `type` key selects the variant, so leverage
/// fields exist only on futures exchanges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ExchangeConfig {
    Spot {
        name: String,
        balance: f64,
        fee: f64,
    },
    Futures {
        name: String,
        balance: f64,
        fee: f64,
        futures_leverage: u32,
        futures_leverage_mode: LeverageMode,
    },
}

impl ExchangeConfig {
    pub fn exchange_type(&self) -> ExchangeType {
        match self {
            Self::Spot { .. } => ExchangeType::Spot,
            Self::Futures { .. } => ExchangeType::Futures,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Spot { name, .. } | Self::Futures { name, .. } => name,
        }
    }

    pub fn leverage(&self) -> Option<(u32, LeverageMode)> {
        match self {
            Self::Spot { .. } => None,
            Self::Futures {
                futures_leverage,
                futures_leverage_mode,
                ..
            } => Some((*futures_leverage, *futures_leverage_mode)),
        }
    }
}

/// Event logging switches handed to the framework during optimization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub balance_update: bool,
    pub order_cancellation: bool,
    pub order_execution: bool,
    pub order_submission: bool,
    pub position_closed: bool,
    pub position_increased: bool,
    pub position_opened: bool,
    pub position_reduced: bool,
    pub shorter_period_candles: bool,
    pub trading_candles: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            balance_update: true,
            order_cancellation: true,
            order_execution: true,
            order_submission: true,
            position_closed: true,
            position_increased: true,
            position_opened: true,
            position_reduced: true,
            shorter_period_candles: false,
            trading_candles: true,
        }
    }
}

impl FrameworkConfig {
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }
}

impl ConfigSection for FrameworkConfig {
    fn validate(&self) -> Result<()> {
        if self.warm_up_candles != self.warmup_candles_num {
            return Err(OptimizeError::Configuration(format!(
                "warm_up_candles ({}) and warmup_candles_num ({}) disagree",
                self.warm_up_candles, self.warmup_candles_num
            )));
        }
        if let Some((leverage, _)) = self.exchange.leverage() {
            if leverage == 0 {
                return Err(OptimizeError::Configuration(
                    "Futures leverage must be at least 1".to_string(),
                ));
            }
        }
        Ok(())
    }
}
