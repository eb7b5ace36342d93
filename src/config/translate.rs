use super::framework::{ExchangeConfig, FrameworkConfig, LoggingConfig};
use super::user::UserConfig;
use crate::error::{OptimizeError, Result};
use crate::types::ExchangeType;

/// Map the flat user config onto the framework's nested schema.
///
/// Pure: the input is only borrowed and a fresh structure is returned.
/// A futures config without both leverage fields is rejected with
/// [`OptimizeError::MissingField`].
pub fn translate(config: &UserConfig) -> Result<FrameworkConfig> {
    let name = config.exchange.clone();
    let balance = config.starting_balance;
    let fee = config.fee;

    let exchange = match config.exchange_type {
        ExchangeType::Spot => ExchangeConfig::Spot { name, balance, fee },
        ExchangeType::Futures => ExchangeConfig::Futures {
            name,
            balance,
            fee,
            futures_leverage: config.futures_leverage.ok_or(OptimizeError::MissingField {
                field: "futures_leverage",
                exchange_type: ExchangeType::Futures,
            })?,
            futures_leverage_mode: config.futures_leverage_mode.ok_or(
                OptimizeError::MissingField {
                    field: "futures_leverage_mode",
                    exchange_type: ExchangeType::Futures,
                },
            )?,
        },
    };

    Ok(FrameworkConfig {
        exchange,
        logging: LoggingConfig::default(),
        warm_up_candles: config.warm_up_candles,
        warmup_candles_num: config.warm_up_candles,
        ratio: config.ratio,
    })
}
