use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Exchange flavour; futures exchanges carry leverage settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeType {
    Spot,
    Futures,
}

impl ExchangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spot => "spot",
            Self::Futures => "futures",
        }
    }
}

impl fmt::Display for ExchangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeverageMode {
    Cross,
    Isolated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradingMode {
    #[default]
    Backtest,
    Optimize,
}

/// Candle intervals accepted in routes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Timeframe {
    Minute1,
    Minute3,
    Minute5,
    Minute15,
    Minute30,
    Minute45,
    Hour1,
    Hour2,
    Hour3,
    Hour4,
    Hour6,
    Hour8,
    Hour12,
    Day1,
    Day3,
    Week1,
    Month1,
}

impl Timeframe {
    pub fn all() -> Vec<Self> {
        vec![
            Self::Minute1,
            Self::Minute3,
            Self::Minute5,
            Self::Minute15,
            Self::Minute30,
            Self::Minute45,
            Self::Hour1,
            Self::Hour2,
            Self::Hour3,
            Self::Hour4,
            Self::Hour6,
            Self::Hour8,
            Self::Hour12,
            Self::Day1,
            Self::Day3,
            Self::Week1,
            Self::Month1,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minute1 => "1m",
            Self::Minute3 => "3m",
            Self::Minute5 => "5m",
            Self::Minute15 => "15m",
            Self::Minute30 => "30m",
            Self::Minute45 => "45m",
            Self::Hour1 => "1h",
            Self::Hour2 => "2h",
            Self::Hour3 => "3h",
            Self::Hour4 => "4h",
            Self::Hour6 => "6h",
            Self::Hour8 => "8h",
            Self::Hour12 => "12h",
            Self::Day1 => "1D",
            Self::Day3 => "3D",
            Self::Week1 => "1W",
            Self::Month1 => "1M",
        }
    }
}

impl FromStr for Timeframe {
    type Err = String;

    // Case matters: "1m" is a minute, "1M" is a month.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|tf| tf.as_str() == s)
            .ok_or_else(|| format!("unsupported timeframe '{}'", s))
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One OHLCV row: `[timestamp, open, close, high, low, volume]`
pub type Candle = [f64; 6];

pub const TIMESTAMP: usize = 0;
pub const OPEN: usize = 1;
pub const CLOSE: usize = 2;
pub const HIGH: usize = 3;
pub const LOW: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandleSet {
    pub exchange: String,
    pub symbol: String,
    pub candles: Vec<Candle>,
}

/// Candle sets keyed by [`candle_key`]
pub type CandlesBundle = BTreeMap<String, CandleSet>;

pub fn candle_key(exchange: &str, symbol: &str) -> String {
    format!("{}-{}", exchange, symbol)
}
