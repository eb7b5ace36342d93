use crate::optimize::OptimizeRequest;
use crate::routes::Router;
use crate::types::{CandlesBundle, CLOSE, HIGH, LOW, OPEN, TIMESTAMP};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Something that would likely make an optimization run useless or fail
/// inside the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PreflightIssue {
    InvalidDate { field: &'static str, value: String },
    EmptyDateRange { start: String, finish: String },
    MissingCandles { bundle: &'static str, key: String },
    EmptyCandles { bundle: &'static str, key: String },
    BrokenCandle { bundle: &'static str, key: String, row: usize, reason: String },
}

impl fmt::Display for PreflightIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDate { field, value } => {
                write!(f, "{} '{}' is not a YYYY-MM-DD date", field, value)
            }
            Self::EmptyDateRange { start, finish } => {
                write!(f, "start date {} is not before finish date {}", start, finish)
            }
            Self::MissingCandles { bundle, key } => {
                write!(f, "{} candles have no entry for {}", bundle, key)
            }
            Self::EmptyCandles { bundle, key } => {
                write!(f, "{} candles for {} are empty", bundle, key)
            }
            Self::BrokenCandle { bundle, key, row, reason } => {
                write!(f, "{} candles for {}, row {}: {}", bundle, key, row, reason)
            }
        }
    }
}

/// Inspect a request without running it. Never fails; returns every
/// issue found.
pub fn check(request: &OptimizeRequest) -> Vec<PreflightIssue> {
    let mut issues = Vec::new();

    let start = parse_date("start_date", &request.start_date, &mut issues);
    let finish = parse_date("finish_date", &request.finish_date, &mut issues);
    if let (Some(start), Some(finish)) = (start, finish) {
        if start >= finish {
            issues.push(PreflightIssue::EmptyDateRange {
                start: request.start_date.clone(),
                finish: request.finish_date.clone(),
            });
        }
    }

    let table = Router::initiate(request.routes.clone(), request.extra_routes.clone());
    let keys = table.candle_keys();
    check_bundle("training", &request.training_candles, &keys, &mut issues);
    check_bundle("testing", &request.testing_candles, &keys, &mut issues);

    for issue in &issues {
        log::warn!("Preflight: {}", issue);
    }
    issues
}

fn parse_date(
    field: &'static str,
    value: &str,
    issues: &mut Vec<PreflightIssue>,
) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(value, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            issues.push(PreflightIssue::InvalidDate {
                field,
                value: value.to_string(),
            });
            None
        }
    }
}

fn check_bundle(
    bundle: &'static str,
    candles: &CandlesBundle,
    keys: &[String],
    issues: &mut Vec<PreflightIssue>,
) {
    for key in keys {
        let Some(set) = candles.get(key) else {
            issues.push(PreflightIssue::MissingCandles {
                bundle,
                key: key.clone(),
            });
            continue;
        };

        if set.candles.is_empty() {
            issues.push(PreflightIssue::EmptyCandles {
                bundle,
                key: key.clone(),
            });
            continue;
        }

        // Report only the first broken row per set
        let mut previous_ts = f64::NEG_INFINITY;
        for (row, candle) in set.candles.iter().enumerate() {
            let (open, close, high, low) = (candle[OPEN], candle[CLOSE], candle[HIGH], candle[LOW]);

            let reason = if candle[TIMESTAMP] <= previous_ts {
                Some("timestamps are not strictly increasing".to_string())
            } else if high < low {
                Some(format!("high ({}) < low ({})", high, low))
            } else if high < open.max(close) {
                Some(format!("high ({}) below open/close", high))
            } else if low > open.min(close) {
                Some(format!("low ({}) above open/close", low))
            } else {
                None
            };

            if let Some(reason) = reason {
                issues.push(PreflightIssue::BrokenCandle {
                    bundle,
                    key: key.clone(),
                    row,
                    reason,
                });
                break;
            }
            previous_ts = candle[TIMESTAMP];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CpuCores, UserConfig};
    use crate::routes::RouteDescriptor;
    use crate::types::{CandleSet, ExchangeType};
    use std::collections::BTreeMap;

    fn bundle(candles: Vec<[f64; 6]>) -> CandlesBundle {
        let mut bundle = BTreeMap::new();
        bundle.insert(
            "Binance-BTC-USDT".to_string(),
            CandleSet {
                exchange: "Binance".to_string(),
                symbol: "BTC-USDT".to_string(),
                candles,
            },
        );
        bundle
    }

    fn request(candles: Vec<[f64; 6]>) -> OptimizeRequest {
        OptimizeRequest {
            user_config: UserConfig {
                starting_balance: 5000.0,
                fee: 0.001,
                exchange_type: ExchangeType::Spot,
                exchange: "Binance".to_string(),
                futures_leverage: None,
                futures_leverage_mode: None,
                warm_up_candles: 100,
                ratio: 0.8,
                cpu_cores: CpuCores::Integer(2),
            },
            routes: vec![RouteDescriptor {
                exchange: "Binance".to_string(),
                strategy: "A1".to_string(),
                symbol: "BTC-USDT".to_string(),
                timeframe: "1h".to_string(),
            }],
            extra_routes: vec![],
            start_date: "2023-01-01".to_string(),
            finish_date: "2023-06-01".to_string(),
            optimal_total: 50,
            training_candles: bundle(candles.clone()),
            testing_candles: bundle(candles),
            csv: false,
            json_export: false,
            debug_mode: false,
        }
    }

    fn good_candles() -> Vec<[f64; 6]> {
        vec![
            [1_672_531_200_000.0, 100.0, 101.0, 102.0, 99.0, 10.0],
            [1_672_531_260_000.0, 101.0, 100.5, 101.5, 100.0, 12.0],
        ]
    }

    #[test]
    fn test_clean_request_has_no_issues() {
        assert!(check(&request(good_candles())).is_empty());
    }

    #[test]
    fn test_bad_dates_reported() {
        let mut req = request(good_candles());
        req.start_date = "2023-13-01".to_string();
        let issues = check(&req);
        assert!(matches!(issues[0], PreflightIssue::InvalidDate { field: "start_date", .. }));

        let mut req = request(good_candles());
        req.finish_date = req.start_date.clone();
        assert!(matches!(check(&req)[0], PreflightIssue::EmptyDateRange { .. }));
    }

    #[test]
    fn test_missing_candles_reported_per_bundle() {
        let mut req = request(good_candles());
        req.testing_candles.clear();
        let issues = check(&req);
        assert_eq!(
            issues,
            vec![PreflightIssue::MissingCandles {
                bundle: "testing",
                key: "Binance-BTC-USDT".to_string()
            }]
        );
    }

    #[test]
    fn test_broken_candle_reported() {
        let mut candles = good_candles();
        candles[1][HIGH] = 90.0;
        let issues = check(&request(candles));
        assert_eq!(issues.len(), 2);
        assert!(matches!(issues[0], PreflightIssue::BrokenCandle { row: 1, .. }));
    }

    #[test]
    fn test_unordered_timestamps_reported() {
        let mut candles = good_candles();
        candles.swap(0, 1);
        let issues = check(&request(candles));
        assert!(matches!(issues[0], PreflightIssue::BrokenCandle { row: 1, .. }));
    }
}
