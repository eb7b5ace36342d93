use crate::types::Timeframe;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// A trading route: one strategy on one market at one timeframe
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteDescriptor {
    pub exchange: String,
    pub strategy: String,
    pub symbol: String,
    pub timeframe: String,
}

/// A data-only feed without a strategy
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtraRouteDescriptor {
    pub exchange: String,
    pub symbol: String,
    pub timeframe: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("No routes found. At least one trading route is required")]
    NoRoutes,

    #[error("{kind} #{index}: exchange name is empty")]
    EmptyExchange { kind: RouteKind, index: usize },

    #[error("{kind} #{index}: symbol '{symbol}' must look like BASE-QUOTE")]
    InvalidSymbol {
        kind: RouteKind,
        index: usize,
        symbol: String,
    },

    #[error("{kind} #{index}: unsupported timeframe '{timeframe}'")]
    UnknownTimeframe {
        kind: RouteKind,
        index: usize,
        timeframe: String,
    },

    #[error("Route #{index}: strategy name is empty")]
    EmptyStrategy { index: usize },

    #[error("Route #{index}: strategy '{strategy}' is not registered")]
    UnknownStrategy { index: usize, strategy: String },

    #[error("{kind} #{index}: exchange '{exchange}' is not supported")]
    UnknownExchange {
        kind: RouteKind,
        index: usize,
        exchange: String,
    },

    #[error("Each exchange-symbol pair can be traded only once: {exchange} {symbol} appears more than once")]
    DuplicateRoute { exchange: String, symbol: String },

    #[error("Duplicate extra route: {exchange} {symbol} {timeframe}")]
    DuplicateExtraRoute {
        exchange: String,
        symbol: String,
        timeframe: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Route,
    ExtraRoute,
}

impl std::fmt::Display for RouteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Route => f.write_str("Route"),
            Self::ExtraRoute => f.write_str("Extra route"),
        }
    }
}

/// Routes as initiated for one optimization run, in input order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteTable {
    pub routes: Vec<RouteDescriptor>,
    pub extra_routes: Vec<ExtraRouteDescriptor>,
}

impl RouteTable {
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty() && self.extra_routes.is_empty()
    }

    /// Candle keys needed by the table, trading routes first, without repeats
    pub fn candle_keys(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.routes
            .iter()
            .map(|r| crate::types::candle_key(&r.exchange, &r.symbol))
            .chain(
                self.extra_routes
                    .iter()
                    .map(|r| crate::types::candle_key(&r.exchange, &r.symbol)),
            )
            .filter(|key| seen.insert(key.clone()))
            .collect()
    }
}

pub struct Router;

impl Router {
    /// Build a route table from descriptors. Nothing is checked here;
    /// see [`RouteValidator::validate`].
    pub fn initiate(
        routes: Vec<RouteDescriptor>,
        extra_routes: Vec<ExtraRouteDescriptor>,
    ) -> RouteTable {
        RouteTable {
            routes,
            extra_routes,
        }
    }
}

/// Route table checks. Strategy and exchange catalogs are optional;
/// without them any non-empty name is accepted.
#[derive(Debug, Clone, Default)]
pub struct RouteValidator {
    strategies: Option<HashSet<String>>,
    exchanges: Option<HashSet<String>>,
}

impl RouteValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategies<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.strategies = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_exchanges<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exchanges = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn validate(&self, table: &RouteTable) -> Result<(), RouteError> {
        if table.routes.is_empty() {
            return Err(RouteError::NoRoutes);
        }

        for (index, route) in table.routes.iter().enumerate() {
            self.check_market(
                RouteKind::Route,
                index,
                &route.exchange,
                &route.symbol,
                &route.timeframe,
            )?;

            if route.strategy.trim().is_empty() {
                return Err(RouteError::EmptyStrategy { index });
            }
            if let Some(known) = &self.strategies {
                if !known.contains(&route.strategy) {
                    return Err(RouteError::UnknownStrategy {
                        index,
                        strategy: route.strategy.clone(),
                    });
                }
            }
        }

        for (index, extra) in table.extra_routes.iter().enumerate() {
            self.check_market(
                RouteKind::ExtraRoute,
                index,
                &extra.exchange,
                &extra.symbol,
                &extra.timeframe,
            )?;
        }

        let mut pairs = HashSet::new();
        for route in &table.routes {
            if !pairs.insert((route.exchange.as_str(), route.symbol.as_str())) {
                return Err(RouteError::DuplicateRoute {
                    exchange: route.exchange.clone(),
                    symbol: route.symbol.clone(),
                });
            }
        }

        let mut feeds = HashSet::new();
        for extra in &table.extra_routes {
            if !feeds.insert(extra) {
                return Err(RouteError::DuplicateExtraRoute {
                    exchange: extra.exchange.clone(),
                    symbol: extra.symbol.clone(),
                    timeframe: extra.timeframe.clone(),
                });
            }
        }

        Ok(())
    }

    fn check_market(
        &self,
        kind: RouteKind,
        index: usize,
        exchange: &str,
        symbol: &str,
        timeframe: &str,
    ) -> Result<(), RouteError> {
        if exchange.trim().is_empty() {
            return Err(RouteError::EmptyExchange { kind, index });
        }
        if let Some(known) = &self.exchanges {
            if !known.contains(exchange) {
                return Err(RouteError::UnknownExchange {
                    kind,
                    index,
                    exchange: exchange.to_string(),
                });
            }
        }

        let well_formed = symbol
            .split_once('-')
            .map(|(base, quote)| !base.is_empty() && !quote.is_empty() && !quote.contains('-'))
            .unwrap_or(false);
        if !well_formed {
            return Err(RouteError::InvalidSymbol {
                kind,
                index,
                symbol: symbol.to_string(),
            });
        }

        if timeframe.parse::<Timeframe>().is_err() {
            return Err(RouteError::UnknownTimeframe {
                kind,
                index,
                timeframe: timeframe.to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(exchange: &str, strategy: &str, symbol: &str, timeframe: &str) -> RouteDescriptor {
        RouteDescriptor {
            exchange: exchange.to_string(),
            strategy: strategy.to_string(),
            symbol: symbol.to_string(),
            timeframe: timeframe.to_string(),
        }
    }

    fn extra(exchange: &str, symbol: &str, timeframe: &str) -> ExtraRouteDescriptor {
        ExtraRouteDescriptor {
            exchange: exchange.to_string(),
            symbol: symbol.to_string(),
            timeframe: timeframe.to_string(),
        }
    }

    #[test]
    fn test_initiate_keeps_order() {
        let table = Router::initiate(
            vec![
                route("Binance", "A1", "BTC-USDT", "1h"),
                route("Binance", "A2", "ETH-USDT", "4h"),
            ],
            vec![extra("Binance", "BTC-USDT", "1D")],
        );
        assert_eq!(table.routes[0].strategy, "A1");
        assert_eq!(table.routes[1].strategy, "A2");
        assert_eq!(table.extra_routes.len(), 1);
    }

    #[test]
    fn test_empty_routes_rejected() {
        let table = Router::initiate(vec![], vec![extra("Binance", "BTC-USDT", "1h")]);
        assert_eq!(RouteValidator::new().validate(&table), Err(RouteError::NoRoutes));
    }

    #[test]
    fn test_valid_table_passes() {
        let table = Router::initiate(
            vec![route("Bybit USDT Perpetual", "A1", "BTC-USDT", "1m")],
            vec![extra("Bybit USDT Perpetual", "BTC-USDT", "3m")],
        );
        assert!(RouteValidator::new().validate(&table).is_ok());
    }

    #[test]
    fn test_timeframe_is_case_sensitive() {
        let table = Router::initiate(vec![route("Binance", "A1", "BTC-USDT", "1d")], vec![]);
        assert!(matches!(
            RouteValidator::new().validate(&table),
            Err(RouteError::UnknownTimeframe { .. })
        ));
    }

    #[test]
    fn test_bad_symbol_rejected() {
        let table = Router::initiate(vec![route("Binance", "A1", "BTCUSDT", "1h")], vec![]);
        assert!(matches!(
            RouteValidator::new().validate(&table),
            Err(RouteError::InvalidSymbol { .. })
        ));
    }

    #[test]
    fn test_unknown_strategy_with_catalog() {
        let table = Router::initiate(vec![route("Binance", "Missing", "BTC-USDT", "1h")], vec![]);
        let validator = RouteValidator::new().with_strategies(["A1", "A2"]);
        assert_eq!(
            validator.validate(&table),
            Err(RouteError::UnknownStrategy {
                index: 0,
                strategy: "Missing".to_string()
            })
        );
    }

    #[test]
    fn test_unknown_exchange_with_catalog() {
        let table = Router::initiate(
            vec![route("Binance", "A1", "BTC-USDT", "1h")],
            vec![extra("Kraken", "BTC-USDT", "1h")],
        );
        let validator = RouteValidator::new().with_exchanges(["Binance"]);
        assert!(matches!(
            validator.validate(&table),
            Err(RouteError::UnknownExchange { kind: RouteKind::ExtraRoute, .. })
        ));
    }

    #[test]
    fn test_duplicate_pair_rejected() {
        let table = Router::initiate(
            vec![
                route("Binance", "A1", "BTC-USDT", "1h"),
                route("Binance", "A2", "BTC-USDT", "4h"),
            ],
            vec![],
        );
        assert!(matches!(
            RouteValidator::new().validate(&table),
            Err(RouteError::DuplicateRoute { .. })
        ));
    }

    #[test]
    fn test_duplicate_extra_route_rejected() {
        let table = Router::initiate(
            vec![route("Binance", "A1", "BTC-USDT", "1h")],
            vec![
                extra("Binance", "ETH-USDT", "1h"),
                extra("Binance", "ETH-USDT", "1h"),
            ],
        );
        assert!(matches!(
            RouteValidator::new().validate(&table),
            Err(RouteError::DuplicateExtraRoute { .. })
        ));
    }

    #[test]
    fn test_candle_keys_deduplicated() {
        let table = Router::initiate(
            vec![route("Binance", "A1", "BTC-USDT", "1h")],
            vec![
                extra("Binance", "BTC-USDT", "4h"),
                extra("Binance", "ETH-USDT", "4h"),
            ],
        );
        assert_eq!(
            table.candle_keys(),
            vec!["Binance-BTC-USDT".to_string(), "Binance-ETH-USDT".to_string()]
        );
    }
}
