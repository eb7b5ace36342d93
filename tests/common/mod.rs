#![allow(dead_code)]

use isolated_optimize::config::{CpuCores, UserConfig};
use isolated_optimize::routes::{ExtraRouteDescriptor, RouteDescriptor};
use isolated_optimize::types::{CandleSet, CandlesBundle, ExchangeType};
use isolated_optimize::{OptimizeRequest, Optimizer, OptimizerFactory, OptimizerParams};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Factory that remembers every optimizer it built and counts runs
#[derive(Default)]
pub struct RecordingFactory {
    pub built: Mutex<Vec<OptimizerParams>>,
    pub runs: Arc<AtomicUsize>,
    pub fail_build: bool,
    pub fail_run: bool,
}

pub struct RecordingOptimizer {
    runs: Arc<AtomicUsize>,
    fail: bool,
}

impl Optimizer for RecordingOptimizer {
    fn run(&mut self) -> anyhow::Result<()> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("search diverged");
        }
        Ok(())
    }
}

impl OptimizerFactory for RecordingFactory {
    type Optimizer = RecordingOptimizer;

    fn create(&self, params: OptimizerParams) -> anyhow::Result<RecordingOptimizer> {
        if self.fail_build {
            anyhow::bail!("no candles for route");
        }
        self.built.lock().unwrap().push(params);
        Ok(RecordingOptimizer {
            runs: Arc::clone(&self.runs),
            fail: self.fail_run,
        })
    }
}

impl RecordingFactory {
    pub fn built_count(&self) -> usize {
        self.built.lock().unwrap().len()
    }

    pub fn run_count(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    pub fn last_params(&self) -> OptimizerParams {
        self.built.lock().unwrap().last().cloned().expect("no optimizer built")
    }
}

pub fn spot_user_config() -> UserConfig {
    UserConfig {
        starting_balance: 5000.0,
        fee: 0.001,
        exchange_type: ExchangeType::Spot,
        exchange: "Binance".to_string(),
        futures_leverage: None,
        futures_leverage_mode: None,
        warm_up_candles: 100,
        ratio: 0.8,
        cpu_cores: CpuCores::Integer(4),
    }
}

pub fn route(exchange: &str, strategy: &str, symbol: &str, timeframe: &str) -> RouteDescriptor {
    RouteDescriptor {
        exchange: exchange.to_string(),
        strategy: strategy.to_string(),
        symbol: symbol.to_string(),
        timeframe: timeframe.to_string(),
    }
}

pub fn extra_route(exchange: &str, symbol: &str, timeframe: &str) -> ExtraRouteDescriptor {
    ExtraRouteDescriptor {
        exchange: exchange.to_string(),
        symbol: symbol.to_string(),
        timeframe: timeframe.to_string(),
    }
}

pub fn candles(exchange: &str, symbol: &str, start_ts: f64) -> CandlesBundle {
    let rows = (0..5)
        .map(|i| {
            let price = 100.0 + i as f64;
            [start_ts + i as f64 * 60_000.0, price, price + 0.5, price + 1.0, price - 1.0, 10.0]
        })
        .collect();

    let mut bundle = BTreeMap::new();
    bundle.insert(
        format!("{}-{}", exchange, symbol),
        CandleSet {
            exchange: exchange.to_string(),
            symbol: symbol.to_string(),
            candles: rows,
        },
    );
    bundle
}

pub fn spot_request() -> OptimizeRequest {
    OptimizeRequest {
        user_config: spot_user_config(),
        routes: vec![route("Binance", "A1", "BTC-USDT", "1h")],
        extra_routes: vec![extra_route("Binance", "BTC-USDT", "4h")],
        start_date: "2023-01-01".to_string(),
        finish_date: "2023-06-01".to_string(),
        optimal_total: 200,
        training_candles: candles("Binance", "BTC-USDT", 1_672_531_200_000.0),
        testing_candles: candles("Binance", "BTC-USDT", 1_680_307_200_000.0),
        csv: false,
        json_export: false,
        debug_mode: false,
    }
}
