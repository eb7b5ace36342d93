use crate::config::FrameworkConfig;
use crate::routes::RouteTable;
use crate::types::{CandlesBundle, TradingMode};

/// Everything an optimizer engine is built from.
#[derive(Debug, Clone)]
pub struct OptimizerParams {
    pub training_candles: CandlesBundle,
    pub testing_candles: CandlesBundle,
    /// Target number of trials / candidate results
    pub optimal_total: u32,
    pub cpu_cores: usize,
    pub csv: bool,
    pub export_json: bool,
    pub start_date: String,
    pub finish_date: String,
    pub user_config: FrameworkConfig,
    /// Validated route table
    pub routes: RouteTable,
    pub trading_mode: TradingMode,
    /// Verbose engine output; never changes the result
    pub debug_mode: bool,
}

/// A hyperparameter search engine. Results are written out by the
/// engine itself; nothing is returned to the caller.
pub trait Optimizer {
    fn run(&mut self) -> anyhow::Result<()>;
}

/// Builds an optimizer for one run.
pub trait OptimizerFactory {
    type Optimizer: Optimizer;

    fn create(&self, params: OptimizerParams) -> anyhow::Result<Self::Optimizer>;
}

impl<F, O> OptimizerFactory for F
where
    F: Fn(OptimizerParams) -> anyhow::Result<O>,
    O: Optimizer,
{
    type Optimizer = O;

    fn create(&self, params: OptimizerParams) -> anyhow::Result<O> {
        self(params)
    }
}
