use crate::config::{translate, FrameworkConfig, UserConfig};
use crate::context::ExecutionContext;
use crate::error::{OptimizeError, Result};
use crate::optimizer::{Optimizer, OptimizerFactory, OptimizerParams};
use crate::routes::{ExtraRouteDescriptor, RouteDescriptor, Router};
use crate::types::{CandlesBundle, TradingMode};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// All inputs of one optimization run. Plain data only, so a request can
/// be written to a file or piped into a worker process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizeRequest {
    pub user_config: UserConfig,
    pub routes: Vec<RouteDescriptor>,
    #[serde(default)]
    pub extra_routes: Vec<ExtraRouteDescriptor>,
    pub start_date: String,
    pub finish_date: String,
    pub optimal_total: u32,
    pub training_candles: CandlesBundle,
    pub testing_candles: CandlesBundle,
    #[serde(default)]
    pub csv: bool,
    #[serde(default)]
    pub json_export: bool,
    #[serde(default)]
    pub debug_mode: bool,
}

impl OptimizeRequest {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Outcome of the setup steps of a run.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub cpu_cores: usize,
    pub config: FrameworkConfig,
}

/// Run one optimization against `ctx`.
///
/// Steps run in a fixed order: set trading flags, parse `cpu_cores`,
/// translate and inject the config, initiate routes, validate routes,
/// build the optimizer, run it. The first error is returned as is;
/// whatever was already written to `ctx` stays there.
pub fn run_optimization<F: OptimizerFactory>(
    ctx: &mut ExecutionContext,
    request: OptimizeRequest,
    factory: &F,
) -> Result<()> {
    let Prepared { cpu_cores, config } = prepare(ctx, &request)?;

    let params = OptimizerParams {
        training_candles: request.training_candles,
        testing_candles: request.testing_candles,
        optimal_total: request.optimal_total,
        cpu_cores,
        csv: request.csv,
        export_json: request.json_export,
        start_date: request.start_date,
        finish_date: request.finish_date,
        user_config: config,
        routes: ctx.routes().clone(),
        trading_mode: ctx.trading_mode,
        debug_mode: ctx.debug_mode,
    };

    let mut optimizer = factory
        .create(params)
        .map_err(|e| OptimizeError::OptimizerBuild(e.into()))?;

    log::info!(
        "Starting optimizer: {} trial(s) on {} core(s)",
        request.optimal_total,
        cpu_cores
    );
    optimizer
        .run()
        .map_err(|e| OptimizeError::OptimizerRun(e.into()))?;

    log::info!("Optimizer finished");
    Ok(())
}

/// Run one optimization in a fresh [`ExecutionContext`].
///
/// This is the entry a worker process or pool thread calls: nothing from
/// an earlier run can leak in.
pub fn optimize<F: OptimizerFactory>(request: OptimizeRequest, factory: &F) -> Result<()> {
    let mut ctx = ExecutionContext::new();
    run_optimization(&mut ctx, request, factory)
}

/// Setup steps of a run, up to and including route validation.
/// Also used on its own to vet a request before dispatching it.
pub fn prepare(ctx: &mut ExecutionContext, request: &OptimizeRequest) -> Result<Prepared> {
    ctx.trading_mode = TradingMode::Optimize;
    ctx.debug_mode = request.debug_mode;

    let cpu_cores = request.user_config.cpu_cores.parse()?;

    let config = translate(&request.user_config)?;
    ctx.set_config(config.clone());
    log::debug!(
        "Injected config for {} ({})",
        config.exchange.name(),
        config.exchange.exchange_type()
    );

    ctx.set_routes(Router::initiate(
        request.routes.clone(),
        request.extra_routes.clone(),
    ));
    ctx.validator().validate(ctx.routes())?;
    log::info!(
        "Validated {} route(s) and {} extra route(s)",
        ctx.routes().routes.len(),
        ctx.routes().extra_routes.len()
    );

    Ok(Prepared { cpu_cores, config })
}
