pub mod error;
pub mod types;
pub mod config;
pub mod routes;
pub mod context;
pub mod optimizer;
pub mod optimize;
pub mod preflight;
pub mod worker;

pub use context::ExecutionContext;
pub use error::{OptimizeError, Result};
pub use optimize::{optimize, prepare, run_optimization, OptimizeRequest, Prepared};
pub use optimizer::{Optimizer, OptimizerFactory, OptimizerParams};
