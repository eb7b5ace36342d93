use crate::config::FrameworkConfig;
use crate::routes::{RouteTable, RouteValidator};
use crate::types::TradingMode;

/// State owned by one optimization call.
///
/// Every run writes its trading mode, injected config and route table
/// here instead of into process-wide globals, so independent calls can
/// share a process as long as they use separate contexts.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    pub trading_mode: TradingMode,
    pub debug_mode: bool,
    config: Option<FrameworkConfig>,
    routes: RouteTable,
    validator: RouteValidator,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_validator(validator: RouteValidator) -> Self {
        Self {
            validator,
            ..Self::default()
        }
    }

    /// Replace any previously injected config.
    pub fn set_config(&mut self, config: FrameworkConfig) {
        self.config = Some(config);
    }

    pub fn config(&self) -> Option<&FrameworkConfig> {
        self.config.as_ref()
    }

    /// Replace the route table.
    pub fn set_routes(&mut self, routes: RouteTable) {
        self.routes = routes;
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn validator(&self) -> &RouteValidator {
        &self.validator
    }

    /// Back to a blank state, keeping the validator.
    pub fn reset(&mut self) {
        self.trading_mode = TradingMode::default();
        self.debug_mode = false;
        self.config = None;
        self.routes = RouteTable::default();
    }
}
