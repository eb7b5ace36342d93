pub mod traits;
pub mod user;
pub mod framework;
pub mod translate;

pub use traits::ConfigSection;
pub use user::{CpuCores, UserConfig};
pub use framework::{ExchangeConfig, FrameworkConfig, LoggingConfig};
pub use translate::translate;
