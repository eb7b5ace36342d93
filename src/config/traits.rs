use crate::error::OptimizeError;

/// Trait for configuration sections
pub trait ConfigSection {
    fn validate(&self) -> Result<(), OptimizeError>;
}
