//! Engine error types

use thiserror::Error;

/// Errors raised while building or drawing animation geometry
///
/// None of these are fatal to the compositor: the engine aborts the effect
/// for the affected window (or skips one frame's draw) and logs the cause.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Polygon, clip, grid or particle storage could not be allocated
    #[error("Allocation failed: {0}")]
    Allocation(String),

    /// Option lists disagree or name something that doesn't exist
    #[error("Configuration inconsistency: {0}")]
    Config(String),

    /// Bookkeeping indices no longer address live storage
    #[error("Stale state: {0}")]
    StaleState(String),

    /// Effect name not present in the registry
    #[error("Unknown effect: {0}")]
    UnknownEffect(String),

    /// Degenerate window or clip geometry
    #[error("Invalid geometry: {0}")]
    Geometry(String),
}

impl From<std::collections::TryReserveError> for EngineError {
    fn from(err: std::collections::TryReserveError) -> Self {
        EngineError::Allocation(err.to_string())
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_reserve_maps_to_allocation() {
        let mut v: Vec<u64> = Vec::new();
        let err = v.try_reserve(usize::MAX).unwrap_err();
        let engine_err: EngineError = err.into();
        assert!(matches!(engine_err, EngineError::Allocation(_)));
    }

    #[test]
    fn test_display() {
        let err = EngineError::StaleState("clip 4 of 2".to_string());
        assert_eq!(err.to_string(), "Stale state: clip 4 of 2");
    }
}
