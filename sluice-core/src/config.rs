//! Runtime configuration for the protocol engine

use serde::{Deserialize, Serialize};

/// Default number of malformed rows tolerated in one invocation before the
/// fault escalates to fatal and the stream closes early.
pub const DEFAULT_ROW_ERROR_TOLERANCE: usize = 5;

/// Knobs of the protocol engine itself. Per-command option handling is the
/// command's own concern and does not pass through here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Mid-stream malformed-row budget. Faulty rows are dropped and reported
    /// at error severity up to this count; one more escalates to fatal.
    pub row_error_tolerance: usize,
}

impl ProtocolConfig {
    pub fn new() -> Self {
        Self {
            row_error_tolerance: DEFAULT_ROW_ERROR_TOLERANCE,
        }
    }

    pub fn with_row_error_tolerance(mut self, tolerance: usize) -> Self {
        self.row_error_tolerance = tolerance;
        self
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tolerance() {
        assert_eq!(
            ProtocolConfig::new().row_error_tolerance,
            DEFAULT_ROW_ERROR_TOLERANCE
        );
    }

    #[test]
    fn test_with_row_error_tolerance() {
        let config = ProtocolConfig::new().with_row_error_tolerance(0);
        assert_eq!(config.row_error_tolerance, 0);
    }
}
