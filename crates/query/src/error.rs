//! Error types for the physical planner and histogram builder.

use alloc::string::String;
use core::fmt;

/// Result type alias for planner operations.
pub type Result<T> = core::result::Result<T, PlanError>;

/// Errors surfaced by the planner and the statistics it depends on.
///
/// Two kinds, per the planner's own contract: a statistics failure
/// (histogram lookup or range build) and an internal error (a malformed
/// logical node, or an invariant the planner itself is supposed to
/// uphold). Neither is ever silently swallowed into a fallback plan.
#[derive(Debug)]
pub enum PlanError {
    /// Histogram lookup or range construction failed.
    Statistics { message: String },
    /// A logical node was malformed, or a planner invariant was violated.
    Internal { message: String },
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::Statistics { message } => write!(f, "statistics error: {}", message),
            PlanError::Internal { message } => write!(f, "internal planner error: {}", message),
        }
    }
}

impl PlanError {
    /// Creates a statistics error.
    pub fn statistics(message: impl Into<String>) -> Self {
        PlanError::Statistics {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        PlanError::Internal {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_error_display() {
        let err = PlanError::statistics("missing histogram for column 3");
        assert!(err.to_string().contains("statistics error"));

        let err = PlanError::internal("node has no children");
        assert!(err.to_string().contains("internal planner error"));
    }
}
