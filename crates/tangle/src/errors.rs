//! Tangle errors module

use thiserror::Error;

/// Which argument of a store call carried an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexRole {
    Node,
    LeftParent,
    RightParent,
}

impl std::fmt::Display for IndexRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexRole::Node => write!(f, "Node"),
            IndexRole::LeftParent => write!(f, "Left parent"),
            IndexRole::RightParent => write!(f, "Right parent"),
        }
    }
}

/// Errors raised by the graph store and the statistics engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TangleError {
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("{role} {index} must be between 0 and {}", .capacity - 1)]
    OutOfRange {
        role: IndexRole,
        index: i64,
        capacity: i64,
    },

    #[error("Cannot compute {metric}: {reason}")]
    ArithmeticDegenerate { metric: &'static str, reason: String },
}

impl TangleError {
    pub(crate) fn degenerate(metric: &'static str, reason: impl Into<String>) -> Self {
        TangleError::ArithmeticDegenerate {
            metric,
            reason: reason.into(),
        }
    }
}
