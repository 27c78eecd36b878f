//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::catalog::NodeId;

/// Domain errors represent business logic violations.
/// These are independent of file loading and CLI concerns.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("invalid {field}: {value} (must be finite and non-negative)")]
    InvalidArgument { field: &'static str, value: f64 },

    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("{child} is not a child of {parent}")]
    NotFound { parent: NodeId, child: NodeId },

    #[error("cannot add children to item {0}")]
    NotAContainer(NodeId),

    #[error("node {child} already belongs to {parent}, remove it first")]
    AlreadyAttached { child: NodeId, parent: NodeId },

    #[error("adding {child} under {parent} would create a cycle")]
    CycleDetected { parent: NodeId, child: NodeId },
}

impl DomainError {
    /// Violations of the tree shape (as opposed to bad values or missing nodes).
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            DomainError::NotAContainer(_)
                | DomainError::AlreadyAttached { .. }
                | DomainError::CycleDetected { .. }
        )
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// Reject negative, NaN and infinite amounts.
pub(crate) fn ensure_amount(field: &'static str, value: f64) -> DomainResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(DomainError::InvalidArgument { field, value })
    }
}
