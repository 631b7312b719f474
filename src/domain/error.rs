//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::NodeId;

/// Domain errors represent tree-editing rule violations.
/// These are independent of persistence and I/O concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("root cannot be deleted: {0}")]
    RootNotDeletable(NodeId),

    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("duplicate node id in tree: {0}")]
    DuplicateNodeId(NodeId),

    #[error("group not found: {0}")]
    GroupNotFound(String),
}
