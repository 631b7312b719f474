//! Domain layer: entities and tree-editing logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod editor;
pub mod entities;
pub mod error;
pub mod group;

pub use arena::{IndexedNode, NodeIndex};
pub use editor::{add_child, delete_node, find_node, update_node, NodeUpdate};
pub use entities::*;
pub use error::DomainError;
pub use group::{flatten, resolve_group_members, ResolvedGroup};
