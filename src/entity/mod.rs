//! The entity graph: individuals and their household, family and tax
//! household memberships.
pub mod error;
pub mod graph;
pub mod kind;

pub use error::EntityError;
pub use graph::{EntityGraph, EntityGraphBuilder, Group};
pub use kind::{EntityKind, EntityRef};
