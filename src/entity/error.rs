//! Defines the error types for the entity graph.
use super::kind::EntityKind;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntityError {
    #[error("Unknown {kind} '{id}'")]
    UnknownEntity { kind: EntityKind, id: String },
    #[error("Invalid membership: {0}")]
    InvalidMembership(String),
}
