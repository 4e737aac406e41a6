use crate::entity::{EntityError, EntityKind};
use crate::params::ParameterError;
use crate::period::{PeriodError, PeriodUnit};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Unknown variable '{name}'")]
    UnknownVariable { name: String },
    #[error("Variable '{name}' is already registered")]
    DuplicateVariableName { name: String },
    #[error("Invalid definition for '{name}': {reason}")]
    InvalidDefinition { name: String, reason: String },
    #[error("No rule of '{variable}' applies to {period}")]
    NoApplicableRule { variable: String, period: String },
    #[error("Circular dependency while computing '{variable}' for {period}: {}", chain.join(" -> "))]
    CircularDependency { variable: String, period: String, chain: Vec<String> },
    #[error("Rule of '{variable}' returned {actual}, expected {expected}")]
    TypeMismatch { variable: String, expected: String, actual: String },
    #[error("'{variable}' belongs to the {expected} entity, cannot be read from {actual}")]
    EntityMismatch { variable: String, expected: EntityKind, actual: EntityKind },
    #[error("'{variable}' is defined by {expected}, requested for {period}")]
    DefinitionPeriodMismatch { variable: String, expected: PeriodUnit, period: String },
    #[error("Division by zero in '{variable}'")]
    DivisionByZero { variable: String },
    #[error("Evaluation of '{variable}' for {period} exceeded depth {limit}")]
    RecursionLimit { variable: String, period: String, limit: usize },
    #[error(transparent)]
    Parameter(#[from] ParameterError),
    #[error(transparent)]
    Entity(#[from] EntityError),
    #[error(transparent)]
    Period(#[from] PeriodError),
}
