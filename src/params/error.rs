//! Defines the error types for parameter resolution.
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("Unknown parameter path '{path}'")]
    UnknownParameterPath { path: String },
    #[error("Parameter '{path}' has no value effective at {date}")]
    NoEffectiveValueAtDate { path: String, date: NaiveDate },
    #[error("Parameter '{path}' is not a scalar value")]
    NotAScalar { path: String },
    #[error("Parameter '{path}' is not a scale")]
    NotAScale { path: String },
    #[error("Parameter '{path}' is a branch, not a value")]
    NotALeaf { path: String },
    #[error("Invalid scale: {0}")]
    InvalidScale(String),
    #[error("Invalid parameter path '{0}'")]
    InvalidPath(String),
}
