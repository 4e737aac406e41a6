//! Variable definitions and the registry holding them.
pub mod registry;
pub mod types;

pub use registry::VariableRegistry;
pub use types::{Formula, FormulaVersion, VariableDefinition, VariableId};
