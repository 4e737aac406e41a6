//! Versioned parameter resolution.
//!
//! Parameters live in a dated tree addressed by dotted paths. A lookup picks
//! the value in force at the start of the requested period; scales turn an
//! input (income, quotient familial, ...) into a tier amount or a marginal
//! tax.
pub mod error;
pub mod node;
pub mod path;
pub mod scale;
pub mod tree;

pub use error::ParameterError;
pub use node::{Dated, History, ParameterNode};
pub use path::ParameterPath;
pub use scale::{Boundary, Bracket, Scale};
pub use tree::{ParameterTree, ParameterValue, ParametersAt};
