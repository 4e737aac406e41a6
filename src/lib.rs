//! Period-aware, memoized rule evaluation with versioned parameters.
//!
//! A `Simulation` computes named variables for the entities of an
//! `EntityGraph` over calendar `Period`s. Rules read other variables through
//! their `Ctx` and dated parameters through `ParametersAt`; every value is
//! computed at most once per run.

pub mod analysis;
pub mod batch;
pub mod compute;
pub mod config;
pub mod display;
pub mod entity;
pub mod params;
pub mod period;
pub mod rules;
pub mod store;

pub use batch::{run_batch, Input, Query, Scenario, ScenarioOutcome};
pub use compute::{Ctx, EngineError, EvalState, Reducer, Request, Simulation, Value, ValueType};
pub use config::{ConfigError, EngineConfig};
pub use entity::{EntityError, EntityGraph, EntityKind, EntityRef};
pub use params::{Boundary, ParameterError, ParameterTree, ParametersAt, Scale};
pub use period::{Period, PeriodError, PeriodUnit};
pub use store::{VariableDefinition, VariableRegistry};
