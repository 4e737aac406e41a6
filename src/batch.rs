//! Independent scenarios evaluated side by side.
//!
//! Each scenario gets its own `Simulation`, hence its own cache and entity
//! graph; only the registry and the parameter tree are shared.

use crate::compute::{EngineError, Simulation, Value};
use crate::config::EngineConfig;
use crate::entity::{EntityGraph, EntityKind, EntityRef};
use crate::params::ParameterTree;
use crate::period::Period;
use crate::store::VariableRegistry;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, warn};

/// A value to set before any query runs.
#[derive(Debug, Clone, PartialEq)]
pub struct Input {
    pub variable: String,
    pub kind: EntityKind,
    pub id: String,
    pub period: Period,
    pub value: Value,
}

impl Input {
    pub fn new(variable: &str, kind: EntityKind, id: &str, period: Period, value: impl Into<Value>) -> Self {
        Self { variable: variable.to_string(), kind, id: id.to_string(), period, value: value.into() }
    }
}

/// A variable to compute, as seen from the entity `kind`/`id`.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub variable: String,
    pub kind: EntityKind,
    pub id: String,
    pub period: Period,
}

impl Query {
    pub fn new(variable: &str, kind: EntityKind, id: &str, period: Period) -> Self {
        Self { variable: variable.to_string(), kind, id: id.to_string(), period }
    }
}

#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub entities: EntityGraph,
    pub inputs: Vec<Input>,
    pub queries: Vec<Query>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioOutcome {
    pub name: String,
    /// `Err` when an input was rejected; otherwise one result per query.
    pub results: Result<Vec<Result<Value, EngineError>>, EngineError>,
}

pub fn run_batch(
    registry: &Arc<VariableRegistry>,
    parameters: &Arc<ParameterTree>,
    config: &EngineConfig,
    scenarios: Vec<Scenario>,
) -> Vec<ScenarioOutcome> {
    debug!(scenarios = scenarios.len(), parallel = config.parallel, "running batch");
    let run = |scenario: Scenario| run_scenario(registry, parameters, config, scenario);
    if config.parallel {
        scenarios.into_par_iter().map(run).collect()
    } else {
        scenarios.into_iter().map(run).collect()
    }
}

fn run_scenario(
    registry: &Arc<VariableRegistry>,
    parameters: &Arc<ParameterTree>,
    config: &EngineConfig,
    scenario: Scenario,
) -> ScenarioOutcome {
    let Scenario { name, entities, inputs, queries } = scenario;
    let mut sim = Simulation::new(Arc::clone(registry), Arc::clone(parameters), entities, config.clone());

    for input in inputs {
        let applied = resolve(&sim, input.kind, &input.id)
            .and_then(|entity| sim.set_input(&input.variable, entity, input.period, input.value));
        if let Err(e) = applied {
            warn!(scenario = %name, variable = %input.variable, error = %e, "input rejected");
            return ScenarioOutcome { name, results: Err(e) };
        }
    }

    let results = queries
        .iter()
        .map(|q| {
            let result = resolve(&sim, q.kind, &q.id).and_then(|entity| sim.value_of(entity, &q.variable, q.period));
            if let Err(e) = &result {
                warn!(scenario = %name, variable = %q.variable, error = %e, "query failed");
            }
            result
        })
        .collect();
    ScenarioOutcome { name, results: Ok(results) }
}

fn resolve(sim: &Simulation, kind: EntityKind, id: &str) -> Result<EntityRef, EngineError> {
    Ok(sim.entities().lookup(kind, id)?)
}
