//! A synchronous, single-threaded, re-entrant evaluation engine.
//!
//! Rules ask for other variables through their `Ctx`, which re-enters
//! `Simulation::evaluate`. Each `(variable, entity, period)` key walks the
//! states `NotRequested -> InProgress -> Computed | Failed`; meeting an
//! `InProgress` key again means the rules depend on themselves.

use super::context::Ctx;
use super::error::EngineError;
use super::ledger::{CacheKey, EvalState, KeyId, Ledger, LedgerStats};
use super::reducer::Reducer;
use super::value::{Value, ValueType};
use crate::config::EngineConfig;
use crate::display::trace::format_trace;
use crate::entity::{EntityError, EntityGraph, EntityKind, EntityRef};
use crate::params::{ParameterTree, ParametersAt};
use crate::period::Period;
use crate::store::{VariableId, VariableRegistry};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// A top-level query of `calculate_many`.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub variable: String,
    pub entity: EntityRef,
    pub period: Period,
}

impl Request {
    pub fn new(variable: &str, entity: EntityRef, period: Period) -> Self {
        Self { variable: variable.to_string(), entity, period }
    }
}

/// One evaluation run over one entity graph.
///
/// The registry and parameter tree are shared; the cache is owned and dies
/// with the simulation.
pub struct Simulation {
    registry: Arc<VariableRegistry>,
    parameters: Arc<ParameterTree>,
    entities: EntityGraph,
    config: EngineConfig,
    ledger: Ledger,
    stack: Vec<KeyId>,
}

impl Simulation {
    pub fn new(
        registry: Arc<VariableRegistry>,
        parameters: Arc<ParameterTree>,
        entities: EntityGraph,
        config: EngineConfig,
    ) -> Self {
        Self { registry, parameters, entities, config, ledger: Ledger::new(), stack: Vec::new() }
    }

    pub fn registry(&self) -> &VariableRegistry {
        &self.registry
    }

    pub fn entities(&self) -> &EntityGraph {
        &self.entities
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn stats(&self) -> LedgerStats {
        self.ledger.stats
    }

    /// Parameters as they stand at the start of `period`.
    pub fn parameters_at(&self, period: Period) -> ParametersAt {
        ParametersAt::new(Arc::clone(&self.parameters), period)
    }

    /// Sets the value of a variable, overriding its default or rule.
    ///
    /// Anything already computed from the previous value is dropped from the
    /// cache and recomputed on the next request.
    pub fn set_input(
        &mut self,
        variable: &str,
        entity: EntityRef,
        period: Period,
        value: impl Into<Value>,
    ) -> Result<(), EngineError> {
        let id = self.registry.id_of(variable)?;
        self.check_key(id, entity, period)?;
        let registry = Arc::clone(&self.registry);
        let def = registry.get(id).ok_or_else(|| EngineError::UnknownVariable { name: variable.to_string() })?;

        let value = value.into();
        let actual = value.type_name();
        let value = value.conform(&def.value_type).ok_or_else(|| EngineError::TypeMismatch {
            variable: def.name.clone(),
            expected: def.value_type.name().to_string(),
            actual: actual.to_string(),
        })?;

        let key = self.ledger.intern(CacheKey { variable: id, entity, period });
        let stale = self.ledger.dependencies().downstream_from(&[key]);
        if stale.len() > 1 {
            debug!(variable, %entity, %period, invalidated = stale.len() - 1, "input changed");
        }
        self.ledger.invalidate(stale);
        self.ledger.insert(key, value);
        Ok(())
    }

    /// Computes `variable` for `entity`, which must be of the variable's
    /// own entity kind.
    pub fn calculate(&mut self, variable: &str, entity: EntityRef, period: Period) -> Result<Value, EngineError> {
        let id = self.registry.id_of(variable)?;
        self.evaluate(id, entity, period)
    }

    /// Sums a variable over every sub-period of `period` in the variable's
    /// definition unit, e.g. the twelve months of a year.
    pub fn calculate_add(&mut self, variable: &str, entity: EntityRef, period: Period) -> Result<Value, EngineError> {
        let id = self.registry.id_of(variable)?;
        let registry = Arc::clone(&self.registry);
        let def = registry.get(id).ok_or_else(|| EngineError::UnknownVariable { name: variable.to_string() })?;
        let mut total = 0.0;
        for sub in period.sub_periods(def.definition_period)? {
            let value = self.evaluate(id, entity, sub)?;
            total += value.as_f64().ok_or_else(|| EngineError::TypeMismatch {
                variable: def.name.clone(),
                expected: "number".into(),
                actual: value.type_name().into(),
            })?;
        }
        Ok(match def.value_type {
            ValueType::Float => Value::Float(total),
            _ => Value::Int(total as i64),
        })
    }

    /// Value of `variable` as seen from `entity`, crossing entity kinds with
    /// the configured reducer.
    pub fn value_of(&mut self, entity: EntityRef, variable: &str, period: Period) -> Result<Value, EngineError> {
        let reducer = self.config.default_reducer;
        self.value_of_with(entity, variable, period, reducer)
    }

    /// Like `value_of`: an individual reads its group's value, a group
    /// folds its members' values with `reducer`.
    pub fn value_of_with(
        &mut self,
        entity: EntityRef,
        variable: &str,
        period: Period,
        reducer: Reducer,
    ) -> Result<Value, EngineError> {
        let registry = Arc::clone(&self.registry);
        let id = registry.id_of(variable)?;
        let def = registry.lookup(variable)?;
        match (entity.kind, def.entity) {
            (actual, expected) if actual == expected => self.evaluate(id, entity, period),
            (EntityKind::Individual, group) => {
                let owner = self.entities.group_of(entity, group)?;
                self.evaluate(id, owner, period)
            }
            (_, EntityKind::Individual) => {
                let members = self.entities.members(entity)?;
                let mut values = Vec::with_capacity(members.len());
                for member in members {
                    values.push(self.evaluate(id, member, period)?);
                }
                reducer.reduce(&values, &def.value_type).ok_or_else(|| EngineError::TypeMismatch {
                    variable: def.name.clone(),
                    expected: "number".into(),
                    actual: def.value_type.name().into(),
                })
            }
            (actual, expected) => Err(EngineError::EntityMismatch { variable: def.name.clone(), expected, actual }),
        }
    }

    /// Runs independent requests; a failing request does not affect the
    /// others.
    pub fn calculate_many(&mut self, requests: &[Request]) -> Vec<Result<Value, EngineError>> {
        requests
            .iter()
            .map(|r| {
                let result = self.value_of(r.entity, &r.variable, r.period);
                if let Err(e) = &result {
                    warn!(variable = %r.variable, entity = %r.entity, period = %r.period, error = %e, "request failed");
                }
                result
            })
            .collect()
    }

    pub fn state_of(&self, variable: &str, entity: EntityRef, period: Period) -> Result<&EvalState, EngineError> {
        let variable = self.registry.id_of(variable)?;
        Ok(self.ledger.state_of(&CacheKey { variable, entity, period }))
    }

    /// Renders the dependency tree behind an evaluated key.
    pub fn trace(&self, variable: &str, entity: EntityRef, period: Period) -> Result<String, EngineError> {
        let variable = self.registry.id_of(variable)?;
        Ok(format_trace(&self.registry, &self.entities, &self.ledger, CacheKey { variable, entity, period }))
    }

    /// Drops every cached value and set input.
    pub fn reset(&mut self) {
        self.ledger.clear();
        self.stack.clear();
    }

    fn check_key(&self, id: VariableId, entity: EntityRef, period: Period) -> Result<(), EngineError> {
        let def = self
            .registry
            .get(id)
            .ok_or_else(|| EngineError::UnknownVariable { name: format!("#{}", id.0) })?;
        if def.entity != entity.kind {
            return Err(EngineError::EntityMismatch {
                variable: def.name.clone(),
                expected: def.entity,
                actual: entity.kind,
            });
        }
        if period.unit() != def.definition_period || period.size() != 1 {
            return Err(EngineError::DefinitionPeriodMismatch {
                variable: def.name.clone(),
                expected: def.definition_period,
                period: period.to_string(),
            });
        }
        if !self.entities.contains(entity) {
            return Err(EntityError::UnknownEntity { kind: entity.kind, id: format!("#{}", entity.index) }.into());
        }
        Ok(())
    }

    pub(crate) fn evaluate(&mut self, id: VariableId, entity: EntityRef, period: Period) -> Result<Value, EngineError> {
        self.check_key(id, entity, period)?;
        let registry = Arc::clone(&self.registry);
        let def = registry.get(id).ok_or_else(|| EngineError::UnknownVariable { name: format!("#{}", id.0) })?;
        let key = self.ledger.intern(CacheKey { variable: id, entity, period });

        match self.ledger.state(key) {
            EvalState::Computed(value) => {
                let value = value.clone();
                self.ledger.stats.hits += 1;
                self.link(key);
                trace!(variable = %def.name, %entity, %period, "cache hit");
                return Ok(value);
            }
            EvalState::InProgress => return Err(self.cycle_error(key)),
            EvalState::NotRequested => {}
            // Edges read by the failed attempt no longer hold.
            EvalState::Failed(_) => self.ledger.invalidate([key]),
        }

        if self.stack.len() >= self.config.max_depth {
            return Err(EngineError::RecursionLimit {
                variable: def.name.clone(),
                period: period.to_string(),
                limit: self.config.max_depth,
            });
        }
        self.link(key);

        if def.is_input() {
            let value = def.default();
            self.ledger.insert(key, value.clone());
            return Ok(value);
        }

        let formula = match def.select_rule(period) {
            Ok(version) => Arc::clone(&version.formula),
            Err(e) => {
                self.fail(key, e.clone());
                return Err(e);
            }
        };

        debug!(variable = %def.name, %entity, %period, depth = self.stack.len(), "running rule");
        self.ledger.set_state(key, EvalState::InProgress);
        self.stack.push(key);
        let params = self.parameters_at(period);
        let result = {
            let mut ctx = Ctx::new(self, entity, period);
            formula(&mut ctx, period, &params)
        };
        self.stack.pop();

        let result = result.and_then(|value| {
            let actual = value.type_name();
            value.conform(&def.value_type).ok_or_else(|| EngineError::TypeMismatch {
                variable: def.name.clone(),
                expected: def.value_type.name().to_string(),
                actual: actual.to_string(),
            })
        });

        match result {
            Ok(value) => {
                self.ledger.stats.computations += 1;
                debug!(variable = %def.name, %entity, %period, %value, "computed");
                self.ledger.insert(key, value.clone());
                Ok(value)
            }
            Err(e) => {
                self.fail(key, e.clone());
                Err(e)
            }
        }
    }

    /// Records that the key being computed reads `key`.
    fn link(&mut self, key: KeyId) {
        if let Some(&dependent) = self.stack.last() {
            self.ledger.record_dependency(key, dependent);
        }
    }

    fn fail(&mut self, key: KeyId, error: EngineError) {
        self.ledger.stats.failures += 1;
        self.ledger.set_state(key, EvalState::Failed(error));
    }

    fn cycle_error(&self, key: KeyId) -> EngineError {
        let start = self.stack.iter().position(|&k| k == key).unwrap_or(0);
        let chain = self.stack[start..]
            .iter()
            .chain(std::iter::once(&key))
            .map(|&k| self.describe(k))
            .collect();
        let (variable, period) = match self.ledger.key(key) {
            Some(k) => (self.variable_name(k.variable), k.period.to_string()),
            None => (String::new(), String::new()),
        };
        EngineError::CircularDependency { variable, period, chain }
    }

    fn variable_name(&self, id: VariableId) -> String {
        self.registry.get(id).map_or_else(|| format!("#{}", id.0), |d| d.name.clone())
    }

    fn describe(&self, key: KeyId) -> String {
        match self.ledger.key(key) {
            Some(k) => format!("{}@{}", self.variable_name(k.variable), k.period),
            None => format!("key#{}", key.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Scale;
    use crate::period::PeriodUnit;
    use crate::store::VariableDefinition;
    use chrono::NaiveDate;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn month(s: &str) -> Period {
        s.parse().unwrap()
    }

    fn float_var(name: &str, entity: EntityKind) -> VariableDefinition {
        VariableDefinition::new(name, ValueType::Float, entity, PeriodUnit::Month)
    }

    fn params() -> Arc<ParameterTree> {
        let mut tree = ParameterTree::new();
        let d = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        tree.set_value("taux", d, 0.5)
            .unwrap()
            .set_scale("bareme", d, Scale::from_pairs(&[(0.0, 10.0), (1000.0, 5.0)]).unwrap())
            .unwrap();
        Arc::new(tree)
    }

    fn family() -> EntityGraph {
        EntityGraph::builder()
            .individuals(&["alice", "bob"])
            .household("h", &["alice", "bob"])
            .family("f", &["alice", "bob"])
            .tax_household("t", &["alice", "bob"])
            .build()
            .unwrap()
    }

    fn simulation(registry: VariableRegistry) -> Simulation {
        Simulation::new(Arc::new(registry), params(), family(), EngineConfig::default())
    }

    fn alice(sim: &Simulation) -> EntityRef {
        sim.entities().individual("alice").unwrap()
    }

    #[test]
    fn test_rule_runs_once_per_key() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut reg = VariableRegistry::new();
        reg.register(float_var("salaire", EntityKind::Individual)).unwrap();
        reg.register(float_var("net", EntityKind::Individual).formula(move |ctx, period, p| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Value::Float(ctx.number("salaire", period)? * p.scalar("taux")?))
        }))
        .unwrap();

        let mut sim = simulation(reg);
        let a = alice(&sim);
        let p = month("2024-01");
        sim.set_input("salaire", a, p, 2000.0).unwrap();
        assert_eq!(sim.calculate("net", a, p).unwrap(), Value::Float(1000.0));
        assert_eq!(sim.calculate("net", a, p).unwrap(), Value::Float(1000.0));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(sim.stats().hits, 1);
        assert_eq!(sim.state_of("net", a, p).unwrap(), &EvalState::Computed(Value::Float(1000.0)));
    }

    #[test]
    fn test_input_without_value_is_default() {
        let mut reg = VariableRegistry::new();
        reg.register(float_var("loyer", EntityKind::Household).default_value(12.5)).unwrap();
        let mut sim = simulation(reg);
        let h = sim.entities().group(EntityKind::Household, "h").unwrap();
        assert_eq!(sim.calculate("loyer", h, month("2024-01")).unwrap(), Value::Float(12.5));
    }

    #[test]
    fn test_declared_default_takes_the_variable_type() {
        let mut reg = VariableRegistry::new();
        reg.register(
            VariableDefinition::new("nbptr", ValueType::Float, EntityKind::TaxHousehold, PeriodUnit::Year).default_value(1),
        )
        .unwrap();
        let mut sim = simulation(reg);
        let t = sim.entities().group(EntityKind::TaxHousehold, "t").unwrap();
        assert_eq!(sim.calculate("nbptr", t, Period::year(2022).unwrap()).unwrap(), Value::Float(1.0));
    }

    #[test]
    fn test_direct_cycle() {
        let mut reg = VariableRegistry::new();
        reg.register(float_var("a", EntityKind::Individual).formula(|ctx, period, _| ctx.get("a", period)))
            .unwrap();
        let mut sim = simulation(reg);
        let a = alice(&sim);
        let err = sim.calculate("a", a, month("2024-01")).unwrap_err();
        assert_eq!(
            err,
            EngineError::CircularDependency {
                variable: "a".into(),
                period: "2024-01".into(),
                chain: vec!["a@2024-01".into(), "a@2024-01".into()],
            }
        );
    }

    #[test]
    fn test_indirect_cycle_reports_chain() {
        let mut reg = VariableRegistry::new();
        reg.register(float_var("a", EntityKind::Individual).formula(|ctx, period, _| ctx.get("b", period)))
            .unwrap();
        reg.register(float_var("b", EntityKind::Individual).formula(|ctx, period, _| ctx.get("a", period)))
            .unwrap();
        let mut sim = simulation(reg);
        let a = alice(&sim);
        match sim.calculate("a", a, month("2024-01")) {
            Err(EngineError::CircularDependency { chain, .. }) => {
                assert_eq!(chain, vec!["a@2024-01", "b@2024-01", "a@2024-01"]);
            }
            other => panic!("expected a cycle, got {:?}", other),
        }
        // Nothing stays in progress after the failure.
        assert!(matches!(sim.state_of("a", a, month("2024-01")).unwrap(), EvalState::Failed(_)));
        assert!(matches!(sim.state_of("b", a, month("2024-01")).unwrap(), EvalState::Failed(_)));
    }

    #[test]
    fn test_recursion_on_previous_period_is_not_a_cycle() {
        let mut reg = VariableRegistry::new();
        reg.register(float_var("anciennete", EntityKind::Individual).formula(|ctx, period, _| {
            if period <= month("2024-01") {
                return Ok(Value::Float(0.0));
            }
            Ok(Value::Float(ctx.number("anciennete", period.last_month())? + 1.0))
        }))
        .unwrap();
        let mut sim = simulation(reg);
        let a = alice(&sim);
        assert_eq!(sim.calculate("anciennete", a, month("2024-06")).unwrap(), Value::Float(5.0));
    }

    #[test]
    fn test_recursion_limit() {
        let mut reg = VariableRegistry::new();
        reg.register(float_var("sans_fin", EntityKind::Individual).formula(|ctx, period, _| {
            ctx.get("sans_fin", period.last_month())
        }))
        .unwrap();
        let config = EngineConfig { max_depth: 16, ..EngineConfig::default() };
        let mut sim = Simulation::new(Arc::new(reg), params(), family(), config);
        let a = alice(&sim);
        let err = sim.calculate("sans_fin", a, month("2024-01")).unwrap_err();
        assert!(matches!(err, EngineError::RecursionLimit { limit: 16, .. }), "got {:?}", err);
    }

    #[test]
    fn test_failure_is_not_cached() {
        let mut reg = VariableRegistry::new();
        reg.register(float_var("plafond", EntityKind::Individual).formula(|_, _, p| Ok(Value::Float(p.scalar("plafond")?))))
            .unwrap();
        let mut sim = simulation(reg);
        let a = alice(&sim);
        let p = month("2024-01");

        let err = sim.calculate("plafond", a, p).unwrap_err();
        assert!(matches!(err, EngineError::Parameter(crate::params::ParameterError::UnknownParameterPath { .. })));
        assert_eq!(sim.state_of("plafond", a, p).unwrap(), &EvalState::Failed(err.clone()));
        assert_eq!(sim.calculate("plafond", a, p).unwrap_err(), err);
        assert_eq!(sim.stats().failures, 2);
        assert_eq!(sim.stats().hits, 0);
    }

    #[test]
    fn test_retry_after_failure_drops_stale_dependencies() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let mut reg = VariableRegistry::new();
        reg.register(float_var("ancien", EntityKind::Individual)).unwrap();
        reg.register(float_var("nouveau", EntityKind::Individual)).unwrap();
        reg.register(float_var("montant", EntityKind::Individual).formula(move |ctx, period, _| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                ctx.get("ancien", period)?;
                return Err(EngineError::DivisionByZero { variable: "montant".into() });
            }
            ctx.get("nouveau", period)
        }))
        .unwrap();
        let mut sim = simulation(reg);
        let a = alice(&sim);
        let p = month("2024-01");

        assert!(sim.calculate("montant", a, p).is_err());
        sim.set_input("nouveau", a, p, 7.0).unwrap();
        assert_eq!(sim.calculate("montant", a, p).unwrap(), Value::Float(7.0));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);

        sim.set_input("ancien", a, p, 1.0).unwrap();
        assert_eq!(sim.state_of("montant", a, p).unwrap(), &EvalState::Computed(Value::Float(7.0)));
        assert!(!sim.trace("montant", a, p).unwrap().contains("ancien"));
    }

    #[test]
    fn test_type_mismatch() {
        let mut reg = VariableRegistry::new();
        reg.register(float_var("montant", EntityKind::Individual).formula(|_, _, _| Ok(Value::Enum("oui".into()))))
            .unwrap();
        let mut sim = simulation(reg);
        let a = alice(&sim);
        assert_eq!(
            sim.calculate("montant", a, month("2024-01")).unwrap_err(),
            EngineError::TypeMismatch { variable: "montant".into(), expected: "float".into(), actual: "enum".into() }
        );
    }

    #[test]
    fn test_no_applicable_rule_before_first_version() {
        let mut reg = VariableRegistry::new();
        reg.register(
            VariableDefinition::new("ash", ValueType::Bool, EntityKind::Individual, PeriodUnit::Month)
                .formula_from(month("2020-01"), |_, _, _| Ok(Value::Bool(true))),
        )
        .unwrap();
        let mut sim = simulation(reg);
        let a = alice(&sim);
        assert_eq!(sim.calculate("ash", a, month("2020-01")).unwrap(), Value::Bool(true));
        assert!(matches!(
            sim.calculate("ash", a, month("2019-12")),
            Err(EngineError::NoApplicableRule { .. })
        ));
    }

    #[rstest]
    #[case("year:2024", true)]
    #[case("month:2024-01:3", true)]
    #[case("2024-01", false)]
    fn test_definition_period_is_enforced(#[case] period: &str, #[case] rejected: bool) {
        let mut reg = VariableRegistry::new();
        reg.register(float_var("salaire", EntityKind::Individual)).unwrap();
        let mut sim = simulation(reg);
        let a = alice(&sim);
        let result = sim.calculate("salaire", a, period.parse().unwrap());
        assert_eq!(matches!(result, Err(EngineError::DefinitionPeriodMismatch { .. })), rejected);
    }

    #[test]
    fn test_calculate_add_over_a_year() {
        let mut reg = VariableRegistry::new();
        reg.register(float_var("salaire", EntityKind::Individual)).unwrap();
        let mut sim = simulation(reg);
        let a = alice(&sim);
        for m in 1..=6 {
            sim.set_input("salaire", a, Period::month(2024, m).unwrap(), 100.0).unwrap();
        }
        assert_eq!(sim.calculate_add("salaire", a, Period::year(2024).unwrap()).unwrap(), Value::Float(600.0));
        assert_eq!(sim.calculate_add("salaire", a, month("2024-03")).unwrap(), Value::Float(100.0));
    }

    #[test]
    fn test_set_input_invalidates_dependents() {
        let mut reg = VariableRegistry::new();
        reg.register(float_var("salaire", EntityKind::Individual)).unwrap();
        reg.register(float_var("double", EntityKind::Individual).formula(|ctx, period, _| {
            Ok(Value::Float(ctx.number("salaire", period)? * 2.0))
        }))
        .unwrap();
        reg.register(float_var("quadruple", EntityKind::Individual).formula(|ctx, period, _| {
            Ok(Value::Float(ctx.number("double", period)? * 2.0))
        }))
        .unwrap();
        let mut sim = simulation(reg);
        let a = alice(&sim);
        let p = month("2024-01");

        sim.set_input("salaire", a, p, 10.0).unwrap();
        assert_eq!(sim.calculate("quadruple", a, p).unwrap(), Value::Float(40.0));
        sim.set_input("salaire", a, p, 20.0).unwrap();
        assert_eq!(sim.state_of("double", a, p).unwrap(), &EvalState::NotRequested);
        assert_eq!(sim.calculate("quadruple", a, p).unwrap(), Value::Float(80.0));
    }

    #[test]
    fn test_set_input_checks() {
        let mut reg = VariableRegistry::new();
        reg.register(float_var("salaire", EntityKind::Individual)).unwrap();
        let mut sim = simulation(reg);
        let a = alice(&sim);
        let h = sim.entities().group(EntityKind::Household, "h").unwrap();
        let p = month("2024-01");
        assert!(matches!(sim.set_input("salaire", h, p, 1.0), Err(EngineError::EntityMismatch { .. })));
        assert!(matches!(sim.set_input("salaire", a, p, "abc"), Err(EngineError::TypeMismatch { .. })));
        assert!(matches!(sim.set_input("nope", a, p, 1.0), Err(EngineError::UnknownVariable { .. })));
        let ghost = EntityRef::new(EntityKind::Individual, 9);
        assert!(matches!(sim.set_input("salaire", ghost, p, 1.0), Err(EngineError::Entity(_))));
    }

    #[test]
    fn test_value_of_crosses_entities() {
        let mut reg = VariableRegistry::new();
        reg.register(float_var("salaire", EntityKind::Individual)).unwrap();
        reg.register(float_var("loyer", EntityKind::Household)).unwrap();
        reg.register(float_var("prestation", EntityKind::Family)).unwrap();
        let mut sim = simulation(reg);
        let p = month("2024-01");
        let a = alice(&sim);
        let b = sim.entities().individual("bob").unwrap();
        let h = sim.entities().group(EntityKind::Household, "h").unwrap();
        let f = sim.entities().group(EntityKind::Family, "f").unwrap();
        sim.set_input("salaire", a, p, 1500.0).unwrap();
        sim.set_input("salaire", b, p, 500.0).unwrap();
        sim.set_input("loyer", h, p, 700.0).unwrap();

        assert_eq!(sim.value_of(h, "salaire", p).unwrap(), Value::Float(2000.0));
        assert_eq!(sim.value_of_with(h, "salaire", p, Reducer::Max).unwrap(), Value::Float(1500.0));
        assert_eq!(sim.value_of(b, "loyer", p).unwrap(), Value::Float(700.0));
        assert!(matches!(sim.value_of(h, "prestation", p), Err(EngineError::EntityMismatch { .. })));
        assert!(matches!(sim.value_of(f, "loyer", p), Err(EngineError::EntityMismatch { .. })));
    }

    #[test]
    fn test_calculate_many_isolates_failures() {
        let mut reg = VariableRegistry::new();
        reg.register(float_var("salaire", EntityKind::Individual)).unwrap();
        reg.register(float_var("boucle", EntityKind::Individual).formula(|ctx, period, _| ctx.get("boucle", period)))
            .unwrap();
        let mut sim = simulation(reg);
        let a = alice(&sim);
        let p = month("2024-01");
        sim.set_input("salaire", a, p, 42.0).unwrap();

        let results = sim.calculate_many(&[
            Request::new("boucle", a, p),
            Request::new("salaire", a, p),
            Request::new("inconnue", a, p),
        ]);
        assert!(matches!(results[0], Err(EngineError::CircularDependency { .. })));
        assert_eq!(results[1], Ok(Value::Float(42.0)));
        assert!(matches!(results[2], Err(EngineError::UnknownVariable { .. })));
    }

    #[test]
    fn test_reset_forgets_inputs() {
        let mut reg = VariableRegistry::new();
        reg.register(float_var("salaire", EntityKind::Individual)).unwrap();
        let mut sim = simulation(reg);
        let a = alice(&sim);
        let p = month("2024-01");
        sim.set_input("salaire", a, p, 42.0).unwrap();
        sim.reset();
        assert_eq!(sim.calculate("salaire", a, p).unwrap(), Value::Float(0.0));
    }
}
