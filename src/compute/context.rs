//! The handle rules use to read other variables and parameters.
use super::engine::Simulation;
use super::error::EngineError;
use super::reducer::Reducer;
use super::value::Value;
use crate::entity::{EntityKind, EntityRef};
use crate::params::ParametersAt;
use crate::period::Period;
use smallvec::SmallVec;

/// Evaluation context of one rule call: the acting entity and period, and
/// re-entrant access to the running simulation.
pub struct Ctx<'a> {
    sim: &'a mut Simulation,
    entity: EntityRef,
    period: Period,
}

impl<'a> Ctx<'a> {
    pub(crate) fn new(sim: &'a mut Simulation, entity: EntityRef, period: Period) -> Self {
        Self { sim, entity, period }
    }

    pub fn entity(&self) -> EntityRef {
        self.entity
    }

    pub fn period(&self) -> Period {
        self.period
    }

    /// A variable of the acting entity.
    pub fn get(&mut self, variable: &str, period: Period) -> Result<Value, EngineError> {
        self.sim.calculate(variable, self.entity, period)
    }

    pub fn number(&mut self, variable: &str, period: Period) -> Result<f64, EngineError> {
        number(variable, self.get(variable, period)?)
    }

    pub fn flag(&mut self, variable: &str, period: Period) -> Result<bool, EngineError> {
        Ok(self.number(variable, period)? != 0.0)
    }

    pub fn choice(&mut self, variable: &str, period: Period) -> Result<String, EngineError> {
        choice(variable, self.get(variable, period)?)
    }

    /// Sum of a variable of the acting entity over the sub-periods of `period`.
    pub fn sum_over(&mut self, variable: &str, period: Period) -> Result<f64, EngineError> {
        number(variable, self.sim.calculate_add(variable, self.entity, period)?)
    }

    pub fn household(&mut self) -> Result<Handle<'_>, EngineError> {
        self.group(EntityKind::Household)
    }

    pub fn family(&mut self) -> Result<Handle<'_>, EngineError> {
        self.group(EntityKind::Family)
    }

    pub fn tax_household(&mut self) -> Result<Handle<'_>, EngineError> {
        self.group(EntityKind::TaxHousehold)
    }

    fn group(&mut self, kind: EntityKind) -> Result<Handle<'_>, EngineError> {
        if self.entity.kind != EntityKind::Individual {
            return Err(EngineError::EntityMismatch {
                variable: kind.key().to_string(),
                expected: EntityKind::Individual,
                actual: self.entity.kind,
            });
        }
        let entity = self.sim.entities().group_of(self.entity, kind)?;
        Ok(Handle { sim: &mut *self.sim, entity })
    }

    /// The individuals of the acting group.
    pub fn members(&mut self) -> Result<Members<'_>, EngineError> {
        if !self.entity.kind.is_group() {
            return Err(EngineError::EntityMismatch {
                variable: "members".into(),
                expected: EntityKind::Household,
                actual: self.entity.kind,
            });
        }
        let members = self.sim.entities().members(self.entity)?;
        Ok(Members { sim: &mut *self.sim, members })
    }

    /// Parameters as they stand at the start of the acting period.
    pub fn parameters(&self) -> ParametersAt {
        self.sim.parameters_at(self.period)
    }

    pub fn parameters_at(&self, period: Period) -> ParametersAt {
        self.sim.parameters_at(period)
    }
}

/// The group an individual belongs to.
pub struct Handle<'c> {
    sim: &'c mut Simulation,
    entity: EntityRef,
}

impl Handle<'_> {
    pub fn entity(&self) -> EntityRef {
        self.entity
    }

    pub fn get(&mut self, variable: &str, period: Period) -> Result<Value, EngineError> {
        self.sim.calculate(variable, self.entity, period)
    }

    pub fn number(&mut self, variable: &str, period: Period) -> Result<f64, EngineError> {
        number(variable, self.get(variable, period)?)
    }

    pub fn flag(&mut self, variable: &str, period: Period) -> Result<bool, EngineError> {
        Ok(self.number(variable, period)? != 0.0)
    }

    pub fn choice(&mut self, variable: &str, period: Period) -> Result<String, EngineError> {
        choice(variable, self.get(variable, period)?)
    }
}

/// The individuals of a group.
pub struct Members<'c> {
    sim: &'c mut Simulation,
    members: SmallVec<[EntityRef; 4]>,
}

impl Members<'_> {
    pub fn count(&self) -> usize {
        self.members.len()
    }

    pub fn values(&mut self, variable: &str, period: Period) -> Result<Vec<Value>, EngineError> {
        let mut values = Vec::with_capacity(self.members.len());
        for &member in &self.members {
            values.push(self.sim.calculate(variable, member, period)?);
        }
        Ok(values)
    }

    pub fn reduce(&mut self, variable: &str, period: Period, reducer: Reducer) -> Result<Value, EngineError> {
        let values = self.values(variable, period)?;
        let ty = &self.sim.registry().lookup(variable)?.value_type;
        reducer.reduce(&values, ty).ok_or_else(|| EngineError::TypeMismatch {
            variable: variable.to_string(),
            expected: "number".into(),
            actual: ty.name().into(),
        })
    }

    pub fn sum(&mut self, variable: &str, period: Period) -> Result<f64, EngineError> {
        number(variable, self.reduce(variable, period, Reducer::Sum)?)
    }

    pub fn any(&mut self, variable: &str, period: Period) -> Result<bool, EngineError> {
        Ok(self.reduce(variable, period, Reducer::Any)? == Value::Bool(true))
    }
}

fn number(variable: &str, value: Value) -> Result<f64, EngineError> {
    value.as_f64().ok_or_else(|| EngineError::TypeMismatch {
        variable: variable.to_string(),
        expected: "number".into(),
        actual: value.type_name().into(),
    })
}

fn choice(variable: &str, value: Value) -> Result<String, EngineError> {
    match value {
        Value::Enum(s) => Ok(s),
        other => Err(EngineError::TypeMismatch {
            variable: variable.to_string(),
            expected: "enum".into(),
            actual: other.type_name().into(),
        }),
    }
}
