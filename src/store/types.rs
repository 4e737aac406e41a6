use crate::compute::context::Ctx;
use crate::compute::error::EngineError;
use crate::compute::value::{Value, ValueType};
use crate::entity::EntityKind;
use crate::params::ParametersAt;
use crate::period::{Period, PeriodUnit};
use chrono::NaiveDate;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct VariableId(pub u32);

impl VariableId {
    #[inline(always)]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
    pub fn new(idx: usize) -> Self {
        Self(idx as u32)
    }
}

/// A rule: computes one variable for the acting entity of `ctx` over `period`.
pub type Formula = Arc<dyn Fn(&mut Ctx<'_>, Period, &ParametersAt) -> Result<Value, EngineError> + Send + Sync>;

/// One dated version of a variable's rule, applying over `[start, stop)`.
#[derive(Clone)]
pub struct FormulaVersion {
    pub start: Option<NaiveDate>,
    pub stop: Option<NaiveDate>,
    pub formula: Formula,
}

impl FormulaVersion {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| s <= date) && self.stop.map_or(true, |s| date < s)
    }
}

impl fmt::Debug for FormulaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormulaVersion")
            .field("start", &self.start)
            .field("stop", &self.stop)
            .finish_non_exhaustive()
    }
}

/// Declaration of a variable: what it holds, who owns it, how often it
/// changes and, unless it is an input, how to compute it.
#[derive(Debug, Clone)]
pub struct VariableDefinition {
    pub name: String,
    pub value_type: ValueType,
    pub entity: EntityKind,
    pub definition_period: PeriodUnit,
    pub label: Option<String>,
    pub reference: Option<String>,
    default: Option<Value>,
    formulas: SmallVec<[FormulaVersion; 1]>,
}

impl VariableDefinition {
    pub fn new(name: &str, value_type: ValueType, entity: EntityKind, definition_period: PeriodUnit) -> Self {
        Self {
            name: name.to_string(),
            value_type,
            entity,
            definition_period,
            label: None,
            reference: None,
            default: None,
            formulas: SmallVec::new(),
        }
    }

    pub fn label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn reference(mut self, reference: &str) -> Self {
        self.reference = Some(reference.to_string());
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Declares the possible values of an enumeration variable. The first
    /// one becomes the default unless one was set.
    pub fn possible_values(mut self, values: &[&str]) -> Self {
        self.value_type = ValueType::Enum(values.iter().map(|s| s.to_string()).collect());
        self
    }

    /// A rule applying at every date.
    pub fn formula<F>(self, f: F) -> Self
    where
        F: Fn(&mut Ctx<'_>, Period, &ParametersAt) -> Result<Value, EngineError> + Send + Sync + 'static,
    {
        self.formula_between(None, None, f)
    }

    /// A rule applying from the start of `start` on.
    pub fn formula_from<F>(self, start: Period, f: F) -> Self
    where
        F: Fn(&mut Ctx<'_>, Period, &ParametersAt) -> Result<Value, EngineError> + Send + Sync + 'static,
    {
        self.formula_between(Some(start), None, f)
    }

    /// A rule applying from the start of `start` until the start of `stop`.
    pub fn formula_between<F>(mut self, start: Option<Period>, stop: Option<Period>, f: F) -> Self
    where
        F: Fn(&mut Ctx<'_>, Period, &ParametersAt) -> Result<Value, EngineError> + Send + Sync + 'static,
    {
        self.formulas.push(FormulaVersion {
            start: start.map(|p| p.to_date()),
            stop: stop.map(|p| p.to_date()),
            formula: Arc::new(f),
        });
        self
    }

    pub fn is_input(&self) -> bool {
        self.formulas.is_empty()
    }

    /// The declared default, or the value type's own.
    pub fn default(&self) -> Value {
        self.default.clone().unwrap_or_else(|| self.value_type.default_value())
    }

    /// Converts the declared default to the value type, handing back the
    /// rejected value on failure.
    pub(crate) fn conform_default(&mut self) -> Result<(), Value> {
        match self.default.take() {
            Some(value) => match value.clone().conform(&self.value_type) {
                Some(conformed) => {
                    self.default = Some(conformed);
                    Ok(())
                }
                None => Err(value),
            },
            None => Ok(()),
        }
    }

    pub fn formulas(&self) -> &[FormulaVersion] {
        &self.formulas
    }

    /// The version covering the start of `period`, preferring the latest
    /// start when several overlap.
    pub fn select_rule(&self, period: Period) -> Result<&FormulaVersion, EngineError> {
        let date = period.to_date();
        self.formulas
            .iter()
            .filter(|v| v.covers(date))
            .max_by_key(|v| v.start)
            .ok_or_else(|| EngineError::NoApplicableRule {
                variable: self.name.clone(),
                period: period.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(x: f64) -> impl Fn(&mut Ctx<'_>, Period, &ParametersAt) -> Result<Value, EngineError> + Send + Sync {
        move |_, _, _| Ok(Value::Float(x))
    }

    fn month(s: &str) -> Period {
        s.parse().unwrap()
    }

    #[test]
    fn test_select_rule_by_date() {
        let def = VariableDefinition::new("v", ValueType::Float, EntityKind::Individual, PeriodUnit::Month)
            .formula_between(None, Some(month("2020-01")), constant(1.0))
            .formula_from(month("2020-01"), constant(2.0))
            .formula_from(month("2023-07"), constant(3.0));

        assert_eq!(def.select_rule(month("2019-12")).unwrap().stop, Some(month("2020-01").to_date()));
        assert_eq!(def.select_rule(month("2021-05")).unwrap().start, Some(month("2020-01").to_date()));
        assert_eq!(def.select_rule(month("2024-01")).unwrap().start, Some(month("2023-07").to_date()));
        assert!(!def.is_input());
    }

    #[test]
    fn test_no_applicable_rule() {
        let def = VariableDefinition::new("ash", ValueType::Bool, EntityKind::Individual, PeriodUnit::Month)
            .formula_from(month("2020-01"), constant(1.0));
        assert_eq!(
            def.select_rule(month("2019-06")).unwrap_err(),
            EngineError::NoApplicableRule { variable: "ash".into(), period: "2019-06".into() }
        );
    }

    #[test]
    fn test_defaults() {
        let def = VariableDefinition::new("nbptr", ValueType::Float, EntityKind::TaxHousehold, PeriodUnit::Year)
            .default_value(1.0);
        assert!(def.is_input());
        assert_eq!(def.default(), Value::Float(1.0));

        let activites = ValueType::Enum(vec!["actif".into(), "chomeur".into()]);
        let def = VariableDefinition::new("activite", activites, EntityKind::Individual, PeriodUnit::Month);
        assert_eq!(def.default(), Value::Enum("actif".into()));

        let def = def.possible_values(&["chomeur", "retraite"]);
        assert_eq!(def.value_type, ValueType::Enum(vec!["chomeur".into(), "retraite".into()]));
        assert_eq!(def.default(), Value::Enum("chomeur".into()));
    }

    #[test]
    fn test_conform_default_converts_to_declared_type() {
        let mut def = VariableDefinition::new("nbptr", ValueType::Float, EntityKind::TaxHousehold, PeriodUnit::Year)
            .default_value(1);
        assert_eq!(def.conform_default(), Ok(()));
        assert_eq!(def.default(), Value::Float(1.0));

        let mut def = VariableDefinition::new("age", ValueType::Int, EntityKind::Individual, PeriodUnit::Month)
            .default_value(1.5);
        assert_eq!(def.conform_default(), Err(Value::Float(1.5)));
    }
}
