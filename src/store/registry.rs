use super::types::{FormulaVersion, VariableDefinition, VariableId};
use crate::compute::error::EngineError;
use crate::compute::value::ValueType;
use crate::period::Period;
use std::collections::HashMap;

/// All variable definitions of a rule set, addressed by name or by dense id.
///
/// Built once, then shared read-only by every simulation.
#[derive(Debug, Clone, Default)]
pub struct VariableRegistry {
    definitions: Vec<VariableDefinition>,
    by_name: HashMap<String, VariableId>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.definitions.len()
    }

    pub fn register(&mut self, mut definition: VariableDefinition) -> Result<VariableId, EngineError> {
        let name = definition.name.clone();
        if self.by_name.contains_key(&name) {
            return Err(EngineError::DuplicateVariableName { name });
        }
        if let ValueType::Enum(values) = &definition.value_type {
            if values.is_empty() {
                return Err(EngineError::InvalidDefinition { name, reason: "enumeration without values".into() });
            }
        }
        if let Err(default) = definition.conform_default() {
            return Err(EngineError::InvalidDefinition {
                reason: format!("default {} is not a valid {}", default, definition.value_type.name()),
                name,
            });
        }

        let id = VariableId::new(self.definitions.len());
        self.by_name.insert(name, id);
        self.definitions.push(definition);
        Ok(id)
    }

    pub fn id_of(&self, name: &str) -> Result<VariableId, EngineError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| EngineError::UnknownVariable { name: name.to_string() })
    }

    pub fn lookup(&self, name: &str) -> Result<&VariableDefinition, EngineError> {
        let id = self.id_of(name)?;
        Ok(&self.definitions[id.index()])
    }

    #[inline(always)]
    pub fn get(&self, id: VariableId) -> Option<&VariableDefinition> {
        self.definitions.get(id.index())
    }

    pub fn select_rule(&self, name: &str, period: Period) -> Result<&FormulaVersion, EngineError> {
        self.lookup(name)?.select_rule(period)
    }

    pub fn iter(&self) -> impl Iterator<Item = (VariableId, &VariableDefinition)> {
        self.definitions.iter().enumerate().map(|(i, d)| (VariableId::new(i), d))
    }
}
