//! Local rules: benefits and fares set by departments and metropolises on
//! top of the national rule base.
pub mod eure_et_loir;
pub mod inputs;
pub mod strasbourg;
pub mod tisseo;

use crate::compute::EngineError;
use crate::store::VariableRegistry;

/// Registers the base inputs and every local rule.
pub fn register_all(registry: &mut VariableRegistry) -> Result<(), EngineError> {
    inputs::register(registry)?;
    strasbourg::register(registry)?;
    tisseo::register(registry)?;
    eure_et_loir::register(registry)?;
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{run_batch, Input, Query, Scenario};
    use crate::compute::Value;
    use crate::config::EngineConfig;
    use crate::entity::{EntityGraph, EntityKind};
    use crate::period::Period;
    use std::sync::Arc;

    #[test]
    fn test_rule_set_registers_without_collisions() {
        let reg = fixtures::registry();
        assert!(reg.lookup(strasbourg::MONTANT).is_ok());
        assert!(reg.lookup(tisseo::REDUCTION_INDEMNISE).is_ok());
        assert!(reg.lookup(eure_et_loir::ASH_PERSONNE_AGEE).is_ok());
        assert_eq!(reg.count(), 7 + 16 + 2 + 1 + 3 + 2 + 9 + 2 + 2);

        let mut again = fixtures::registry();
        assert!(matches!(register_all(&mut again), Err(EngineError::DuplicateVariableName { .. })));
    }

    #[test]
    fn test_households_priced_in_parallel() {
        let p = Period::month(2024, 3).unwrap();
        let scenario = |name: &str, age: i32| Scenario {
            name: name.to_string(),
            entities: EntityGraph::single_person("moi"),
            inputs: vec![
                Input::new(inputs::AGE, EntityKind::Individual, "moi", p, age),
                Input::new(inputs::MENAGE_DANS_EMS, EntityKind::Household, "moi", p, true),
                Input::new(inputs::RFR, EntityKind::TaxHousehold, "moi", Period::year(2022).unwrap(), 144000.0),
            ],
            queries: vec![Query::new(strasbourg::MONTANT, EntityKind::Individual, "moi", p)],
        };
        let outcomes = run_batch(
            &Arc::new(fixtures::registry()),
            &Arc::new(fixtures::parameters()),
            &EngineConfig::default(),
            vec![scenario("enfant", 10), scenario("etudiant", 22), scenario("adulte", 40)],
        );
        let fares: Vec<Value> = outcomes.into_iter().map(|o| o.results.unwrap().remove(0).unwrap()).collect();
        assert_eq!(fares, vec![Value::Float(0.0), Value::Float(50.0), Value::Float(130.0)]);
    }
}
