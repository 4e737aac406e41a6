//! Eure-et-Loir: eligibility to the social accommodation allowance (ASH),
//! under the departmental social aid regulation for elderly and disabled
//! people, title 2.

use super::inputs::{
    AGE, ASH_RESOURCES, DUREE_POSSESSION_TITRE_SEJOUR, HANDICAP, INAPTE_TRAVAIL, LOYER, RESSORTISSANT_EEE,
};
use crate::compute::logic::{and, or};
use crate::compute::{Ctx, EngineError, Value, ValueType};
use crate::entity::EntityKind;
use crate::params::ParametersAt;
use crate::period::{Period, PeriodUnit};
use crate::store::{VariableDefinition, VariableRegistry};

pub const ASH_PERSONNE_AGEE: &str = "eure_et_loir_ASH_personne_agee";
pub const ASH_PERSONNE_HANDICAP: &str = "eure_et_loir_ASH_personne_handicap";

const ASH: &str = "departements.eure_et_loir.ASH";

pub fn register(registry: &mut VariableRegistry) -> Result<(), EngineError> {
    let since = Period::month(2020, 1)?;
    registry.register(
        VariableDefinition::new(ASH_PERSONNE_AGEE, ValueType::Bool, EntityKind::Individual, PeriodUnit::Month)
            .label("Éligibilité d'une personne agée à l'aide sociale à l'hébergement en établissement")
            .reference("Titre 2 Chapitre 2-1 du Règlement départemental d'Aide Sociale PA PH de l'Eure et Loir")
            .formula_from(since, personne_agee),
    )?;
    registry.register(
        VariableDefinition::new(ASH_PERSONNE_HANDICAP, ValueType::Bool, EntityKind::Individual, PeriodUnit::Month)
            .label("Éligibilité d'une personne en situation de handicap à l'aide sociale à l'hébergement en établissement")
            .reference("Titre 2 Chapitre 3-1 du Règlement départemental d'Aide Sociale PA PH de l'Eure et Loir")
            .formula_from(since, personne_handicap),
    )?;
    Ok(())
}

/// EEA nationals, or holders of a residence permit.
fn condition_nationalite(ctx: &mut Ctx<'_>, period: Period) -> Result<bool, EngineError> {
    if ctx.flag(RESSORTISSANT_EEE, period)? {
        return Ok(true);
    }
    Ok(ctx.number(DUREE_POSSESSION_TITRE_SEJOUR, period)? > 0.0)
}

// The rent is monthly while establishment fees are daily; the fee side of
// the means test is not modelled.
fn personne_agee(ctx: &mut Ctx<'_>, period: Period, p: &ParametersAt) -> Result<Value, EngineError> {
    let ash = p.child(ASH)?;
    let age = ctx.number(AGE, period)?;
    let inapte_travail = ctx.flag(INAPTE_TRAVAIL, period)?;

    let mut ressources = 0.0;
    for resource in ASH_RESOURCES {
        ressources += ctx.number(resource, period.last_month())?;
    }
    let loyer = ctx.household()?.number(LOYER, period)?;

    let condition_age = or(&[
        age >= ash.scalar("age_minimal_personne_agee_apte_travail")?,
        and(&[age >= ash.scalar("age_minimal_personne_agee_inapte_travail")?, inapte_travail]),
    ]);
    let condition_nationalite = condition_nationalite(ctx, period)?;
    let condition_ressources = ressources <= loyer;
    Ok(Value::Bool(and(&[condition_age, condition_nationalite, condition_ressources])))
}

fn personne_handicap(ctx: &mut Ctx<'_>, period: Period, p: &ParametersAt) -> Result<Value, EngineError> {
    let age = ctx.number(AGE, period)?;
    let condition_age = age >= p.child(ASH)?.scalar("age_minimal_personne_handicap")?;
    let condition_nationalite = condition_nationalite(ctx, period)?;
    let condition_handicap = ctx.flag(HANDICAP, period)?;
    Ok(Value::Bool(and(&[condition_age, condition_nationalite, condition_handicap])))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::fixtures;
    use rstest::rstest;

    fn month() -> Period {
        Period::month(2024, 3).unwrap()
    }

    struct Person {
        age: i32,
        inapte: bool,
        eee: bool,
        titre_sejour: i32,
        retraite: f64,
    }

    fn eligible(person: Person, loyer: f64) -> Result<Value, EngineError> {
        let mut sim = fixtures::simulation(fixtures::couple());
        let (alice, h) = (fixtures::alice(&sim), fixtures::household(&sim));
        let p = month();
        sim.set_input(AGE, alice, p, person.age)?;
        sim.set_input(INAPTE_TRAVAIL, alice, p, person.inapte)?;
        sim.set_input(RESSORTISSANT_EEE, alice, p, person.eee)?;
        sim.set_input(DUREE_POSSESSION_TITRE_SEJOUR, alice, p, person.titre_sejour)?;
        sim.set_input("retraite_nette", alice, p.last_month(), person.retraite)?;
        sim.set_input(LOYER, h, p, loyer)?;
        sim.calculate(ASH_PERSONNE_AGEE, alice, p)
    }

    #[rstest]
    #[case(Person { age: 70, inapte: false, eee: true, titre_sejour: 0, retraite: 900.0 }, 1000.0, true)]
    #[case(Person { age: 62, inapte: false, eee: true, titre_sejour: 0, retraite: 900.0 }, 1000.0, false)]
    #[case(Person { age: 62, inapte: true, eee: true, titre_sejour: 0, retraite: 900.0 }, 1000.0, true)]
    #[case(Person { age: 70, inapte: false, eee: false, titre_sejour: 0, retraite: 900.0 }, 1000.0, false)]
    #[case(Person { age: 70, inapte: false, eee: false, titre_sejour: 3, retraite: 900.0 }, 1000.0, true)]
    #[case(Person { age: 70, inapte: false, eee: true, titre_sejour: 0, retraite: 1200.0 }, 1000.0, false)]
    fn test_personne_agee(#[case] person: Person, #[case] loyer: f64, #[case] expected: bool) {
        assert_eq!(eligible(person, loyer).unwrap(), Value::Bool(expected));
    }

    #[test]
    fn test_resources_of_previous_month_only() {
        let mut sim = fixtures::simulation(fixtures::couple());
        let (alice, h) = (fixtures::alice(&sim), fixtures::household(&sim));
        let p = month();
        sim.set_input(AGE, alice, p, 70).unwrap();
        sim.set_input(RESSORTISSANT_EEE, alice, p, true).unwrap();
        sim.set_input(LOYER, h, p, 500.0).unwrap();
        sim.set_input("salaire_net", alice, p, 5000.0).unwrap();
        sim.set_input("ass", alice, p.last_month(), 300.0).unwrap();
        sim.set_input(crate::rules::inputs::CHOMAGE_NET, alice, p.last_month(), 150.0).unwrap();
        assert_eq!(sim.calculate(ASH_PERSONNE_AGEE, alice, p).unwrap(), Value::Bool(true));
        sim.set_input("ass", alice, p.last_month(), 400.0).unwrap();
        assert_eq!(sim.calculate(ASH_PERSONNE_AGEE, alice, p).unwrap(), Value::Bool(false));
    }

    #[rstest]
    #[case(17, true, false)]
    #[case(18, true, true)]
    #[case(40, false, false)]
    fn test_personne_handicap(#[case] age: i32, #[case] handicap: bool, #[case] expected: bool) {
        let mut sim = fixtures::simulation(fixtures::couple());
        let alice = fixtures::alice(&sim);
        sim.set_input(AGE, alice, month(), age).unwrap();
        sim.set_input(HANDICAP, alice, month(), handicap).unwrap();
        sim.set_input(RESSORTISSANT_EEE, alice, month(), true).unwrap();
        assert_eq!(sim.calculate(ASH_PERSONNE_HANDICAP, alice, month()).unwrap(), Value::Bool(expected));
    }

    #[test]
    fn test_no_rule_before_2020() {
        let mut sim = fixtures::simulation(fixtures::couple());
        let alice = fixtures::alice(&sim);
        assert!(matches!(
            sim.calculate(ASH_PERSONNE_HANDICAP, alice, Period::month(2019, 12).unwrap()),
            Err(EngineError::NoApplicableRule { .. })
        ));
    }
}
