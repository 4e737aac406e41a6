//! Tisséo (Toulouse) transport reductions for job seekers.
use super::inputs::{ACTIVITE, CHOMAGE_NET, CMU_C_PLAFOND, TISSEO_RESSOURCES_FISCALES};
use crate::compute::logic::select;
use crate::compute::{Ctx, EngineError, Value, ValueType};
use crate::entity::EntityKind;
use crate::params::ParametersAt;
use crate::period::{Period, PeriodUnit};
use crate::store::{VariableDefinition, VariableRegistry};

pub const REDUCTION_INDEMNISE: &str = "tisseo_transport_demandeur_emploi_indemnise_reduction";
pub const REDUCTION_NON_INDEMNISE: &str = "tisseo_transport_demandeur_emploi_non_indemnise_reduction";

/// Indicative net/gross SMIC ratio published by service-public.fr, pending
/// the exact conversion used by the network.
const SMIC_NET_SUR_BRUT: f64 = 7.82 / 9.88;

pub fn register(registry: &mut VariableRegistry) -> Result<(), EngineError> {
    registry.register(
        VariableDefinition::new(REDUCTION_INDEMNISE, ValueType::Float, EntityKind::Individual, PeriodUnit::Month)
            .label("Pourcentage de la réduction pour les demandeurs d'emploi indemnisés")
            .formula(reduction_indemnise),
    )?;
    registry.register(
        VariableDefinition::new(REDUCTION_NON_INDEMNISE, ValueType::Float, EntityKind::Individual, PeriodUnit::Month)
            .label("Pourcentage de la réduction pour les demandeurs d'emploi non indemnisés")
            .formula(reduction_non_indemnise),
    )?;
    Ok(())
}

fn smic_net_mensuel(p: &ParametersAt) -> Result<f64, EngineError> {
    let smic = p.child("cotsoc.gen")?;
    let brut = smic.scalar("smic_h_b")? * smic.scalar("nb_heure_travail_mensuel")?;
    Ok(SMIC_NET_SUR_BRUT * brut)
}

/// 100% under the monthly CMU-C ceiling, 80% under the net SMIC, 70% above.
fn reduction_indemnise(ctx: &mut Ctx<'_>, period: Period, p: &ParametersAt) -> Result<Value, EngineError> {
    let chomage_net = ctx.number(CHOMAGE_NET, period.last_month())?;
    let smic_net = smic_net_mensuel(p)?;
    let cmu_c_plafond = ctx.family()?.number(CMU_C_PLAFOND, period)? / 12.0;
    if chomage_net <= 0.0 {
        return Ok(Value::Float(0.0));
    }
    Ok(Value::Float(select(
        &[chomage_net <= cmu_c_plafond, chomage_net <= smic_net],
        &[100.0, 80.0],
        70.0,
    )))
}

fn reduction_non_indemnise(ctx: &mut Ctx<'_>, period: Period, p: &ParametersAt) -> Result<Value, EngineError> {
    let ressources = ctx.tax_household()?.number(TISSEO_RESSOURCES_FISCALES, period.n_2())?;
    let chomeur = ctx.choice(ACTIVITE, period)? == "chomeur";
    let sous_smic = ressources <= smic_net_mensuel(p)?;
    Ok(Value::Float(if chomeur && sous_smic { 80.0 } else { 0.0 }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::fixtures;
    use rstest::rstest;

    fn month() -> Period {
        Period::month(2024, 3).unwrap()
    }

    // Net SMIC in March 2024: 7.82 / 9.88 * 11.65 * 151.67, about 1398.5.
    #[rstest]
    #[case(0.0, 0.0)]
    #[case(700.0, 100.0)]
    #[case(750.0, 100.0)]
    #[case(1000.0, 80.0)]
    #[case(2000.0, 70.0)]
    fn test_reduction_indemnise(#[case] chomage: f64, #[case] expected: f64) {
        let mut sim = fixtures::simulation(fixtures::couple());
        let (alice, famille) = (fixtures::alice(&sim), fixtures::family(&sim));
        sim.set_input(CHOMAGE_NET, alice, month().last_month(), chomage).unwrap();
        sim.set_input(CMU_C_PLAFOND, famille, month(), 9000.0).unwrap();
        assert_eq!(sim.calculate(REDUCTION_INDEMNISE, alice, month()).unwrap(), Value::Float(expected));
    }

    #[test]
    fn test_current_month_benefits_do_not_count() {
        let mut sim = fixtures::simulation(fixtures::couple());
        let alice = fixtures::alice(&sim);
        sim.set_input(CHOMAGE_NET, alice, month(), 700.0).unwrap();
        assert_eq!(sim.calculate(REDUCTION_INDEMNISE, alice, month()).unwrap(), Value::Float(0.0));
    }

    #[rstest]
    #[case("chomeur", 1000.0, 80.0)]
    #[case("chomeur", 5000.0, 0.0)]
    #[case("actif", 1000.0, 0.0)]
    fn test_reduction_non_indemnise(#[case] activite: &str, #[case] ressources: f64, #[case] expected: f64) {
        let mut sim = fixtures::simulation(fixtures::couple());
        let (alice, foyer) = (fixtures::alice(&sim), fixtures::tax_household(&sim));
        sim.set_input(ACTIVITE, alice, month(), activite).unwrap();
        sim.set_input(TISSEO_RESSOURCES_FISCALES, foyer, Period::year(2022).unwrap(), ressources).unwrap();
        assert_eq!(sim.calculate(REDUCTION_NON_INDEMNISE, alice, month()).unwrap(), Value::Float(expected));
    }

    #[rstest]
    #[case(REDUCTION_NON_INDEMNISE)]
    #[case(REDUCTION_INDEMNISE)]
    fn test_missing_smic_parameter_fails(#[case] variable: &str) {
        let mut sim = fixtures::simulation(fixtures::couple());
        let alice = fixtures::alice(&sim);
        let before = Period::month(2010, 1).unwrap();
        sim.set_input(ACTIVITE, alice, before, "chomeur").unwrap();
        assert!(matches!(
            sim.calculate(variable, alice, before),
            Err(EngineError::Parameter(crate::params::ParameterError::NoEffectiveValueAtDate { .. }))
        ));
    }
}
