//! Solidarity pricing of public transport in the Eurométropole de Strasbourg.
//!
//! <https://www.strasbourg.eu/tarification-solidaire-transports-en-commun>

use super::inputs::{AGE, MENAGE_DANS_EMS, NBPTR, RFR, TAUX_INCAPACITE};
use crate::compute::logic::{and, max_, or};
use crate::compute::{Ctx, EngineError, Value, ValueType};
use crate::entity::EntityKind;
use crate::params::{Boundary, ParametersAt};
use crate::period::{Period, PeriodUnit};
use crate::store::{VariableDefinition, VariableRegistry};

pub const ELIGIBILITE_GEOGRAPHIQUE: &str = "strasbourg_metropole_transport_eligibilite_georaphique";
pub const ELIGIBLE_CARTE_EMERAUDE: &str = "eurometropole_strasbourg_transport_eligible_carte_emeraude";
pub const ELIGIBLE_GRATUITE_JEUNES_HANDICAP: &str =
    "eurometropole_strasbourg_transport_eligible_gratuite_jeunes_en_situation_handicap";
pub const ELIGIBLE_GRATUITE: &str = "eurometropole_strasbourg_transport_eligible_gratuite";
pub const ELIGIBLE_TARIF_REDUIT: &str = "eurometropole_strasbourg_transport_eligible_tarif_reduit";
pub const QUOTIENT_FAMILIAL: &str = "eurometropole_strasbourg_transport_quotient_familial";
pub const MONTANT_REDUIT: &str = "eurometropole_strasbourg_transport_montant_reduit";
pub const MONTANT_PLEIN_TARIF: &str = "eurometropole_strasbourg_transport_montant_plein_tarif";
pub const MONTANT: &str = "eurometropole_strasbourg_transport_montant";
pub const ATTESTATION_MDPH: &str = "attestion_mdph";
pub const ANCIEN_COMBATTANT_VEUVE_DE_GUERRE: &str = "ancien_combattant_veuve_de_guerre";

const TARIFS: &str = "metropoles.strasbourg.transport";

fn individual(name: &str, ty: ValueType) -> VariableDefinition {
    VariableDefinition::new(name, ty, EntityKind::Individual, PeriodUnit::Month)
}

pub fn register(registry: &mut VariableRegistry) -> Result<(), EngineError> {
    registry.register(individual(ATTESTATION_MDPH, ValueType::Bool))?;
    registry.register(individual(ANCIEN_COMBATTANT_VEUVE_DE_GUERRE, ValueType::Bool))?;

    registry.register(
        VariableDefinition::new(ELIGIBILITE_GEOGRAPHIQUE, ValueType::Bool, EntityKind::Household, PeriodUnit::Month)
            .label("Éligibilité géographique pour la gratuité des transports de l'Eurométropole de Strasbourg")
            .formula(eligibilite_geographique),
    )?;
    registry.register(
        individual(ELIGIBLE_CARTE_EMERAUDE, ValueType::Bool)
            .label("Éligibilité à la carte emeraude dans les transports de l'Eurométropole de Strasbourg")
            .formula(eligible_carte_emeraude),
    )?;
    registry.register(
        individual(ELIGIBLE_GRATUITE_JEUNES_HANDICAP, ValueType::Bool)
            .label("Éligibilité à la gratuité des transports pour les jeunes en situation de handicap")
            .formula(eligible_gratuite_jeunes_handicap),
    )?;
    registry.register(
        individual(ELIGIBLE_GRATUITE, ValueType::Bool)
            .label("Éligibilité à la gratuité des transports de l'Eurométropole de Strasbourg")
            .formula(eligible_gratuite),
    )?;
    registry.register(
        individual(ELIGIBLE_TARIF_REDUIT, ValueType::Bool)
            .label("Éligibilité au tarif réduit des transports de l'Eurométropole de Strasbourg")
            .formula(eligible_tarif_reduit),
    )?;
    registry.register(
        individual(QUOTIENT_FAMILIAL, ValueType::Float)
            .label("Quotient familial pour la tarification solidaire des transports")
            .formula(quotient_familial),
    )?;
    registry.register(
        individual(MONTANT_REDUIT, ValueType::Float)
            .label("Tarification réduite des transports de l'Eurométropole de Strasbourg")
            .formula(|ctx, period, p| montant_bareme(ctx, period, p, "montant_reduit")),
    )?;
    registry.register(
        individual(MONTANT_PLEIN_TARIF, ValueType::Float)
            .label("Tarification 18-25 des transports de l'Eurométropole de Strasbourg")
            .formula(|ctx, period, p| montant_bareme(ctx, period, p, "montant_plein_tarif")),
    )?;
    registry.register(
        individual(MONTANT, ValueType::Float)
            .label("Tarification des transports de l'Eurométropole de Strasbourg")
            .reference("https://www.strasbourg.eu/tarification-solidaire-transports-en-commun")
            .formula(montant),
    )?;
    Ok(())
}

fn eligibilite_geographique(ctx: &mut Ctx<'_>, period: Period, _: &ParametersAt) -> Result<Value, EngineError> {
    ctx.get(MENAGE_DANS_EMS, period)
}

fn geo(ctx: &mut Ctx<'_>, period: Period) -> Result<bool, EngineError> {
    ctx.household()?.flag(ELIGIBILITE_GEOGRAPHIQUE, period)
}

/// Free pass for veterans and war widows of 75 and over living in the
/// metropolis.
fn eligible_carte_emeraude(ctx: &mut Ctx<'_>, period: Period, _: &ParametersAt) -> Result<Value, EngineError> {
    let age = ctx.number(AGE, period)?;
    let geo = geo(ctx, period)?;
    let emeraude = ctx.flag(ANCIEN_COMBATTANT_VEUVE_DE_GUERRE, period)?;
    Ok(Value::Bool(and(&[geo, age >= 75.0, emeraude])))
}

/// Free transport for children of 20 or less who received a benefit from
/// the MDPH, on presentation of a certificate.
fn eligible_gratuite_jeunes_handicap(ctx: &mut Ctx<'_>, period: Period, _: &ParametersAt) -> Result<Value, EngineError> {
    let age = ctx.number(AGE, period)?;
    let geo = geo(ctx, period)?;
    let attestation = ctx.flag(ATTESTATION_MDPH, period)?;
    Ok(Value::Bool(and(&[geo, age <= 20.0, attestation])))
}

fn eligible_gratuite(ctx: &mut Ctx<'_>, period: Period, _: &ParametersAt) -> Result<Value, EngineError> {
    let age = ctx.number(AGE, period)?;
    let geo = geo(ctx, period)?;
    let handicap = ctx.flag(ELIGIBLE_GRATUITE_JEUNES_HANDICAP, period)?;
    let emeraude = ctx.flag(ELIGIBLE_CARTE_EMERAUDE, period)?;
    Ok(Value::Bool(geo && or(&[age < 18.0, handicap, emeraude])))
}

/// Under 25, 65 and over, or at least 80% disability.
fn eligible_tarif_reduit(ctx: &mut Ctx<'_>, period: Period, _: &ParametersAt) -> Result<Value, EngineError> {
    let age = ctx.number(AGE, period)?;
    let pmr = ctx.number(TAUX_INCAPACITE, period)? >= 0.8;
    Ok(Value::Bool(or(&[age < 25.0, pmr, age >= 65.0])))
}

fn quotient_familial(ctx: &mut Ctx<'_>, period: Period, _: &ParametersAt) -> Result<Value, EngineError> {
    let n_2 = period.n_2();
    let mut foyer = ctx.tax_household()?;
    let rfr = foyer.number(RFR, n_2)?;
    let parts = foyer.number(NBPTR, n_2)?;
    if parts == 0.0 {
        return Err(EngineError::DivisionByZero { variable: QUOTIENT_FAMILIAL.to_string() });
    }
    Ok(Value::Float(rfr / 12.0 / parts))
}

fn montant_bareme(ctx: &mut Ctx<'_>, period: Period, p: &ParametersAt, bareme: &str) -> Result<Value, EngineError> {
    let qf = ctx.number(QUOTIENT_FAMILIAL, period)?;
    let tarifs = p.child(TARIFS)?;
    let bareme = tarifs.scale(bareme)?;
    Ok(Value::Float(bareme.apply(max_(0, qf), Boundary::Right)))
}

/// Free, reduced, or full fare, in that order of precedence.
fn montant(ctx: &mut Ctx<'_>, period: Period, _: &ParametersAt) -> Result<Value, EngineError> {
    if ctx.flag(ELIGIBLE_GRATUITE, period)? {
        return Ok(Value::Float(0.0));
    }
    if ctx.flag(ELIGIBLE_TARIF_REDUIT, period)? {
        return ctx.get(MONTANT_REDUIT, period);
    }
    ctx.get(MONTANT_PLEIN_TARIF, period)
}
