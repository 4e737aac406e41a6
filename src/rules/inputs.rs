//! Base variables the local rules read.
//!
//! They come from the national rule base, which computes most of them; here
//! they are plain inputs so that local rules can run on their own.

use crate::compute::{EngineError, ValueType};
use crate::entity::EntityKind;
use crate::period::PeriodUnit;
use crate::store::{VariableDefinition, VariableRegistry};

pub const AGE: &str = "age";
pub const HANDICAP: &str = "handicap";
pub const INAPTE_TRAVAIL: &str = "inapte_travail";
pub const RESSORTISSANT_EEE: &str = "ressortissant_eee";
pub const DUREE_POSSESSION_TITRE_SEJOUR: &str = "duree_possession_titre_sejour";
pub const TAUX_INCAPACITE: &str = "taux_incapacite";
pub const ACTIVITE: &str = "activite";
pub const CHOMAGE_NET: &str = "chomage_net";

pub const LOYER: &str = "loyer";
pub const MENAGE_DANS_EMS: &str = "menage_dans_epci_siren_246700488";

pub const CMU_C_PLAFOND: &str = "cmu_c_plafond";

pub const RFR: &str = "rfr";
pub const NBPTR: &str = "nbptr";
pub const TISSEO_RESSOURCES_FISCALES: &str = "tisseo_transport_reduction_ressources_fiscales";

/// Possible values of `activite`.
pub const TYPES_ACTIVITE: [&str; 5] = ["actif", "chomeur", "etudiant", "retraite", "inactif"];

/// Monthly individual resources counted by the Eure-et-Loir ASH means test.
pub const ASH_RESOURCES: [&str; 16] = [
    "ass",
    CHOMAGE_NET,
    "retraite_nette",
    "salaire_net",
    "allocation_securisation_professionnelle",
    "dedommagement_victime_amiante",
    "gains_exceptionnels",
    "indemnites_chomage_partiel",
    "indemnites_journalieres",
    "indemnites_volontariat",
    "pensions_invalidite",
    "prestation_compensatoire",
    "prime_forfaitaire_mensuelle_reprise_activite",
    "retraite_brute",
    "revenus_stage_formation_pro",
    "rsa_base_ressources_patrimoine_individu",
];

fn individual(name: &str, ty: ValueType) -> VariableDefinition {
    VariableDefinition::new(name, ty, EntityKind::Individual, PeriodUnit::Month)
}

pub fn register(registry: &mut VariableRegistry) -> Result<(), EngineError> {
    registry.register(individual(AGE, ValueType::Int).label("Âge"))?;
    registry.register(individual(HANDICAP, ValueType::Bool).label("Individu en situation de handicap"))?;
    registry.register(individual(INAPTE_TRAVAIL, ValueType::Bool).label("Reconnu inapte au travail"))?;
    registry.register(individual(RESSORTISSANT_EEE, ValueType::Bool).label("Ressortissant de l'EEE ou de la Suisse"))?;
    registry.register(
        individual(DUREE_POSSESSION_TITRE_SEJOUR, ValueType::Int).label("Durée de possession du titre de séjour, en années"),
    )?;
    registry.register(individual(TAUX_INCAPACITE, ValueType::Float).label("Taux d'incapacité"))?;
    registry.register(
        individual(ACTIVITE, ValueType::Enum(vec![]))
            .possible_values(&TYPES_ACTIVITE)
            .label("Activité"),
    )?;
    for resource in ASH_RESOURCES {
        registry.register(individual(resource, ValueType::Float))?;
    }

    registry.register(
        VariableDefinition::new(LOYER, ValueType::Float, EntityKind::Household, PeriodUnit::Month).label("Loyer"),
    )?;
    registry.register(
        VariableDefinition::new(MENAGE_DANS_EMS, ValueType::Bool, EntityKind::Household, PeriodUnit::Month)
            .label("Le ménage réside dans l'Eurométropole de Strasbourg"),
    )?;

    registry.register(
        VariableDefinition::new(CMU_C_PLAFOND, ValueType::Float, EntityKind::Family, PeriodUnit::Month)
            .label("Plafond annuel de ressources pour l'éligibilité à la CMU-C"),
    )?;

    registry.register(
        VariableDefinition::new(RFR, ValueType::Float, EntityKind::TaxHousehold, PeriodUnit::Year)
            .label("Revenu fiscal de référence"),
    )?;
    registry.register(
        VariableDefinition::new(NBPTR, ValueType::Float, EntityKind::TaxHousehold, PeriodUnit::Year)
            .label("Nombre de parts")
            .default_value(1.0),
    )?;
    registry.register(
        VariableDefinition::new(TISSEO_RESSOURCES_FISCALES, ValueType::Float, EntityKind::TaxHousehold, PeriodUnit::Year)
            .label("Ressources fiscales retenues pour la réduction Tisséo"),
    )?;
    Ok(())
}
