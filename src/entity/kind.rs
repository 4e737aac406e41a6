//! Entity kinds and instance references.
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kinds of entities owning variable values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Individual,
    Household,
    Family,
    TaxHousehold,
}

impl EntityKind {
    /// Group kinds every individual belongs to, in storage order.
    pub const GROUPS: [EntityKind; 3] = [EntityKind::Household, EntityKind::Family, EntityKind::TaxHousehold];

    pub fn is_group(self) -> bool {
        self != EntityKind::Individual
    }

    pub(crate) fn group_slot(self) -> Option<usize> {
        match self {
            EntityKind::Individual => None,
            EntityKind::Household => Some(0),
            EntityKind::Family => Some(1),
            EntityKind::TaxHousehold => Some(2),
        }
    }

    /// The key used by the national rule base (`individu`, `menage`, ...).
    pub fn key(self) -> &'static str {
        match self {
            EntityKind::Individual => "individu",
            EntityKind::Household => "menage",
            EntityKind::Family => "famille",
            EntityKind::TaxHousehold => "foyer_fiscal",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Individual => "individual",
            EntityKind::Household => "household",
            EntityKind::Family => "family",
            EntityKind::TaxHousehold => "tax household",
        })
    }
}

/// A stable reference to one entity instance within an `EntityGraph`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub index: u32,
}

impl EntityRef {
    pub fn new(kind: EntityKind, index: usize) -> Self {
        Self { kind, index: index as u32 }
    }

    #[inline(always)]
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind.key(), self.index)
    }
}
