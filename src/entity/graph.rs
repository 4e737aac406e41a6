//! Individuals and the groups they belong to.
//!
//! Storage follows a dense columnar layout: individuals and groups are
//! addressed by index, and each individual keeps one group index per group
//! kind. Membership is fixed once the graph is built, so the graph is
//! acyclic by construction and aggregation over members always terminates.

use super::error::EntityError;
use super::kind::{EntityKind, EntityRef};
use smallvec::SmallVec;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    pub id: String,
    pub members: SmallVec<[u32; 4]>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityGraph {
    individuals: Vec<String>,
    individual_index: HashMap<String, u32>,
    groups: [Vec<Group>; 3],
    group_index: [HashMap<String, u32>; 3],
    /// Per individual, its group index for each of `EntityKind::GROUPS`.
    membership: Vec<[u32; 3]>,
}

impl EntityGraph {
    pub fn builder() -> EntityGraphBuilder {
        EntityGraphBuilder::default()
    }

    /// A lone individual living in its own household, family and tax
    /// household, all named after it.
    pub fn single_person(id: &str) -> Self {
        let group = Group { id: id.to_string(), members: SmallVec::from_slice(&[0]) };
        let index: HashMap<String, u32> = HashMap::from([(id.to_string(), 0)]);
        Self {
            individuals: vec![id.to_string()],
            individual_index: index.clone(),
            groups: [vec![group.clone()], vec![group.clone()], vec![group]],
            group_index: [index.clone(), index.clone(), index],
            membership: vec![[0, 0, 0]],
        }
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        match kind.group_slot() {
            None => self.individuals.len(),
            Some(slot) => self.groups[slot].len(),
        }
    }

    pub fn contains(&self, entity: EntityRef) -> bool {
        entity.index() < self.count(entity.kind)
    }

    pub fn individual(&self, id: &str) -> Result<EntityRef, EntityError> {
        self.lookup(EntityKind::Individual, id)
    }

    pub fn group(&self, kind: EntityKind, id: &str) -> Result<EntityRef, EntityError> {
        if !kind.is_group() {
            return Err(EntityError::UnknownEntity { kind, id: id.to_string() });
        }
        self.lookup(kind, id)
    }

    /// Finds any entity by kind and external id.
    pub fn lookup(&self, kind: EntityKind, id: &str) -> Result<EntityRef, EntityError> {
        let index = match kind.group_slot() {
            None => self.individual_index.get(id),
            Some(slot) => self.group_index[slot].get(id),
        };
        index
            .map(|&i| EntityRef { kind, index: i })
            .ok_or_else(|| EntityError::UnknownEntity { kind, id: id.to_string() })
    }

    pub fn id_of(&self, entity: EntityRef) -> Result<&str, EntityError> {
        let id = match entity.kind.group_slot() {
            None => self.individuals.get(entity.index()),
            Some(slot) => self.groups[slot].get(entity.index()).map(|g| &g.id),
        };
        id.map(String::as_str).ok_or_else(|| EntityError::UnknownEntity {
            kind: entity.kind,
            id: format!("#{}", entity.index),
        })
    }

    /// The group of kind `kind` the given individual belongs to.
    pub fn group_of(&self, individual: EntityRef, kind: EntityKind) -> Result<EntityRef, EntityError> {
        let slot = kind.group_slot().ok_or_else(|| EntityError::UnknownEntity {
            kind,
            id: format!("group of {}", individual),
        })?;
        if individual.kind != EntityKind::Individual {
            return Err(EntityError::UnknownEntity { kind: individual.kind, id: format!("#{}", individual.index) });
        }
        let row = self.membership.get(individual.index()).ok_or_else(|| EntityError::UnknownEntity {
            kind: EntityKind::Individual,
            id: format!("#{}", individual.index),
        })?;
        Ok(EntityRef { kind, index: row[slot] })
    }

    pub fn members(&self, group: EntityRef) -> Result<SmallVec<[EntityRef; 4]>, EntityError> {
        let unknown = || EntityError::UnknownEntity { kind: group.kind, id: format!("#{}", group.index) };
        let slot = group.kind.group_slot().ok_or_else(unknown)?;
        let g = self.groups[slot].get(group.index()).ok_or_else(unknown)?;
        Ok(g.members
            .iter()
            .map(|&i| EntityRef { kind: EntityKind::Individual, index: i })
            .collect())
    }
}

/// Collects individuals and groups by external id, then checks that every
/// individual belongs to exactly one group of each kind.
#[derive(Debug, Clone, Default)]
pub struct EntityGraphBuilder {
    individuals: Vec<String>,
    groups: [Vec<(String, Vec<String>)>; 3],
    misplaced: Option<String>,
}

impl EntityGraphBuilder {
    pub fn individual(mut self, id: &str) -> Self {
        self.individuals.push(id.to_string());
        self
    }

    pub fn individuals(mut self, ids: &[&str]) -> Self {
        self.individuals.extend(ids.iter().map(|s| s.to_string()));
        self
    }

    pub fn household(self, id: &str, members: &[&str]) -> Self {
        self.group(EntityKind::Household, id, members)
    }

    pub fn family(self, id: &str, members: &[&str]) -> Self {
        self.group(EntityKind::Family, id, members)
    }

    pub fn tax_household(self, id: &str, members: &[&str]) -> Self {
        self.group(EntityKind::TaxHousehold, id, members)
    }

    /// Adds a group of any group kind. Passing `Individual` is reported by
    /// `build`.
    pub fn group(mut self, kind: EntityKind, id: &str, members: &[&str]) -> Self {
        let entry = (id.to_string(), members.iter().map(|s| s.to_string()).collect());
        match kind.group_slot() {
            Some(slot) => self.groups[slot].push(entry),
            None => self.misplaced = Some(id.to_string()),
        }
        self
    }

    pub fn build(self) -> Result<EntityGraph, EntityError> {
        if let Some(id) = self.misplaced {
            return Err(EntityError::InvalidMembership(format!("'{}' was declared as a group of individuals", id)));
        }
        let mut graph = EntityGraph::default();

        for id in self.individuals {
            if graph.individual_index.contains_key(&id) {
                return Err(EntityError::InvalidMembership(format!("individual '{}' is declared twice", id)));
            }
            graph.individual_index.insert(id.clone(), graph.individuals.len() as u32);
            graph.individuals.push(id);
        }
        graph.membership = vec![[u32::MAX; 3]; graph.individuals.len()];

        for (slot, groups) in self.groups.into_iter().enumerate() {
            let kind = EntityKind::GROUPS[slot];
            for (id, member_ids) in groups {
                if graph.group_index[slot].contains_key(&id) {
                    return Err(EntityError::InvalidMembership(format!("{} '{}' is declared twice", kind, id)));
                }
                if member_ids.is_empty() {
                    return Err(EntityError::InvalidMembership(format!("{} '{}' has no members", kind, id)));
                }
                let group_index = graph.groups[slot].len() as u32;
                let mut members = SmallVec::new();
                for member in &member_ids {
                    let &person = graph.individual_index.get(member).ok_or_else(|| {
                        EntityError::InvalidMembership(format!("{} '{}' lists unknown individual '{}'", kind, id, member))
                    })?;
                    let row = &mut graph.membership[person as usize];
                    if row[slot] != u32::MAX {
                        return Err(EntityError::InvalidMembership(format!(
                            "individual '{}' belongs to more than one {}",
                            member, kind
                        )));
                    }
                    row[slot] = group_index;
                    members.push(person);
                }
                graph.group_index[slot].insert(id.clone(), group_index);
                graph.groups[slot].push(Group { id, members });
            }
        }

        for (person, row) in graph.membership.iter().enumerate() {
            if let Some(slot) = row.iter().position(|&g| g == u32::MAX) {
                return Err(EntityError::InvalidMembership(format!(
                    "individual '{}' belongs to no {}",
                    graph.individuals[person],
                    EntityKind::GROUPS[slot]
                )));
            }
        }

        Ok(graph)
    }
}
