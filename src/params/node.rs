//! Dated parameter nodes.
use super::scale::Scale;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A value that takes effect at `start`. `None` marks an explicit expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dated<T> {
    pub start: NaiveDate,
    pub value: Option<T>,
}

/// The legislative history of a single parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History<T> {
    entries: Vec<Dated<T>>,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<T> History<T> {
    /// Records a value (or an expiry) starting at `start`, replacing any
    /// entry with the same start date.
    pub fn set(&mut self, start: NaiveDate, value: Option<T>) {
        match self.entries.binary_search_by_key(&start, |e| e.start) {
            Ok(i) => self.entries[i].value = value,
            Err(i) => self.entries.insert(i, Dated { start, value }),
        }
    }

    /// The value in effect at `date`.
    ///
    /// Entries are not assumed sorted here since deserialized histories
    /// keep their source order.
    pub fn at(&self, date: NaiveDate) -> Option<&T> {
        self.entries
            .iter()
            .filter(|e| e.start <= date)
            .max_by_key(|e| e.start)
            .and_then(|e| e.value.as_ref())
    }

    pub fn entries(&self) -> &[Dated<T>] {
        &self.entries
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterNode {
    Branch(BTreeMap<String, ParameterNode>),
    Value(History<f64>),
    Scale(History<Scale>),
}

impl ParameterNode {
    pub fn branch() -> Self {
        ParameterNode::Branch(BTreeMap::new())
    }
}
