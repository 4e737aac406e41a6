//! The parameter tree and its period-scoped view.
use super::error::ParameterError;
use super::node::{History, ParameterNode};
use super::path::ParameterPath;
use super::scale::Scale;
use crate::period::Period;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A resolved parameter leaf.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterValue<'a> {
    Scalar(f64),
    Scale(&'a Scale),
}

/// The versioned, dated parameter tree.
///
/// Built once before any simulation starts and only read afterwards, so a
/// single tree can be shared by every concurrent run behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterTree {
    root: BTreeMap<String, ParameterNode>,
}

impl ParameterTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_value(&mut self, path: &str, start: NaiveDate, value: f64) -> Result<&mut Self, ParameterError> {
        self.set_dated(path, start, Some(value))?;
        Ok(self)
    }

    /// Marks a scalar parameter as no longer in force from `start` on.
    pub fn expire_value(&mut self, path: &str, start: NaiveDate) -> Result<&mut Self, ParameterError> {
        self.set_dated(path, start, None)?;
        Ok(self)
    }

    pub fn set_scale(&mut self, path: &str, start: NaiveDate, scale: Scale) -> Result<&mut Self, ParameterError> {
        let path = ParameterPath::parse(path)?;
        match self.leaf_slot(&path, || ParameterNode::Scale(History::default()))? {
            ParameterNode::Scale(history) => history.set(start, Some(scale)),
            _ => return Err(ParameterError::NotAScale { path: path.to_string() }),
        }
        Ok(self)
    }

    fn set_dated(&mut self, path: &str, start: NaiveDate, value: Option<f64>) -> Result<(), ParameterError> {
        let path = ParameterPath::parse(path)?;
        match self.leaf_slot(&path, || ParameterNode::Value(History::default()))? {
            ParameterNode::Value(history) => {
                history.set(start, value);
                Ok(())
            }
            _ => Err(ParameterError::NotAScalar { path: path.to_string() }),
        }
    }

    /// Walks to the leaf at `path`, creating intermediate branches and the
    /// leaf itself when missing.
    fn leaf_slot(
        &mut self,
        path: &ParameterPath,
        make_leaf: impl FnOnce() -> ParameterNode,
    ) -> Result<&mut ParameterNode, ParameterError> {
        let (parent, leaf) = path
            .split_last()
            .ok_or_else(|| ParameterError::InvalidPath(path.to_string()))?;
        let mut children = &mut self.root;
        for segment in parent.segments() {
            let node = children
                .entry(segment.clone())
                .or_insert_with(ParameterNode::branch);
            children = match node {
                ParameterNode::Branch(map) => map,
                _ => return Err(ParameterError::InvalidPath(path.to_string())),
            };
        }
        Ok(children.entry(leaf.to_string()).or_insert_with(make_leaf))
    }

    /// Explicit tree walk; `None` when any segment is missing.
    pub fn node(&self, path: &ParameterPath) -> Option<&ParameterNode> {
        let (first, rest) = path.segments().split_first()?;
        let mut node = self.root.get(first)?;
        for segment in rest {
            node = match node {
                ParameterNode::Branch(map) => map.get(segment)?,
                _ => return None,
            };
        }
        Some(node)
    }

    /// Resolves the leaf at `path` for the date `period` starts on.
    pub fn resolve(&self, path: &str, period: Period) -> Result<ParameterValue<'_>, ParameterError> {
        self.resolve_at(&ParameterPath::parse(path)?, period.to_date())
    }

    pub fn resolve_at(&self, path: &ParameterPath, date: NaiveDate) -> Result<ParameterValue<'_>, ParameterError> {
        let no_value = || ParameterError::NoEffectiveValueAtDate { path: path.to_string(), date };
        match self.node(path) {
            None => Err(ParameterError::UnknownParameterPath { path: path.to_string() }),
            Some(ParameterNode::Branch(_)) => Err(ParameterError::NotALeaf { path: path.to_string() }),
            Some(ParameterNode::Value(history)) => {
                history.at(date).copied().map(ParameterValue::Scalar).ok_or_else(no_value)
            }
            Some(ParameterNode::Scale(history)) => {
                history.at(date).map(ParameterValue::Scale).ok_or_else(no_value)
            }
        }
    }
}

/// The parameter tree scoped to one instant, optionally to a sub-tree.
///
/// This is the handle rules receive; it owns a reference to the shared tree
/// so rules can keep it while requesting other variables.
#[derive(Debug, Clone)]
pub struct ParametersAt {
    tree: Arc<ParameterTree>,
    prefix: ParameterPath,
    date: NaiveDate,
}

impl ParametersAt {
    /// A view of the whole tree as it stands at the start of `period`.
    pub fn new(tree: Arc<ParameterTree>, period: Period) -> Self {
        Self { tree, prefix: ParameterPath::root(), date: period.to_date() }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    fn full_path(&self, path: &str) -> Result<ParameterPath, ParameterError> {
        Ok(self.prefix.join(&ParameterPath::parse(path)?))
    }

    /// Narrows the view to a sub-tree, like `parameters(period).cotsoc.gen`.
    pub fn child(&self, path: &str) -> Result<ParametersAt, ParameterError> {
        let prefix = self.full_path(path)?;
        match self.tree.node(&prefix) {
            Some(ParameterNode::Branch(_)) => Ok(ParametersAt {
                tree: Arc::clone(&self.tree),
                prefix,
                date: self.date,
            }),
            Some(_) => Err(ParameterError::InvalidPath(prefix.to_string())),
            None => Err(ParameterError::UnknownParameterPath { path: prefix.to_string() }),
        }
    }

    pub fn resolve(&self, path: &str) -> Result<ParameterValue<'_>, ParameterError> {
        self.tree.resolve_at(&self.full_path(path)?, self.date)
    }

    pub fn scalar(&self, path: &str) -> Result<f64, ParameterError> {
        match self.resolve(path)? {
            ParameterValue::Scalar(v) => Ok(v),
            ParameterValue::Scale(_) => Err(ParameterError::NotAScalar { path: self.full_path(path)?.to_string() }),
        }
    }

    pub fn scale(&self, path: &str) -> Result<&Scale, ParameterError> {
        match self.resolve(path)? {
            ParameterValue::Scale(s) => Ok(s),
            ParameterValue::Scalar(_) => Err(ParameterError::NotAScale { path: self.full_path(path)?.to_string() }),
        }
    }
}
