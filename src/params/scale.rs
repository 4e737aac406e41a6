//! Piecewise tariff scales.
use super::error::ParameterError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub threshold: f64,
    /// A flat amount for tariff tables, or a rate for marginal-rate scales.
    pub amount: f64,
}

/// Which side of a threshold selects a bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Boundary {
    /// Least threshold greater than or equal to the input.
    Left,
    /// Greatest threshold less than or equal to the input.
    Right,
}

/// An ordered list of brackets with strictly increasing thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Bracket>", into = "Vec<Bracket>")]
pub struct Scale {
    brackets: Vec<Bracket>,
}

impl Scale {
    pub fn new(brackets: Vec<Bracket>) -> Result<Self, ParameterError> {
        if brackets.is_empty() {
            return Err(ParameterError::InvalidScale("a scale needs at least one bracket".into()));
        }
        if let Some(b) = brackets.iter().find(|b| !b.threshold.is_finite() || !b.amount.is_finite()) {
            return Err(ParameterError::InvalidScale(format!(
                "non-finite bracket ({}, {})",
                b.threshold, b.amount
            )));
        }
        if let Some(w) = brackets.windows(2).find(|w| w[0].threshold >= w[1].threshold) {
            return Err(ParameterError::InvalidScale(format!(
                "thresholds must be strictly increasing, got {} then {}",
                w[0].threshold, w[1].threshold
            )));
        }
        Ok(Self { brackets })
    }

    pub fn from_pairs(pairs: &[(f64, f64)]) -> Result<Self, ParameterError> {
        Self::new(
            pairs
                .iter()
                .map(|&(threshold, amount)| Bracket { threshold, amount })
                .collect(),
        )
    }

    pub fn brackets(&self) -> &[Bracket] {
        &self.brackets
    }

    /// Index of the bracket selected for `input`, if any.
    pub fn bracket_index(&self, input: f64, boundary: Boundary) -> Option<usize> {
        match boundary {
            Boundary::Right => self
                .brackets
                .partition_point(|b| b.threshold <= input)
                .checked_sub(1),
            Boundary::Left => {
                let idx = self.brackets.partition_point(|b| b.threshold < input);
                (idx < self.brackets.len()).then_some(idx)
            }
        }
    }

    /// Amount attached to the selected bracket; `0.0` when the input falls
    /// outside every bracket.
    pub fn apply(&self, input: f64, boundary: Boundary) -> f64 {
        self.bracket_index(input, boundary)
            .map_or(0.0, |i| self.brackets[i].amount)
    }

    /// Marginal-rate computation: each bracket's rate applies to the part of
    /// the input lying between its threshold and the next one.
    pub fn marginal(&self, input: f64) -> f64 {
        let mut total = 0.0;
        for (i, bracket) in self.brackets.iter().enumerate() {
            if input <= bracket.threshold {
                break;
            }
            let upper = self.brackets.get(i + 1).map_or(f64::INFINITY, |b| b.threshold);
            total += (input.min(upper) - bracket.threshold) * bracket.amount;
        }
        total
    }
}

impl TryFrom<Vec<Bracket>> for Scale {
    type Error = ParameterError;

    fn try_from(brackets: Vec<Bracket>) -> Result<Self, Self::Error> {
        Self::new(brackets)
    }
}

impl From<Scale> for Vec<Bracket> {
    fn from(scale: Scale) -> Self {
        scale.brackets
    }
}
