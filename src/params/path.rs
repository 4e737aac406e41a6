//! Structured dotted key paths into the parameter tree.
use super::error::ParameterError;
use std::fmt;
use std::str::FromStr;

/// A parsed path such as `metropoles.strasbourg.transport.montant_reduit`.
///
/// The empty path designates the root of the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParameterPath(Vec<String>);

impl ParameterPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn parse(s: &str) -> Result<Self, ParameterError> {
        if s.is_empty() {
            return Ok(Self::root());
        }
        let segments: Vec<String> = s.split('.').map(str::to_string).collect();
        if segments.iter().any(|seg| seg.is_empty() || seg.contains(char::is_whitespace)) {
            return Err(ParameterError::InvalidPath(s.to_string()));
        }
        Ok(Self(segments))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn join(&self, other: &ParameterPath) -> Self {
        let mut segments = self.0.clone();
        segments.extend(other.0.iter().cloned());
        Self(segments)
    }

    /// Splits off the last segment, returning `(parent, leaf name)`.
    pub fn split_last(&self) -> Option<(ParameterPath, &str)> {
        let (last, rest) = self.0.split_last()?;
        Some((Self(rest.to_vec()), last.as_str()))
    }
}

impl FromStr for ParameterPath {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ParameterPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}
