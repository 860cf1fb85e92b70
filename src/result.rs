//! The export unit and its shape classification.

use crate::delivery::ArtifactKind;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of one completed simulation run.
///
/// Both fields are optional: a run may have been configured but not yet
/// computed, or computed from parameters that were never recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmResult {
    /// Simulation input configuration
    #[serde(default)]
    pub params: Option<Value>,
    /// Computed deterministic trajectory
    #[serde(default)]
    pub deterministic: Option<Trajectory>,
}

impl AlgorithmResult {
    pub fn new(params: Option<Value>, deterministic: Option<Trajectory>) -> Self {
        Self {
            params,
            deterministic,
        }
    }
}

/// A deterministic trajectory: one row of named values per time step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    /// Value column names, excluding the leading time column
    pub columns: Vec<String>,
    pub points: Vec<TrajectoryPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub time: f64,
    pub values: Vec<f64>,
}

/// Which of the optional fields of an [`AlgorithmResult`] are present.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResultShape<'a> {
    Empty,
    ParamsOnly(&'a Value),
    DeterministicOnly(&'a Trajectory),
    Complete(&'a Value, &'a Trajectory),
}

impl<'a> ResultShape<'a> {
    pub fn of(result: &'a AlgorithmResult) -> Self {
        match (result.params.as_ref(), result.deterministic.as_ref()) {
            (None, None) => ResultShape::Empty,
            (Some(p), None) => ResultShape::ParamsOnly(p),
            (None, Some(d)) => ResultShape::DeterministicOnly(d),
            (Some(p), Some(d)) => ResultShape::Complete(p, d),
        }
    }

    pub fn params(&self) -> Option<&'a Value> {
        match *self {
            ResultShape::ParamsOnly(p) | ResultShape::Complete(p, _) => Some(p),
            _ => None,
        }
    }

    pub fn deterministic(&self) -> Option<&'a Trajectory> {
        match *self {
            ResultShape::DeterministicOnly(d) | ResultShape::Complete(_, d) => Some(d),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ResultShape::Empty)
    }

    /// Artifacts that cannot be produced from this shape, in archive order.
    pub fn missing(&self) -> Vec<ArtifactKind> {
        let mut missing = Vec::new();
        if self.params().is_none() {
            missing.push(ArtifactKind::Params);
        }
        if self.deterministic().is_none() {
            missing.push(ArtifactKind::Results);
        }
        missing
    }
}

/// Classify a possibly-absent result.
///
/// An absent result is a caller bug and fails fast with
/// [`Error::ContractViolation`]; every other shape is returned for the
/// caller to act on.
pub fn classify(result: Option<&AlgorithmResult>) -> Result<ResultShape<'_>> {
    match result {
        Some(result) => Ok(ResultShape::of(result)),
        None => Err(Error::ContractViolation("None".to_string())),
    }
}
