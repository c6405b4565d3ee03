//! Evaluation metrics a debate can be run on.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One independent evaluation dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationMetric {
    Novelty,
    Feasibility,
    Interestingness,
}

impl EvaluationMetric {
    pub const ALL: [EvaluationMetric; 3] = [Self::Novelty, Self::Feasibility, Self::Interestingness];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Novelty => "novelty",
            Self::Feasibility => "feasibility",
            Self::Interestingness => "interestingness",
        }
    }

    /// Capitalised label for status lines.
    pub fn label(self) -> &'static str {
        match self {
            Self::Novelty => "Novelty",
            Self::Feasibility => "Feasibility",
            Self::Interestingness => "Interestingness",
        }
    }
}

impl std::fmt::Display for EvaluationMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised metric name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown evaluation metric `{0}` (expected novelty, feasibility or interestingness)")]
pub struct UnknownMetric(pub String);

impl FromStr for EvaluationMetric {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "novelty" => Ok(Self::Novelty),
            "feasibility" => Ok(Self::Feasibility),
            "interestingness" => Ok(Self::Interestingness),
            other => Err(UnknownMetric(other.to_string())),
        }
    }
}
