//! Score record produced at the end of every evaluation run.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Lowest rating the scoring prompt asks for.
pub const SCORE_MIN: i64 = 1;
/// Highest rating the scoring prompt asks for.
pub const SCORE_MAX: i64 = 10;

/// Final evaluation scores produced by the oracle.
///
/// Ratings are asked for on a 1-10 scale but are stored as given; use
/// [`ScoreRecord::out_of_range_fields`] to see which ones strayed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ScoreRecord {
    /// How new or original the idea is compared to the retrieved papers (1-10).
    pub novelty_score: i64,
    /// How realistic implementation is based on similar work (1-10).
    pub feasibility_score: i64,
    /// Potential significance of results (1-10).
    pub impact_score: i64,
    /// Brief reasoning behind the recommendation.
    pub summary: String,
    /// One of Accept, Revise, Reject.
    pub recommendation: String,
}

impl ScoreRecord {
    /// The recommendation if it names one of the three expected outcomes.
    pub fn recommendation_kind(&self) -> Option<Recommendation> {
        Recommendation::parse(&self.recommendation)
    }

    /// Names of rating fields outside the 1-10 contract.
    pub fn out_of_range_fields(&self) -> Vec<&'static str> {
        [
            ("novelty_score", self.novelty_score),
            ("feasibility_score", self.feasibility_score),
            ("impact_score", self.impact_score),
        ]
        .into_iter()
        .filter(|(_, v)| !(SCORE_MIN..=SCORE_MAX).contains(v))
        .map(|(name, _)| name)
        .collect()
    }
}

/// Expected recommendation outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    Accept,
    Revise,
    Reject,
}

impl Recommendation {
    /// Lenient match: case-insensitive, tolerates surrounding punctuation and
    /// a trailing explanation (`"Revise - needs baselines"`).
    pub fn parse(raw: &str) -> Option<Self> {
        let head = raw
            .trim()
            .trim_start_matches(|c: char| !c.is_alphabetic())
            .split(|c: char| !c.is_alphabetic())
            .next()?
            .to_ascii_lowercase();
        match head.as_str() {
            "accept" | "accepted" => Some(Self::Accept),
            "revise" | "revision" => Some(Self::Revise),
            "reject" | "rejected" => Some(Self::Reject),
            _ => None,
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accept => write!(f, "Accept"),
            Self::Revise => write!(f, "Revise"),
            Self::Reject => write!(f, "Reject"),
        }
    }
}
