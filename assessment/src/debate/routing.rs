//! Moderator output handling and the post-moderator router.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::state::DebateState;

/// Literal marker that turns a moderator message into a verdict.
pub const VERDICT_MARKER: &str = "VERDICT:";

/// Where the graph goes after the moderator node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebateRoute {
    /// Another advocate/skeptic/moderator round.
    Advocate,
    /// Score the final message.
    Conclude,
}

pub fn contains_verdict(text: &str) -> bool {
    text.contains(VERDICT_MARKER)
}

/// Conclude on a verdict OR once `iteration` has passed `max_iterations`.
pub fn route_after_moderator(state: &DebateState) -> DebateRoute {
    let verdict = state
        .transcript
        .last()
        .is_some_and(|entry| contains_verdict(&entry.text));

    if verdict || state.iteration > state.max_iterations {
        DebateRoute::Conclude
    } else {
        DebateRoute::Advocate
    }
}

/// Structured moderator turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ModeratorRuling {
    /// Summary of both sides plus a probing question when the debate continues.
    pub synthesis: String,
    /// Final verdict; present only when the debate should end.
    #[serde(default)]
    pub verdict: Option<String>,
}

impl ModeratorRuling {
    /// Text form stored in the transcript.
    pub fn into_message(self) -> String {
        match self.verdict {
            Some(verdict) if !verdict.trim().is_empty() => {
                format!("{}\n\n{VERDICT_MARKER} {}", self.synthesis.trim(), verdict.trim())
            }
            _ => self.synthesis,
        }
    }
}
