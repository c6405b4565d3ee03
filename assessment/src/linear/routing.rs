//! Routing after reflection: hard iteration ceiling first, then the
//! confidence-derived next action.

use serde::{Deserialize, Serialize};

use super::state::{Confidence, EvaluationState, NextAction};

/// Iterations after which the linear loop always concludes.
pub const DEFAULT_MAX_ITERATIONS: u32 = 4;
/// Overall confidence at or above which investigation stops.
pub const DEFAULT_CONFIDENCE_THRESHOLD: u32 = 75;

/// Termination policy for the linear loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearPolicy {
    pub max_iterations: u32,
    pub confidence_threshold: u32,
}

impl Default for LinearPolicy {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

/// Where the graph goes after the reflection node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinearRoute {
    Investigate,
    Conclude,
}

/// Threshold rule applied by the reflection node.
pub fn next_action_for(confidence: &Confidence, policy: &LinearPolicy) -> NextAction {
    if confidence.overall < policy.confidence_threshold {
        NextAction::Investigate
    } else {
        NextAction::Conclude
    }
}

/// Router applied after each reflection.
pub fn route_after_reflection(state: &EvaluationState, policy: &LinearPolicy) -> LinearRoute {
    if state.iteration >= policy.max_iterations || state.investigation_concluded {
        return LinearRoute::Conclude;
    }
    match state.next_action {
        NextAction::Conclude => LinearRoute::Conclude,
        NextAction::Start | NextAction::Investigate | NextAction::Reflect => {
            LinearRoute::Investigate
        }
    }
}
