//! Linear evaluation state: plan, append-only findings and confidence.

use serde::{Deserialize, Serialize};

use super::decision::{InvestigationDecision, OracleSignal, ReflectionReport};
use super::routing::{next_action_for, LinearPolicy};
use crate::score::ScoreRecord;

/// Self-reported confidence (0-100 contract) after a reflection round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Confidence {
    pub novelty: u32,
    pub feasibility: u32,
    pub overall: u32,
}

impl Default for Confidence {
    fn default() -> Self {
        Self {
            novelty: 50,
            feasibility: 50,
            overall: 50,
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "novelty={} feasibility={} overall={}",
            self.novelty, self.feasibility, self.overall
        )
    }
}

/// Routing hint written by each node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextAction {
    Start,
    Investigate,
    Reflect,
    Conclude,
}

impl std::fmt::Display for NextAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Investigate => write!(f, "investigate"),
            Self::Reflect => write!(f, "reflect"),
            Self::Conclude => write!(f, "conclude"),
        }
    }
}

/// Nodes of the linear graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinearNode {
    Planning,
    Investigation,
    Reflection,
    Scoring,
}

impl std::fmt::Display for LinearNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Planning => write!(f, "planning"),
            Self::Investigation => write!(f, "investigation"),
            Self::Reflection => write!(f, "reflection"),
            Self::Scoring => write!(f, "scoring"),
        }
    }
}

/// Accumulating state of one linear evaluation run.
///
/// `proposal` and `literature` never change after construction; `findings`
/// only grows; `iteration` only increases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationState {
    pub proposal: String,
    pub literature: String,
    pub plan: String,
    pub findings: Vec<String>,
    pub confidence: Confidence,
    pub iteration: u32,
    pub next_action: NextAction,
    /// Set once the investigation step declines to run a tool.
    pub investigation_concluded: bool,
    /// Latest CONTINUE/CONCLUDE the oracle volunteered during reflection.
    pub oracle_signal: Option<OracleSignal>,
    /// Node visit order.
    pub transitions: Vec<LinearNode>,
    pub scores: Option<ScoreRecord>,
}

impl EvaluationState {
    pub fn new(proposal: impl Into<String>, literature: impl Into<String>) -> Self {
        Self {
            proposal: proposal.into(),
            literature: literature.into(),
            plan: String::new(),
            findings: Vec::new(),
            confidence: Confidence::default(),
            iteration: 0,
            next_action: NextAction::Start,
            investigation_concluded: false,
            oracle_signal: None,
            transitions: Vec::new(),
            scores: None,
        }
    }

    /// Planning node effect: store the plan and arm the loop.
    pub fn record_plan(&mut self, plan: impl Into<String>) {
        self.transitions.push(LinearNode::Planning);
        self.plan = plan.into();
        self.iteration = 0;
        self.next_action = NextAction::Investigate;
    }

    /// Investigation node effect.
    ///
    /// Any decision other than `Conclude` appends exactly one finding and
    /// advances the iteration counter by one.
    pub fn apply_investigation(&mut self, decision: &InvestigationDecision) {
        self.transitions.push(LinearNode::Investigation);
        match decision.finding(&self.literature) {
            Some(finding) => {
                self.findings.push(finding);
                self.iteration += 1;
                self.next_action = NextAction::Reflect;
            }
            None => {
                self.investigation_concluded = true;
                self.next_action = NextAction::Conclude;
            }
        }
    }

    /// Reflection node effect: overwrite confidence and pick the next action
    /// from the threshold, whatever the oracle itself asked for.
    pub fn apply_reflection(&mut self, report: &ReflectionReport, policy: &LinearPolicy) {
        self.transitions.push(LinearNode::Reflection);
        self.confidence = report.confidence;
        self.oracle_signal = report.signal;
        self.next_action = next_action_for(&self.confidence, policy);
    }

    /// Scoring node effect.
    pub fn record_scores(&mut self, scores: ScoreRecord) {
        self.transitions.push(LinearNode::Scoring);
        self.scores = Some(scores);
        self.next_action = NextAction::Conclude;
    }

    /// Whether the oracle's own signal disagrees with the routed action.
    pub fn signal_overridden(&self) -> bool {
        match self.oracle_signal {
            Some(OracleSignal::Continue) => self.next_action == NextAction::Conclude,
            Some(OracleSignal::Conclude) => self.next_action == NextAction::Investigate,
            None => false,
        }
    }

    /// Compact status line.
    pub fn status_line(&self) -> String {
        format!(
            "[{}] iteration {} | {} findings | {}",
            self.next_action,
            self.iteration,
            self.findings.len(),
            self.confidence
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolKind;

    fn state() -> EvaluationState {
        let mut s = EvaluationState::new("X", "");
        s.record_plan("1. look at overlaps");
        s
    }

    #[test]
    fn test_plan_arms_loop() {
        let s = state();
        assert_eq!(s.iteration, 0);
        assert_eq!(s.next_action, NextAction::Investigate);
        assert_eq!(s.transitions, vec![LinearNode::Planning]);
    }

    #[test]
    fn test_investigation_appends_in_order() {
        let mut s = state();
        s.apply_investigation(&InvestigationDecision::Invoke(ToolKind::AnalyzePapers.call("a")));
        s.apply_investigation(&InvestigationDecision::InvalidParameters);
        assert_eq!(s.iteration, 2);
        assert_eq!(s.findings.len(), 2);
        assert!(s.findings[0].contains("'a'"));
        assert_eq!(s.findings[1], "Tool execution failed - invalid parameters");
        assert_eq!(s.next_action, NextAction::Reflect);
    }

    #[test]
    fn test_investigation_conclude_keeps_counter() {
        let mut s = state();
        s.apply_investigation(&InvestigationDecision::Conclude);
        assert_eq!(s.iteration, 0);
        assert!(s.findings.is_empty());
        assert!(s.investigation_concluded);
        assert_eq!(s.next_action, NextAction::Conclude);
    }

    #[test]
    fn test_reflection_overrides_signal() {
        let mut s = state();
        let report = ReflectionReport::parse("40 40 40\nCONCLUDE");
        s.apply_reflection(&report, &LinearPolicy::default());
        assert_eq!(s.next_action, NextAction::Investigate);
        assert!(s.signal_overridden());
    }

    #[test]
    fn test_status_line() {
        let s = state();
        assert_eq!(
            s.status_line(),
            "[investigate] iteration 0 | 0 findings | novelty=50 feasibility=50 overall=50"
        );
    }
}
