//! Debate state machine: phases, transitions, and the role-tagged transcript.

use serde::{Deserialize, Serialize};

use super::metric::EvaluationMetric;
use crate::score::ScoreRecord;

/// Default number of moderated rounds before the ceiling applies.
pub const DEFAULT_MAX_ITERATIONS: u32 = 3;

/// Phase of a debate run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebatePhase {
    /// Created but not started.
    Idle,
    /// Advocate is defending the idea.
    Advocate,
    /// Skeptic is attacking the idea.
    Skeptic,
    /// Moderator is synthesising the round.
    Moderator,
    /// Final message is being converted into scores.
    Scoring,
    /// Scores recorded.
    Done,
}

impl DebatePhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done)
    }

    /// Valid transitions from this phase.
    pub fn valid_transitions(self) -> &'static [DebatePhase] {
        match self {
            Self::Idle => &[Self::Advocate],
            Self::Advocate => &[Self::Skeptic],
            Self::Skeptic => &[Self::Moderator],
            Self::Moderator => &[Self::Advocate, Self::Scoring],
            Self::Scoring => &[Self::Done],
            Self::Done => &[],
        }
    }
}

impl std::fmt::Display for DebatePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Advocate => write!(f, "advocate"),
            Self::Skeptic => write!(f, "skeptic"),
            Self::Moderator => write!(f, "moderator"),
            Self::Scoring => write!(f, "scoring"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// Role that produced a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DebateRole {
    Advocate,
    Skeptic,
    Moderator,
}

impl DebateRole {
    /// Phase in which this role speaks.
    pub fn phase(self) -> DebatePhase {
        match self {
            Self::Advocate => DebatePhase::Advocate,
            Self::Skeptic => DebatePhase::Skeptic,
            Self::Moderator => DebatePhase::Moderator,
        }
    }
}

impl std::fmt::Display for DebateRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Advocate => write!(f, "Advocate"),
            Self::Skeptic => write!(f, "Skeptic"),
            Self::Moderator => write!(f, "Moderator"),
        }
    }
}

/// One message of the debate, kept exactly as produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: DebateRole,
    pub text: String,
}

impl TranscriptEntry {
    /// `"<Role>: <text>"`, the form fed back into prompts.
    pub fn rendered(&self) -> String {
        format!("{}: {}", self.role, self.text)
    }
}

/// Error for invalid state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionError {
    pub from: DebatePhase,
    pub to: DebatePhase,
}

impl std::fmt::Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid debate transition {} → {} (allowed: {:?})",
            self.from,
            self.to,
            self.from.valid_transitions()
        )
    }
}

impl std::error::Error for TransitionError {}

/// Accumulating state of one debate run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateState {
    pub idea: String,
    pub literature: String,
    pub metric: EvaluationMetric,
    /// Append-only transcript.
    pub transcript: Vec<TranscriptEntry>,
    /// Completed moderator turns.
    pub iteration: u32,
    pub max_iterations: u32,
    pub phase: DebatePhase,
    /// Phase visit order.
    pub transitions: Vec<DebatePhase>,
    pub scores: Option<ScoreRecord>,
}

impl DebateState {
    pub fn new(
        idea: impl Into<String>,
        literature: impl Into<String>,
        metric: EvaluationMetric,
        max_iterations: u32,
    ) -> Self {
        Self {
            idea: idea.into(),
            literature: literature.into(),
            metric,
            transcript: Vec::new(),
            iteration: 0,
            max_iterations,
            phase: DebatePhase::Idle,
            transitions: Vec::new(),
            scores: None,
        }
    }

    /// Move to `to` if the phase graph allows it.
    pub fn enter(&mut self, to: DebatePhase) -> Result<(), TransitionError> {
        if !self.phase.valid_transitions().contains(&to) {
            return Err(TransitionError {
                from: self.phase,
                to,
            });
        }
        self.transitions.push(to);
        self.phase = to;
        Ok(())
    }

    /// Append a turn for the role whose phase is current.
    ///
    /// A moderator turn always closes a round and bumps `iteration`.
    pub fn record_turn(&mut self, role: DebateRole, text: impl Into<String>) -> Result<(), TransitionError> {
        if self.phase != role.phase() {
            return Err(TransitionError {
                from: self.phase,
                to: role.phase(),
            });
        }
        self.transcript.push(TranscriptEntry {
            role,
            text: text.into(),
        });
        if role == DebateRole::Moderator {
            self.iteration += 1;
        }
        Ok(())
    }

    /// Record scores and finish.
    pub fn record_scores(&mut self, scores: ScoreRecord) -> Result<(), TransitionError> {
        self.enter(DebatePhase::Done)?;
        self.scores = Some(scores);
        Ok(())
    }

    /// Full transcript as role-tagged lines.
    pub fn history(&self) -> String {
        self.transcript
            .iter()
            .map(TranscriptEntry::rendered)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Last transcript entry in rendered form; this is all the scorer sees.
    pub fn final_message(&self) -> Option<String> {
        self.transcript.last().map(TranscriptEntry::rendered)
    }

    /// Most recent moderator entry.
    pub fn last_moderator(&self) -> Option<&TranscriptEntry> {
        self.transcript
            .iter()
            .rev()
            .find(|e| e.role == DebateRole::Moderator)
    }

    pub fn is_complete(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Compact status line.
    pub fn status_line(&self) -> String {
        format!(
            "[{}] {} round {}/{} | {} messages",
            self.phase,
            self.metric,
            self.iteration,
            self.max_iterations,
            self.transcript.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_state() -> DebateState {
        DebateState::new("idea", "papers", EvaluationMetric::Novelty, DEFAULT_MAX_ITERATIONS)
    }

    fn run_round(state: &mut DebateState, moderator: &str) {
        state.enter(DebatePhase::Advocate).unwrap();
        state.record_turn(DebateRole::Advocate, "it is new").unwrap();
        state.enter(DebatePhase::Skeptic).unwrap();
        state.record_turn(DebateRole::Skeptic, "it is not").unwrap();
        state.enter(DebatePhase::Moderator).unwrap();
        state.record_turn(DebateRole::Moderator, moderator).unwrap();
    }

    #[test]
    fn test_new_state() {
        let state = new_state();
        assert_eq!(state.phase, DebatePhase::Idle);
        assert_eq!(state.iteration, 0);
        assert_eq!(state.max_iterations, 3);
        assert!(!state.is_complete());
    }

    #[test]
    fn test_round_increments_once() {
        let mut state = new_state();
        run_round(&mut state, "Why is it new?");
        assert_eq!(state.iteration, 1);
        assert_eq!(state.transcript.len(), 3);
        run_round(&mut state, "VERDICT: novel");
        assert_eq!(state.iteration, 2);
    }

    #[test]
    fn test_history_is_role_tagged() {
        let mut state = new_state();
        run_round(&mut state, "question");
        assert_eq!(
            state.history(),
            "Advocate: it is new\nSkeptic: it is not\nModerator: question"
        );
        assert_eq!(state.final_message().as_deref(), Some("Moderator: question"));
    }

    #[test]
    fn test_invalid_transition() {
        let mut state = new_state();
        let err = state.enter(DebatePhase::Moderator).unwrap_err();
        assert_eq!(err.from, DebatePhase::Idle);
        assert_eq!(err.to, DebatePhase::Moderator);
    }

    #[test]
    fn test_turn_out_of_phase() {
        let mut state = new_state();
        state.enter(DebatePhase::Advocate).unwrap();
        assert!(state.record_turn(DebateRole::Skeptic, "early").is_err());
        assert!(state.transcript.is_empty());
    }

    #[test]
    fn test_terminal_no_transitions() {
        let mut state = new_state();
        run_round(&mut state, "VERDICT: ok");
        state.enter(DebatePhase::Scoring).unwrap();
        state.record_scores(ScoreRecord::default()).unwrap();
        assert!(state.is_complete());
        assert!(state.enter(DebatePhase::Advocate).is_err());
    }

    #[test]
    fn test_transition_history() {
        let mut state = new_state();
        run_round(&mut state, "q");
        assert_eq!(
            state.transitions,
            vec![DebatePhase::Advocate, DebatePhase::Skeptic, DebatePhase::Moderator]
        );
    }

    #[test]
    fn test_status_line() {
        let mut state = new_state();
        run_round(&mut state, "q");
        assert_eq!(state.status_line(), "[moderator] novelty round 1/3 | 3 messages");
    }
}
