//! Debate evaluator: advocate → skeptic → moderator rounds on one metric.
//!
//! ```text
//! Advocate → Skeptic → Moderator ─┬─ no verdict, within ceiling → Advocate
//!                                 └─ VERDICT: or past ceiling    → Scoring → Done
//! ```
//!
//! Each turn sees the idea, the literature and the full role-tagged history.
//! Scoring sees only the moderator's final message.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use assessment::debate::{
    route_after_moderator, DebatePhase, DebateRole, DebateRoute, DebateState, EvaluationMetric,
    ModeratorRuling,
};
use assessment::score::ScoreRecord;

use crate::config::{DecisionMode, EvaluatorConfig};
use crate::errors::EvaluationError;
use crate::oracle::{infer_structured, ReasoningOracle};
use crate::prompts;
use crate::runner::{drive, EvaluationRequest, GraphRunner, StepResult};

/// Drives one [`DebateState`] through the debate graph.
pub struct DebateEvaluator {
    state: DebateState,
    mode: DecisionMode,
}

impl DebateEvaluator {
    pub fn new(
        request: &EvaluationRequest,
        metric: EvaluationMetric,
        max_iterations: u32,
        mode: DecisionMode,
    ) -> Self {
        Self {
            state: DebateState::new(&request.proposal, &request.literature, metric, max_iterations),
            mode,
        }
    }

    pub fn state(&self) -> &DebateState {
        &self.state
    }

    /// Phase the next step will run.
    fn next_phase(&self) -> DebatePhase {
        match self.state.phase {
            DebatePhase::Idle => DebatePhase::Advocate,
            DebatePhase::Advocate => DebatePhase::Skeptic,
            DebatePhase::Skeptic => DebatePhase::Moderator,
            DebatePhase::Moderator => match route_after_moderator(&self.state) {
                DebateRoute::Advocate => DebatePhase::Advocate,
                DebateRoute::Conclude => DebatePhase::Scoring,
            },
            DebatePhase::Scoring => DebatePhase::Done,
            DebatePhase::Done => DebatePhase::Done,
        }
    }

    // ── Nodes ────────────────────────────────────────────────────────────

    /// Advocate or skeptic turn.
    async fn argue(&mut self, role: DebateRole, oracle: &dyn ReasoningOracle) -> Result<(), EvaluationError> {
        let state = &self.state;
        let history = state.history();
        let prompt = if role == DebateRole::Advocate {
            prompts::advocate(state.metric, &state.idea, &state.literature, &history)
        } else {
            prompts::skeptic(state.metric, &state.idea, &state.literature, &history)
        };

        let reply = oracle.infer(&prompt).await?;
        self.state.record_turn(role, reply.trim())?;
        debug!(metric = %self.state.metric, role = %role, round = self.state.iteration + 1, "turn recorded");
        Ok(())
    }

    async fn moderate(&mut self, oracle: &dyn ReasoningOracle) -> Result<(), EvaluationError> {
        let state = &self.state;
        let history = state.history();
        let message = match self.mode {
            DecisionMode::FreeText => {
                let prompt = prompts::moderator(
                    state.metric,
                    &state.idea,
                    &state.literature,
                    &history,
                    state.iteration,
                    state.max_iterations,
                );
                oracle.infer(&prompt).await?.trim().to_string()
            }
            DecisionMode::Structured => {
                let prompt = prompts::moderator_structured(
                    state.metric,
                    &state.idea,
                    &state.literature,
                    &history,
                    state.iteration,
                    state.max_iterations,
                );
                match infer_structured::<ModeratorRuling>(oracle, &prompt).await {
                    Ok(ruling) => ruling.into_message(),
                    Err(e) if e.is_structured_output() => {
                        // The round still counts; the ceiling keeps the debate bounded.
                        warn!(metric = %state.metric, error = %e, "unusable moderator ruling; continuing without verdict");
                        String::from("The moderator could not produce a ruling this round.")
                    }
                    Err(e) => return Err(e),
                }
            }
        };

        self.state.record_turn(DebateRole::Moderator, message)?;
        info!(status = %self.state.status_line(), "round closed");
        Ok(())
    }

    async fn score(&mut self, oracle: &dyn ReasoningOracle) -> Result<(), EvaluationError> {
        let final_message = self.state.final_message().unwrap_or_default();
        let prompt = prompts::debate_scoring(self.state.metric, &final_message);
        let scores = infer_structured::<ScoreRecord>(oracle, &prompt).await?;

        let out_of_range = scores.out_of_range_fields();
        if !out_of_range.is_empty() {
            warn!(metric = %self.state.metric, fields = ?out_of_range, "scores outside 1-10");
        }
        info!(
            metric = %self.state.metric,
            rounds = self.state.iteration,
            novelty = scores.novelty_score,
            feasibility = scores.feasibility_score,
            impact = scores.impact_score,
            recommendation = %scores.recommendation,
            "debate scores recorded"
        );
        self.state.record_scores(scores)?;
        Ok(())
    }
}

#[async_trait]
impl GraphRunner for DebateEvaluator {
    type State = DebateState;

    fn name(&self) -> &'static str {
        "debate"
    }

    fn current_node(&self) -> String {
        format!("{}:{}", self.state.metric, self.next_phase())
    }

    /// Three turns per round for `max_iterations + 1` rounds, then scoring.
    fn step_budget(&self) -> u32 {
        self.state
            .max_iterations
            .saturating_add(1)
            .saturating_mul(3)
            .saturating_add(1)
    }

    async fn step(&mut self, oracle: &dyn ReasoningOracle) -> Result<StepResult, EvaluationError> {
        let phase = self.next_phase();
        if self.state.is_complete() {
            return Ok(StepResult::Done);
        }
        self.state.enter(phase)?;

        match phase {
            DebatePhase::Advocate => self.argue(DebateRole::Advocate, oracle).await?,
            DebatePhase::Skeptic => self.argue(DebateRole::Skeptic, oracle).await?,
            DebatePhase::Moderator => self.moderate(oracle).await?,
            DebatePhase::Scoring => {
                self.score(oracle).await?;
                return Ok(StepResult::Done);
            }
            DebatePhase::Idle | DebatePhase::Done => {}
        }
        Ok(StepResult::Continue)
    }

    fn into_state(self) -> DebateState {
        self.state
    }
}

/// Run one debate on `metric` to its terminal state.
pub async fn run_debate(
    request: &EvaluationRequest,
    metric: EvaluationMetric,
    oracle: &dyn ReasoningOracle,
    config: &EvaluatorConfig,
) -> Result<DebateState, EvaluationError> {
    info!(
        label = %request.label,
        metric = %metric,
        papers = request.paper_count(),
        max_iterations = config.debate_max_iterations,
        "debate evaluation"
    );
    let evaluator = DebateEvaluator::new(request, metric, config.debate_max_iterations, config.decision_mode);
    let budget = evaluator.step_budget();
    drive(evaluator, oracle, budget).await
}
