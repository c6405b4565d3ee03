//! Linear evaluator: plan → investigate → reflect, then score.
//!
//! ```text
//! Planning → Investigation → Reflection ─┬─ investigate → Investigation
//!                                        └─ conclude    → Scoring → Done
//! ```
//!
//! Investigation and reflection replies go through total parsers, so a
//! malformed reply degrades to a safe default instead of failing the run.
//! Only the scoring call can fail the run.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use assessment::linear::{
    route_after_reflection, ConfidenceReport, EvaluationState, InvestigationChoice,
    InvestigationDecision, LinearNode, LinearPolicy, LinearRoute, ReflectionReport,
};
use assessment::score::ScoreRecord;

use crate::config::{DecisionMode, EvaluatorConfig};
use crate::errors::EvaluationError;
use crate::oracle::{infer_structured, ReasoningOracle};
use crate::prompts;
use crate::runner::{drive, EvaluationRequest, GraphRunner, StepResult};

/// Drives one [`EvaluationState`] through the linear graph.
pub struct LinearEvaluator {
    state: EvaluationState,
    policy: LinearPolicy,
    mode: DecisionMode,
    /// Next node to run; `None` once scoring has finished.
    cursor: Option<LinearNode>,
}

impl LinearEvaluator {
    pub fn new(request: &EvaluationRequest, policy: LinearPolicy, mode: DecisionMode) -> Self {
        Self {
            state: EvaluationState::new(&request.proposal, &request.literature),
            policy,
            mode,
            cursor: Some(LinearNode::Planning),
        }
    }

    pub fn state(&self) -> &EvaluationState {
        &self.state
    }

    // ── Nodes ────────────────────────────────────────────────────────────

    async fn plan(&mut self, oracle: &dyn ReasoningOracle) -> Result<LinearNode, EvaluationError> {
        let papers = assessment::literature::count_papers(&self.state.literature);
        let plan = oracle
            .infer(&prompts::planning(&self.state.proposal, papers))
            .await?;
        self.state.record_plan(plan.trim());
        debug!(papers, plan_chars = self.state.plan.len(), "plan recorded");
        Ok(LinearNode::Investigation)
    }

    async fn investigate(&mut self, oracle: &dyn ReasoningOracle) -> Result<LinearNode, EvaluationError> {
        let decision = match self.mode {
            DecisionMode::FreeText => {
                let prompt = prompts::investigation(&self.state.plan, &self.state.findings, self.state.iteration);
                InvestigationDecision::parse(&oracle.infer(&prompt).await?)
            }
            DecisionMode::Structured => {
                let prompt =
                    prompts::investigation_structured(&self.state.plan, &self.state.findings, self.state.iteration);
                match infer_structured::<InvestigationChoice>(oracle, &prompt).await {
                    Ok(choice) => choice.into(),
                    Err(e) if e.is_structured_output() => {
                        warn!(error = %e, "unusable investigation choice; recording invalid parameters");
                        InvestigationDecision::InvalidParameters
                    }
                    Err(e) => return Err(e),
                }
            }
        };

        match &decision {
            InvestigationDecision::Invoke(call) => {
                info!(iteration = self.state.iteration + 1, tool = %call.kind(), parameter = call.parameter(), "running tool")
            }
            InvestigationDecision::UnknownTool { name, .. } => {
                warn!(iteration = self.state.iteration + 1, tool = %name, "unknown tool requested")
            }
            InvestigationDecision::InvalidParameters => {
                warn!(iteration = self.state.iteration + 1, "tool request without parameters")
            }
            InvestigationDecision::Conclude => info!(iteration = self.state.iteration, "investigation concluded"),
        }

        self.state.apply_investigation(&decision);
        Ok(LinearNode::Reflection)
    }

    async fn reflect(&mut self, oracle: &dyn ReasoningOracle) -> Result<LinearNode, EvaluationError> {
        let report = match self.mode {
            DecisionMode::FreeText => {
                let prompt = prompts::reflection(&self.state.findings, self.state.iteration);
                ReflectionReport::parse(&oracle.infer(&prompt).await?)
            }
            DecisionMode::Structured => {
                let prompt = prompts::reflection_structured(&self.state.findings, self.state.iteration);
                match infer_structured::<ConfidenceReport>(oracle, &prompt).await {
                    Ok(report) => report.into(),
                    Err(e) if e.is_structured_output() => {
                        warn!(error = %e, "unusable confidence report; using defaults");
                        ReflectionReport::parse("")
                    }
                    Err(e) => return Err(e),
                }
            }
        };

        self.state.apply_reflection(&report, &self.policy);
        if self.state.signal_overridden() {
            info!(
                signal = ?self.state.oracle_signal,
                next = %self.state.next_action,
                "confidence threshold overrides oracle signal"
            );
        }

        let route = route_after_reflection(&self.state, &self.policy);
        debug!(status = %self.state.status_line(), route = ?route, "reflection routed");
        Ok(match route {
            LinearRoute::Investigate => LinearNode::Investigation,
            LinearRoute::Conclude => LinearNode::Scoring,
        })
    }

    async fn score(&mut self, oracle: &dyn ReasoningOracle) -> Result<(), EvaluationError> {
        let prompt = prompts::linear_scoring(&self.state.findings, &self.state.confidence.to_string());
        let scores = infer_structured::<ScoreRecord>(oracle, &prompt).await?;

        let out_of_range = scores.out_of_range_fields();
        if !out_of_range.is_empty() {
            warn!(fields = ?out_of_range, "scores outside 1-10");
        }
        info!(
            novelty = scores.novelty_score,
            feasibility = scores.feasibility_score,
            impact = scores.impact_score,
            recommendation = %scores.recommendation,
            "linear scores recorded"
        );
        self.state.record_scores(scores);
        Ok(())
    }
}

#[async_trait]
impl GraphRunner for LinearEvaluator {
    type State = EvaluationState;

    fn name(&self) -> &'static str {
        "linear"
    }

    fn current_node(&self) -> String {
        self.cursor.map_or_else(|| "done".to_string(), |node| node.to_string())
    }

    /// Planning, two nodes per iteration, scoring.
    fn step_budget(&self) -> u32 {
        self.policy.max_iterations.saturating_mul(2).saturating_add(2)
    }

    async fn step(&mut self, oracle: &dyn ReasoningOracle) -> Result<StepResult, EvaluationError> {
        let Some(node) = self.cursor else {
            return Ok(StepResult::Done);
        };

        self.cursor = match node {
            LinearNode::Planning => Some(self.plan(oracle).await?),
            LinearNode::Investigation => Some(self.investigate(oracle).await?),
            LinearNode::Reflection => Some(self.reflect(oracle).await?),
            LinearNode::Scoring => {
                self.score(oracle).await?;
                None
            }
        };

        Ok(match self.cursor {
            Some(_) => StepResult::Continue,
            None => StepResult::Done,
        })
    }

    fn into_state(self) -> EvaluationState {
        self.state
    }
}

/// Run one linear evaluation to its terminal state.
pub async fn run_linear(
    request: &EvaluationRequest,
    oracle: &dyn ReasoningOracle,
    config: &EvaluatorConfig,
) -> Result<EvaluationState, EvaluationError> {
    info!(
        label = %request.label,
        papers = request.paper_count(),
        mode = %config.decision_mode,
        "linear evaluation"
    );
    let evaluator = LinearEvaluator::new(request, config.linear, config.decision_mode);
    let budget = evaluator.step_budget();
    drive(evaluator, oracle, budget).await
}
