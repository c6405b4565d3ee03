//! Shared graph-runner trait and the step driver.
//!
//! Both evaluators implement [`GraphRunner`]: one `step` executes exactly one
//! node (at most one oracle call) and advances the cursor. [`drive`] loops
//! until a runner reports [`StepResult::Done`].
//!
//! ## Lifecycle
//!
//! ```text
//! drive(runner, oracle, max_steps)
//!   → loop:
//!       runner.step(oracle)   : run one node, mutating the run state
//!       check step budget
//!   → runner.into_state()     : terminal state, scores included
//! ```
//!
//! Every run owns its state outright. Nothing outlives a single call.

use async_trait::async_trait;
use tracing::{debug, error, info};

use assessment::literature::{count_papers, prepare_for_reasoning, RawPapers};

use crate::errors::EvaluationError;
use crate::oracle::ReasoningOracle;
use crate::prompts::PROMPT_VERSION;

// ── Request ──────────────────────────────────────────────────────────────────

/// Immutable input of one evaluation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationRequest {
    /// The research proposal or idea under evaluation.
    pub proposal: String,
    /// Formatted literature text (deduplicated paper blocks).
    pub literature: String,
    /// Human-readable label for logs and persisted rows.
    pub label: String,
}

impl EvaluationRequest {
    /// Build a request from raw papers, formatting them once.
    pub fn new(proposal: impl Into<String>, papers: &RawPapers) -> Self {
        Self::from_literature(proposal, prepare_for_reasoning(papers))
    }

    /// Build a request from already-formatted literature text.
    pub fn from_literature(proposal: impl Into<String>, literature: impl Into<String>) -> Self {
        Self {
            proposal: proposal.into(),
            literature: literature.into(),
            label: String::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn paper_count(&self) -> usize {
        count_papers(&self.literature)
    }
}

// ── StepResult ───────────────────────────────────────────────────────────────

/// Return value from a single [`GraphRunner::step`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// More nodes to run.
    Continue,
    /// Terminal node finished.
    Done,
}

// ── GraphRunner trait ────────────────────────────────────────────────────────

#[async_trait]
pub trait GraphRunner: Send {
    /// Terminal state type handed back to the caller.
    type State: Send;

    /// Runner name for logging (`"linear"`, `"debate"`).
    fn name(&self) -> &'static str;

    /// Node the next `step` will run, for logging.
    fn current_node(&self) -> String;

    /// Upper bound on steps for a well-behaved run of this graph.
    fn step_budget(&self) -> u32;

    /// Execute one node.
    async fn step(&mut self, oracle: &dyn ReasoningOracle) -> Result<StepResult, EvaluationError>;

    fn into_state(self) -> Self::State
    where
        Self: Sized;
}

// ── Driver ───────────────────────────────────────────────────────────────────

/// Run `runner` to completion or until `max_steps` nodes have executed.
///
/// Any step error ends the run; nothing is retried.
pub async fn drive<R>(
    mut runner: R,
    oracle: &dyn ReasoningOracle,
    max_steps: u32,
) -> Result<R::State, EvaluationError>
where
    R: GraphRunner,
{
    info!(runner = runner.name(), prompt_version = PROMPT_VERSION, "evaluation run starting");

    let mut steps: u32 = 0;
    loop {
        if steps >= max_steps {
            error!(runner = runner.name(), steps, "step budget exhausted");
            return Err(EvaluationError::StepBudgetExhausted {
                runner: runner.name(),
                budget: max_steps,
            });
        }

        let node = runner.current_node();
        steps += 1;
        debug!(runner = runner.name(), node = %node, step = steps, "running node");

        match runner.step(oracle).await {
            Ok(StepResult::Continue) => {}
            Ok(StepResult::Done) => {
                info!(runner = runner.name(), steps, "evaluation run complete");
                return Ok(runner.into_state());
            }
            Err(e) => {
                error!(runner = runner.name(), node = %node, error = %e, "evaluation run failed");
                return Err(e);
            }
        }
    }
}
