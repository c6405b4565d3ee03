//! Metric panel: one independent debate per metric, run concurrently.
//!
//! ```text
//! evaluate_metrics(request, [novelty, feasibility, interestingness])
//!   → JoinSet::spawn(run_debate(metric_i)) × N   (Semaphore-guarded)
//!   → collect into BTreeMap<metric, MetricOutcome>
//! ```
//!
//! ## Partial failure policy
//!
//! Every requested metric starts out as `Failed` and is overwritten when its
//! worker reports. A worker that errors or panics therefore leaves exactly
//! its own metric failed; siblings are collected as usual.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use assessment::debate::{DebateState, EvaluationMetric};
use assessment::score::ScoreRecord;

use crate::config::EvaluatorConfig;
use crate::debate::run_debate;
use crate::oracle::ReasoningOracle;
use crate::runner::EvaluationRequest;

const NO_REPORT: &str = "worker exited without reporting a result";

/// Result of one metric's debate.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricOutcome {
    Completed(DebateState),
    Failed(String),
}

impl MetricOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    pub fn scores(&self) -> Option<&ScoreRecord> {
        match self {
            Self::Completed(state) => state.scores.as_ref(),
            Self::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Completed(_) => None,
            Self::Failed(reason) => Some(reason),
        }
    }
}

/// Per-metric results of a panel run.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelReport {
    pub label: String,
    pub results: BTreeMap<EvaluationMetric, MetricOutcome>,
}

impl PanelReport {
    pub fn completed_count(&self) -> usize {
        self.results.values().filter(|o| o.is_completed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.len() - self.completed_count()
    }

    pub fn get(&self, metric: EvaluationMetric) -> Option<&MetricOutcome> {
        self.results.get(&metric)
    }

    /// One status indicator per metric, in metric order.
    pub fn status_lines(&self) -> Vec<String> {
        self.results
            .iter()
            .map(|(metric, outcome)| match outcome {
                MetricOutcome::Completed(state) => match &state.scores {
                    Some(s) => format!(
                        "[ok] {} completed in {} rounds: {} (novelty {}, feasibility {}, impact {})",
                        metric.label(),
                        state.iteration,
                        s.recommendation,
                        s.novelty_score,
                        s.feasibility_score,
                        s.impact_score
                    ),
                    None => format!("[ok] {} completed without scores", metric.label()),
                },
                MetricOutcome::Failed(reason) => format!("[failed] {} failed: {reason}", metric.label()),
            })
            .collect()
    }
}

/// Run one debate per metric concurrently and collect whatever completes.
///
/// Duplicate metrics are evaluated once. Never fails as a whole.
pub async fn evaluate_metrics(
    request: &EvaluationRequest,
    metrics: &[EvaluationMetric],
    oracle: Arc<dyn ReasoningOracle>,
    config: &EvaluatorConfig,
) -> PanelReport {
    let metrics: BTreeSet<EvaluationMetric> = metrics.iter().copied().collect();
    let mut results: BTreeMap<EvaluationMetric, MetricOutcome> = metrics
        .iter()
        .map(|m| (*m, MetricOutcome::Failed(NO_REPORT.to_string())))
        .collect();

    info!(
        label = %request.label,
        metrics = metrics.len(),
        workers = config.panel_workers,
        "panel starting"
    );

    let sem = Arc::new(Semaphore::new(config.panel_workers.max(1)));
    let request = Arc::new(request.clone());
    let config = Arc::new(config.clone());
    let mut join_set: JoinSet<(EvaluationMetric, MetricOutcome)> = JoinSet::new();

    for metric in metrics {
        let sem = sem.clone();
        let request = request.clone();
        let config = config.clone();
        let oracle = oracle.clone();

        join_set.spawn(async move {
            let Ok(_permit) = sem.acquire().await else {
                return (metric, MetricOutcome::Failed("worker pool closed".to_string()));
            };
            let start = Instant::now();

            let outcome = match run_debate(&request, metric, oracle.as_ref(), &config).await {
                Ok(state) => MetricOutcome::Completed(state),
                Err(e) => MetricOutcome::Failed(e.to_string()),
            };
            debug!(
                metric = %metric,
                completed = outcome.is_completed(),
                elapsed_ms = start.elapsed().as_millis(),
                "metric worker finished"
            );
            (metric, outcome)
        });
    }

    while let Some(res) = join_set.join_next().await {
        match res {
            Ok((metric, outcome)) => {
                if let MetricOutcome::Failed(reason) = &outcome {
                    warn!(metric = %metric, reason = %reason, "metric evaluation failed");
                }
                results.insert(metric, outcome);
            }
            Err(e) => {
                // Its metric keeps the pre-filled failure.
                warn!(error = %e, "metric worker panicked");
            }
        }
    }

    let report = PanelReport {
        label: request.label.clone(),
        results,
    };
    info!(
        completed = report.completed_count(),
        failed = report.failed_count(),
        "panel finished"
    );
    report
}
