//! Evaluation reports and their persisted row form.
//!
//! Row layout (one row per run, appended to the evaluation log):
//!
//! ```text
//! [timestamp, label, mode, proposal,
//!  per entry: status, novelty, feasibility, impact, recommendation]
//! ```
//!
//! A panel contributes one entry per metric in metric order; linear and
//! single-debate runs contribute one entry.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use assessment::debate::DebateState;
use assessment::linear::EvaluationState;
use assessment::persistence::RowSink;
use assessment::score::ScoreRecord;

use crate::errors::EvaluationError;
use crate::panel::{MetricOutcome, PanelReport};
use crate::runner::EvaluationRequest;

/// Which orchestrator produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Linear,
    Debate,
    Panel,
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::Debate => write!(f, "debate"),
            Self::Panel => write!(f, "panel"),
        }
    }
}

/// Outcome of one scored dimension of a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    /// Metric name, or `overall` for a linear run.
    pub name: String,
    pub scores: Option<ScoreRecord>,
    pub error: Option<String>,
    /// Rounds (debate) or investigations (linear) the run took.
    pub iterations: u32,
}

impl ReportEntry {
    pub fn status(&self) -> &'static str {
        if self.scores.is_some() {
            "completed"
        } else {
            "failed"
        }
    }

    /// `true` when the recommendation is not Accept, Revise or Reject.
    pub fn recommendation_flagged(&self) -> bool {
        self.scores
            .as_ref()
            .is_some_and(|s| s.recommendation_kind().is_none())
    }

    fn push_columns(&self, row: &mut Vec<String>) {
        row.push(self.status().to_string());
        match &self.scores {
            Some(s) => {
                row.push(s.novelty_score.to_string());
                row.push(s.feasibility_score.to_string());
                row.push(s.impact_score.to_string());
                row.push(s.recommendation.clone());
            }
            None => row.extend(std::iter::repeat(String::new()).take(4)),
        }
    }
}

/// Caller-facing summary of one evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub timestamp: DateTime<Utc>,
    pub label: String,
    pub mode: RunMode,
    pub proposal: String,
    pub entries: Vec<ReportEntry>,
}

impl EvaluationReport {
    fn new(request: &EvaluationRequest, mode: RunMode, entries: Vec<ReportEntry>) -> Self {
        Self {
            timestamp: Utc::now(),
            label: request.label.clone(),
            mode,
            proposal: request.proposal.clone(),
            entries,
        }
    }

    pub fn from_linear(request: &EvaluationRequest, state: &EvaluationState) -> Self {
        let entry = ReportEntry {
            name: "overall".to_string(),
            scores: state.scores.clone(),
            error: None,
            iterations: state.iteration,
        };
        Self::new(request, RunMode::Linear, vec![entry])
    }

    pub fn from_debate(request: &EvaluationRequest, state: &DebateState) -> Self {
        let entry = ReportEntry {
            name: state.metric.to_string(),
            scores: state.scores.clone(),
            error: None,
            iterations: state.iteration,
        };
        Self::new(request, RunMode::Debate, vec![entry])
    }

    /// A run that ended in an error before producing a state.
    pub fn from_failure(request: &EvaluationRequest, mode: RunMode, name: &str, error: &EvaluationError) -> Self {
        let entry = ReportEntry {
            name: name.to_string(),
            scores: None,
            error: Some(error.to_string()),
            iterations: 0,
        };
        Self::new(request, mode, vec![entry])
    }

    pub fn from_panel(request: &EvaluationRequest, panel: &PanelReport) -> Self {
        let entries = panel
            .results
            .iter()
            .map(|(metric, outcome)| match outcome {
                MetricOutcome::Completed(state) => ReportEntry {
                    name: metric.to_string(),
                    scores: state.scores.clone(),
                    error: None,
                    iterations: state.iteration,
                },
                MetricOutcome::Failed(reason) => ReportEntry {
                    name: metric.to_string(),
                    scores: None,
                    error: Some(reason.clone()),
                    iterations: 0,
                },
            })
            .collect();
        Self::new(request, RunMode::Panel, entries)
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn is_complete(&self) -> bool {
        self.entries.iter().all(|e| e.scores.is_some())
    }

    /// Ordered values for the evaluation log.
    pub fn to_row(&self) -> Vec<String> {
        let mut row = vec![
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.label.clone(),
            self.mode.to_string(),
            self.proposal.clone(),
        ];
        for entry in &self.entries {
            entry.push_columns(&mut row);
        }
        row
    }

    /// Append this report's row to `sink`.
    pub fn persist(&self, sink: &mut dyn RowSink) -> Result<(), EvaluationError> {
        sink.append_row(&self.to_row())?;
        Ok(())
    }

    /// Human-readable multi-line summary.
    pub fn render_text(&self) -> String {
        let mut out = format!("{} evaluation", self.mode);
        if !self.label.is_empty() {
            out.push_str(&format!(" [{}]", self.label));
        }
        for entry in &self.entries {
            match (&entry.scores, &entry.error) {
                (Some(s), _) => {
                    out.push_str(&format!(
                        "\n{}: novelty {} | feasibility {} | impact {} | {}{}",
                        entry.name,
                        s.novelty_score,
                        s.feasibility_score,
                        s.impact_score,
                        s.recommendation,
                        if entry.recommendation_flagged() {
                            " (unrecognised recommendation)"
                        } else {
                            ""
                        }
                    ));
                    out.push_str(&format!("\n  {}", s.summary));
                }
                (None, Some(err)) => out.push_str(&format!("\n{}: failed: {err}", entry.name)),
                (None, None) => out.push_str(&format!("\n{}: no scores", entry.name)),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assessment::debate::EvaluationMetric;
    use assessment::persistence::MemoryRowSink;
    use chrono::TimeZone;
    use std::collections::BTreeMap;

    fn scores(rec: &str) -> ScoreRecord {
        ScoreRecord {
            novelty_score: 8,
            feasibility_score: 6,
            impact_score: 7,
            summary: "Promising.".into(),
            recommendation: rec.into(),
        }
    }

    fn request() -> EvaluationRequest {
        EvaluationRequest::from_literature("Idea X", "").with_label("idea-1")
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn linear_row_layout() {
        let mut state = EvaluationState::new("Idea X", "");
        state.record_scores(scores("Accept"));
        let report = EvaluationReport::from_linear(&request(), &state).with_timestamp(fixed_time());
        assert_eq!(
            report.to_row(),
            vec![
                "2025-03-01T12:00:00Z",
                "idea-1",
                "linear",
                "Idea X",
                "completed",
                "8",
                "6",
                "7",
                "Accept"
            ]
        );
    }

    #[test]
    fn panel_row_keeps_failed_metric_columns() {
        let mut completed = DebateState::new("Idea X", "", EvaluationMetric::Novelty, 3);
        completed.scores = Some(scores("Revise"));
        let mut results = BTreeMap::new();
        results.insert(EvaluationMetric::Novelty, MetricOutcome::Completed(completed));
        results.insert(EvaluationMetric::Feasibility, MetricOutcome::Failed("boom".into()));
        let panel = PanelReport {
            label: "idea-1".into(),
            results,
        };

        let report = EvaluationReport::from_panel(&request(), &panel);
        let row = report.to_row();
        assert_eq!(row.len(), 4 + 2 * 5);
        assert_eq!(&row[4..9], &["completed", "8", "6", "7", "Revise"]);
        assert_eq!(&row[9..14], &["failed", "", "", "", ""]);
        assert!(!report.is_complete());
    }

    #[test]
    fn unrecognised_recommendation_is_flagged() {
        let mut state = DebateState::new("Idea X", "", EvaluationMetric::Interestingness, 3);
        state.scores = Some(scores("Strong maybe"));
        let report = EvaluationReport::from_debate(&request(), &state);
        assert!(report.entries[0].recommendation_flagged());
        assert!(report.render_text().contains("unrecognised recommendation"));
    }

    #[test]
    fn persist_appends_one_row() {
        let mut sink = MemoryRowSink::default();
        let err = EvaluationError::Inference("down".into());
        let report = EvaluationReport::from_failure(&request(), RunMode::Linear, "overall", &err);
        report.persist(&mut sink).unwrap();
        assert_eq!(sink.rows.len(), 1);
        assert_eq!(sink.rows[0][4], "failed");
        assert!(report.render_text().contains("failed: Inference failure: down"));
    }

    #[test]
    fn report_serializes_to_json() {
        let mut state = EvaluationState::new("Idea X", "");
        state.record_scores(scores("Accept"));
        let report = EvaluationReport::from_linear(&request(), &state).with_timestamp(fixed_time());

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["timestamp"], "2025-03-01T12:00:00Z");
        assert_eq!(value["mode"], "linear");
        assert_eq!(value["label"], "idea-1");
        assert_eq!(value["entries"][0]["scores"]["novelty_score"], 8);
        assert!(value["entries"][0]["error"].is_null());
    }
}
