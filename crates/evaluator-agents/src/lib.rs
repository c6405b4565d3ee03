//! Agentic research-proposal evaluation.
//!
//! Two orchestrators drive a [`ReasoningOracle`] over a proposal and its
//! literature:
//!
//! - [`linear`]: plan, investigate with the closed tool registry, reflect on
//!   confidence, then score.
//! - [`debate`]: advocate, skeptic and moderator argue one metric until a
//!   verdict or the round ceiling, then score.
//!
//! [`panel`] runs one debate per metric concurrently. [`report`] turns any
//! run into a persisted row. [`discovery`] plans literature-search queries
//! when a run is given no papers.

pub mod config;
pub mod debate;
pub mod discovery;
pub mod errors;
pub mod linear;
pub mod oracle;
pub mod panel;
pub mod prompts;
pub mod report;
pub mod runner;

pub use config::{DecisionMode, EvaluatorConfig};
pub use debate::{run_debate, DebateEvaluator};
pub use discovery::{discover_literature, plan_queries};
pub use errors::EvaluationError;
pub use linear::{run_linear, LinearEvaluator};
pub use oracle::{infer_structured, ReasoningOracle, RigOracle};
pub use panel::{evaluate_metrics, MetricOutcome, PanelReport};
pub use report::{EvaluationReport, ReportEntry, RunMode};
pub use runner::{drive, EvaluationRequest, GraphRunner, StepResult};
