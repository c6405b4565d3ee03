//! Deterministic core for agentic research-proposal evaluation.
//!
//! This crate holds everything that does not need a language model:
//! - Literature: paper metadata, search-query plans and the reasoning-ready text form
//! - Tools: the closed analysis tool registry over that text
//! - Linear: state, decision parsers and routing for the plan/investigate/reflect loop
//! - Debate: phases, transcript and routing for advocate/skeptic/moderator debates
//! - Score: the record every run ends with
//! - Persistence: append-only row sinks for evaluation logs
//!
//! The LLM-facing orchestration lives in `evaluator-agents`, which drives
//! these types through an oracle.

#![allow(clippy::uninlined_format_args)]

pub mod debate;
pub mod linear;
pub mod literature;
pub mod persistence;
pub mod score;
pub mod tools;

pub use debate::{DebatePhase, DebateRole, DebateRoute, DebateState, EvaluationMetric};
pub use linear::{
    Confidence, EvaluationState, InvestigationDecision, LinearPolicy, LinearRoute, NextAction,
    ReflectionReport,
};
pub use literature::{prepare_for_reasoning, Paper, QueryPlan, QueryResults, RawPapers, SearchQuery};
pub use persistence::{JsonlRowSink, MemoryRowSink, PersistenceError, RowSink};
pub use score::{Recommendation, ScoreRecord};
pub use tools::{ToolCall, ToolKind};
