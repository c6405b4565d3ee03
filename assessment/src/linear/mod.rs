//! Linear evaluation: plan → investigate → reflect loop primitives.
//!
//! ```text
//! Planning → Investigation → Reflection → [route]
//!                 ▲                          │
//!                 └──── investigate ─────────┤
//!                                            └─ conclude → Scoring → Done
//! ```
//!
//! The router concludes when the iteration ceiling is hit, when the
//! investigation step declined to run a tool, or when reflected overall
//! confidence reached the threshold.

pub mod decision;
pub mod routing;
pub mod state;

pub use decision::{
    ConfidenceReport, InvestigationChoice, InvestigationDecision, OracleSignal, ReflectionReport,
    INVALID_PARAMETERS_FINDING,
};
pub use routing::{next_action_for, route_after_reflection, LinearPolicy, LinearRoute};
pub use state::{Confidence, EvaluationState, LinearNode, NextAction};
