//! Debate evaluation: advocate, skeptic and moderator loop primitives.
//!
//! # Debate Flow
//!
//! ```text
//! Idle → Advocate → Skeptic → Moderator → [verdict or ceiling?]
//!           ▲                                 │
//!           └──────────── no ─────────────────┤
//!                                             └─ yes → Scoring → Done
//! ```
//!
//! One debate evaluates exactly one [`EvaluationMetric`]; metrics are
//! independent and share no state.

pub mod metric;
pub mod routing;
pub mod state;

pub use metric::{EvaluationMetric, UnknownMetric};
pub use routing::{contains_verdict, route_after_moderator, DebateRoute, ModeratorRuling, VERDICT_MARKER};
pub use state::{
    DebatePhase, DebateRole, DebateState, TranscriptEntry, TransitionError, DEFAULT_MAX_ITERATIONS,
};
