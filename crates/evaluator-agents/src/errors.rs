//! Error taxonomy for evaluation runs.
//!
//! Parse failures and unknown tool names never show up here; the decision
//! parsers in `assessment` recover from them locally. What remains splits
//! into two scopes:
//!
//! | Variant               | Scope   | Notes                                  |
//! |-----------------------|---------|----------------------------------------|
//! | Inference             | run     | oracle call failed                     |
//! | StructuredOutput      | run     | reply did not fit the requested schema |
//! | StepBudgetExhausted   | run     | graph never reached a terminal node    |
//! | Search                | run     | literature retrieval failed            |
//! | Transition            | run     | node visited out of order              |
//! | Internal              | run     | anything else                          |
//! | Configuration         | session | nothing can run                        |
//! | Persistence           | session | results cannot be recorded             |
//!
//! Nothing is retried.

use assessment::debate::TransitionError;
use assessment::literature::SearchError;
use assessment::persistence::PersistenceError;
use thiserror::Error;

/// Unified error type for orchestration and its collaborators.
#[derive(Debug, Error)]
pub enum EvaluationError {
    /// The oracle request failed (network, timeout, backend error).
    #[error("Inference failure: {0}")]
    Inference(String),

    /// The oracle answered, but not in the requested shape.
    #[error("Structured output for {target} rejected: {message}")]
    StructuredOutput {
        target: &'static str,
        message: String,
    },

    /// Configuration is invalid or missing required fields.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A runner took more steps than its graph allows.
    #[error("{runner} exceeded its step budget of {budget}")]
    StepBudgetExhausted { runner: &'static str, budget: u32 },

    #[error("Literature search failed: {0}")]
    Search(#[from] SearchError),

    #[error("Invalid node transition: {0}")]
    Transition(#[from] TransitionError),

    #[error("Persistence failure: {0}")]
    Persistence(#[from] PersistenceError),

    /// Any other error that doesn't fit the above categories.
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl EvaluationError {
    /// `true` if the whole session should stop, not just the current run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Persistence(_))
    }

    /// `true` for replies that arrived but could not be shaped.
    pub fn is_structured_output(&self) -> bool {
        matches!(self, Self::StructuredOutput { .. })
    }

    pub fn structured<T: ?Sized>(message: impl Into<String>) -> Self {
        Self::StructuredOutput {
            target: short_type_name::<T>(),
            message: message.into(),
        }
    }
}

/// Last path segment of a type name (`assessment::score::ScoreRecord` → `ScoreRecord`).
fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
