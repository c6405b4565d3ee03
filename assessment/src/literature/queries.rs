//! Search-query planning: the structured record an oracle returns when asked
//! to turn a proposal into literature-search queries.
//!
//! The search service matches keywords, not sentences, so every planned query
//! is normalised before it is sent: whitespace collapsed, capped at
//! [`MAX_QUERY_WORDS`] words, empty and repeated queries dropped, at most
//! [`MAX_QUERIES`] kept in the order the oracle ranked them.

use std::collections::HashSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Queries requested from the oracle and kept after normalisation.
pub const MAX_QUERIES: usize = 5;

/// Longest query sent to the search service.
pub const MAX_QUERY_WORDS: usize = 8;

/// One keyword query and the reason it was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SearchQuery {
    /// Two to six technical keywords, no boolean operators.
    pub query_string: String,
    /// Why this query finds relevant prior work.
    #[serde(default)]
    pub rationale: String,
    /// The proposal concepts this query targets.
    #[serde(default)]
    pub priority_concepts: String,
}

/// Ranked search queries for one proposal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct QueryPlan {
    pub queries: Vec<SearchQuery>,
}

impl QueryPlan {
    /// Query strings ready for the search service, in plan order.
    pub fn query_strings(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.queries
            .iter()
            .filter_map(|q| normalise_query(&q.query_string))
            .filter(|q| seen.insert(q.to_lowercase()))
            .take(MAX_QUERIES)
            .collect()
    }
}

/// Collapse whitespace, strip quotes and cap the word count. `None` if nothing is left.
pub fn normalise_query(raw: &str) -> Option<String> {
    let words: Vec<&str> = raw
        .split_whitespace()
        .map(|w| w.trim_matches(|c| c == '"' || c == '\''))
        .filter(|w| !w.is_empty())
        .take(MAX_QUERY_WORDS)
        .collect();
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}
