//! Literature discovery: proposal → planned queries → search results.
//!
//! ```text
//! proposal ──oracle──▶ QueryPlan ──normalise──▶ [query; ≤5] ──search_many──▶ RawPapers::ByQuery
//! ```
//!
//! Used when a run is given neither a papers file nor explicit queries.

use assessment::literature::{search_many, LiteratureSearch, QueryPlan, RawPapers};
use tracing::{debug, info};

use crate::errors::EvaluationError;
use crate::oracle::{infer_structured, ReasoningOracle};
use crate::prompts;

/// Ask the oracle for search queries covering `proposal`.
///
/// A plan with no usable query is a `StructuredOutput` error.
pub async fn plan_queries(oracle: &dyn ReasoningOracle, proposal: &str) -> Result<Vec<String>, EvaluationError> {
    let plan = infer_structured::<QueryPlan>(oracle, &prompts::query_generation(proposal)).await?;
    for query in &plan.queries {
        debug!(query = %query.query_string, concepts = %query.priority_concepts, "planned query");
    }

    let queries = plan.query_strings();
    if queries.is_empty() {
        return Err(EvaluationError::structured::<QueryPlan>("plan contained no usable queries"));
    }
    Ok(queries)
}

/// Plan queries for `proposal` and run them in plan order.
pub async fn discover_literature(
    oracle: &dyn ReasoningOracle,
    search: &dyn LiteratureSearch,
    proposal: &str,
) -> Result<RawPapers, EvaluationError> {
    let queries = plan_queries(oracle, proposal).await?;
    info!(queries = queries.len(), "searching literature with planned queries");
    Ok(search_many(search, &queries).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct FixedPlan(serde_json::Value);

    #[async_trait]
    impl ReasoningOracle for FixedPlan {
        async fn infer(&self, _prompt: &str) -> Result<String, EvaluationError> {
            Ok(self.0.to_string())
        }

        async fn infer_json(
            &self,
            prompt: &str,
            _schema: &serde_json::Value,
        ) -> Result<serde_json::Value, EvaluationError> {
            assert!(prompt.contains("diverse search queries"));
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn blank_queries_dropped() {
        let oracle = FixedPlan(json!({
            "queries": [
                {"query_string": "contrastive code search", "rationale": "closest task", "priority_concepts": "code search"},
                {"query_string": "   ", "rationale": "", "priority_concepts": ""},
                {"query_string": "sparse lexical retrieval", "rationale": "method", "priority_concepts": "sparse"}
            ]
        }));
        let queries = plan_queries(&oracle, "Sparse retrieval for code").await.unwrap();
        assert_eq!(queries, vec!["contrastive code search", "sparse lexical retrieval"]);
    }

    #[tokio::test]
    async fn empty_plan_is_structured_error() {
        let oracle = FixedPlan(json!({"queries": [{"query_string": ""}]}));
        let err = plan_queries(&oracle, "idea").await.unwrap_err();
        assert!(err.is_structured_output());
        assert!(err.to_string().contains("QueryPlan"));
    }

    #[tokio::test]
    async fn malformed_plan_is_structured_error() {
        let oracle = FixedPlan(json!({"queries": "sparse retrieval"}));
        let err = plan_queries(&oracle, "idea").await.unwrap_err();
        assert!(err.is_structured_output());
    }
}
