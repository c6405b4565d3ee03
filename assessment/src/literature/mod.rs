//! Literature store adapter: paper metadata and the reasoning-ready text form.
//!
//! Every prompt and every analysis tool consumes the same flattened text:
//! one `Paper ID / Title / Abstract` block per unique paper, joined by
//! [`PAPER_SEPARATOR`].
//!
//! ```text
//! RawPapers (query → results in query order, or flat list)
//!   → dedupe by paper id (first occurrence wins)
//!   → render blocks
//!   → join with "\n\n---\n\n"
//! ```

pub mod queries;
pub mod search;

use std::collections::HashSet;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub use queries::{QueryPlan, SearchQuery};
pub use search::{search_many, LiteratureSearch, SearchError, SemanticScholarClient};

/// Separator between rendered paper blocks.
pub const PAPER_SEPARATOR: &str = "\n\n---\n\n";

/// Marker that opens every rendered paper block.
pub const PAPER_ID_MARKER: &str = "Paper ID:";

/// Paper metadata as returned by the search service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paper {
    #[serde(default)]
    pub paper_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "abstract")]
    pub abstract_text: Option<String>,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub citation_count: Option<u64>,
    #[serde(default)]
    pub url: Option<String>,
}

impl Paper {
    pub fn new(id: impl Into<String>, title: impl Into<String>, abstract_text: impl Into<String>) -> Self {
        Self {
            paper_id: Some(id.into()),
            title: Some(title.into()),
            abstract_text: Some(abstract_text.into()),
            ..Self::default()
        }
    }

    /// Render this paper as a reasoning block.
    ///
    /// Missing title/abstract fields are rendered as `None`, the same way the
    /// search service's nulls appear in the rest of the pipeline.
    pub fn render(&self, id: &str) -> String {
        format!(
            "{PAPER_ID_MARKER} {id}\nTitle: {}\nAbstract: {}",
            self.title.as_deref().unwrap_or("None"),
            self.abstract_text.as_deref().unwrap_or("None"),
        )
    }
}

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub data: Vec<Paper>,
}

/// Search results keyed by query, in the order the queries were run.
///
/// Serialized as a JSON object. Order matters: it decides which duplicate
/// paper survives and which papers the tools see first. A repeated query
/// replaces the earlier results but keeps the earlier position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResults(Vec<(String, SearchResponse)>);

impl QueryResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, query: impl Into<String>, response: SearchResponse) {
        let query = query.into();
        match self.0.iter_mut().find(|(q, _)| *q == query) {
            Some(slot) => slot.1 = response,
            None => self.0.push((query, response)),
        }
    }

    pub fn get(&self, query: &str) -> Option<&SearchResponse> {
        self.0.iter().find(|(q, _)| q == query).map(|(_, r)| r)
    }

    pub fn contains_query(&self, query: &str) -> bool {
        self.get(query).is_some()
    }

    pub fn queries(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(q, _)| q.as_str())
    }

    pub fn responses(&self) -> impl Iterator<Item = &SearchResponse> {
        self.0.iter().map(|(_, r)| r)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<Q: Into<String>> FromIterator<(Q, SearchResponse)> for QueryResults {
    fn from_iter<I: IntoIterator<Item = (Q, SearchResponse)>>(iter: I) -> Self {
        let mut results = Self::new();
        for (query, response) in iter {
            results.insert(query, response);
        }
        results
    }
}

impl Serialize for QueryResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (query, response) in &self.0 {
            map.serialize_entry(query, response)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for QueryResults {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct QueryResultsVisitor;

        impl<'de> Visitor<'de> for QueryResultsVisitor {
            type Value = QueryResults;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of query to search results")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut results = QueryResults::new();
                while let Some((query, response)) = access.next_entry::<String, SearchResponse>()? {
                    results.insert(query, response);
                }
                Ok(results)
            }
        }

        deserializer.deserialize_map(QueryResultsVisitor)
    }
}

/// Raw papers handed over by the caller.
///
/// Either the per-query results produced by the literature review step or a
/// plain list of papers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPapers {
    ByQuery(QueryResults),
    Flat(Vec<Paper>),
}

impl Default for RawPapers {
    fn default() -> Self {
        Self::Flat(Vec::new())
    }
}

impl RawPapers {
    /// Iterate every paper in visiting order, duplicates included.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &Paper> + '_> {
        match self {
            Self::ByQuery(results) => Box::new(results.responses().flat_map(|r| r.data.iter())),
            Self::Flat(papers) => Box::new(papers.iter()),
        }
    }

    /// Parse the JSON the literature review step writes to disk.
    ///
    /// Accepts a bare map/list or an object wrapping it under `paper_bank`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        #[derive(Deserialize)]
        struct Wrapped {
            paper_bank: RawPapers,
        }

        serde_json::from_str::<Wrapped>(json)
            .map(|w| w.paper_bank)
            .or_else(|_| serde_json::from_str::<RawPapers>(json))
    }
}

/// Flatten raw papers into the single text form consumed by prompts and tools.
pub fn prepare_for_reasoning(raw: &RawPapers) -> String {
    let mut seen = HashSet::new();
    let mut blocks = Vec::new();

    for paper in raw.iter() {
        // Papers without an identity can't be deduplicated and are skipped.
        let Some(id) = paper.paper_id.as_deref() else {
            continue;
        };
        if seen.insert(id.to_string()) {
            blocks.push(paper.render(id));
        }
    }

    blocks.join(PAPER_SEPARATOR)
}

/// Number of paper blocks in formatted literature text.
pub fn count_papers(literature: &str) -> usize {
    literature.matches(PAPER_ID_MARKER).count()
}

/// Non-blank paper blocks of formatted literature text, in order.
pub fn split_papers(literature: &str) -> Vec<&str> {
    literature
        .split(PAPER_SEPARATOR)
        .filter(|block| !block.trim().is_empty())
        .collect()
}

/// Extract the `Title:` line of a rendered block, if any.
pub fn block_title(block: &str) -> Option<&str> {
    block
        .lines()
        .find_map(|line| line.trim().strip_prefix("Title:"))
        .map(str::trim)
}

/// Extract the id from a rendered block, if any.
pub fn block_id(block: &str) -> Option<&str> {
    block
        .lines()
        .find_map(|line| line.trim().strip_prefix(PAPER_ID_MARKER))
        .map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(papers: Vec<Paper>) -> SearchResponse {
        SearchResponse {
            total: Some(papers.len() as u64),
            data: papers,
        }
    }

    #[test]
    fn test_prepare_dedupes_by_id() {
        let mut map = QueryResults::new();
        map.insert(
            "graph neural networks",
            response(vec![
                Paper::new("p1", "GNN survey", "A survey."),
                Paper::new("p2", "Message passing", "MPNNs."),
            ]),
        );
        map.insert(
            "message passing",
            response(vec![
                Paper::new("p2", "Message passing (dup)", "dup"),
                Paper::new("p3", "Oversmoothing", "Depth hurts."),
            ]),
        );

        let text = prepare_for_reasoning(&RawPapers::ByQuery(map));
        assert_eq!(count_papers(&text), 3);
        assert!(text.contains("Title: Message passing\n"));
        assert!(!text.contains("(dup)"));
        assert_eq!(split_papers(&text).len(), 3);
    }

    #[test]
    fn test_prepare_skips_missing_ids() {
        let raw = RawPapers::Flat(vec![
            Paper {
                title: Some("orphan".into()),
                ..Paper::default()
            },
            Paper::new("p1", "kept", "abstract"),
        ]);
        let text = prepare_for_reasoning(&raw);
        assert_eq!(count_papers(&text), 1);
        assert!(!text.contains("orphan"));
    }

    #[test]
    fn test_prepare_empty() {
        let text = prepare_for_reasoning(&RawPapers::default());
        assert!(text.is_empty());
        assert_eq!(count_papers(&text), 0);
        assert!(split_papers(&text).is_empty());
    }

    #[test]
    fn test_render_null_fields() {
        let paper = Paper {
            paper_id: Some("x".into()),
            ..Paper::default()
        };
        assert_eq!(paper.render("x"), "Paper ID: x\nTitle: None\nAbstract: None");
    }

    #[test]
    fn test_from_json_paper_bank_wrapper() {
        let json = r#"{"paper_bank": [{"paperId": "a1", "title": "T", "abstract": "A", "citationCount": 12}]}"#;
        let raw = RawPapers::from_json(json).unwrap();
        let papers: Vec<_> = raw.iter().collect();
        assert_eq!(papers.len(), 1);
        assert_eq!(papers[0].citation_count, Some(12));
        assert_eq!(papers[0].abstract_text.as_deref(), Some("A"));
    }

    #[test]
    fn test_from_json_query_map() {
        let json = r#"{"q1": {"total": 1, "data": [{"paperId": "a1", "title": "T", "abstract": null}]}}"#;
        let raw = RawPapers::from_json(json).unwrap();
        assert!(matches!(raw, RawPapers::ByQuery(_)));
        assert_eq!(count_papers(&prepare_for_reasoning(&raw)), 1);
    }

    #[test]
    fn test_query_order_decides_duplicate_winner() {
        let json = r#"{
            "zeta query": {"data": [{"paperId": "p1", "title": "From first query"}]},
            "alpha query": {"data": [
                {"paperId": "p1", "title": "From second query"},
                {"paperId": "p2", "title": "Second only"}
            ]}
        }"#;
        let raw = RawPapers::from_json(json).unwrap();
        let RawPapers::ByQuery(results) = &raw else {
            panic!("expected query results");
        };
        assert_eq!(results.queries().collect::<Vec<_>>(), vec!["zeta query", "alpha query"]);

        let text = prepare_for_reasoning(&raw);
        let titles: Vec<_> = split_papers(&text).into_iter().filter_map(block_title).collect();
        assert_eq!(titles, vec!["From first query", "Second only"]);
    }

    #[test]
    fn test_query_results_round_trip_keeps_order() {
        let results: QueryResults = [
            ("b", SearchResponse::default()),
            ("a", SearchResponse::default()),
            ("b", response(vec![Paper::new("x", "replaced", "")])),
        ]
        .into_iter()
        .collect();
        assert_eq!(results.queries().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(results.get("b").map(|r| r.data.len()), Some(1));

        let json = serde_json::to_string(&RawPapers::ByQuery(results.clone())).unwrap();
        assert!(json.starts_with(r#"{"b":"#));
        assert_eq!(RawPapers::from_json(&json).unwrap(), RawPapers::ByQuery(results));
    }

    #[test]
    fn test_block_accessors() {
        let block = Paper::new("p9", "Sparse attention", "...").render("p9");
        assert_eq!(block_id(&block), Some("p9"));
        assert_eq!(block_title(&block), Some("Sparse attention"));
    }
}
