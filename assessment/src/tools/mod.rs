//! Analysis tool registry over formatted literature text.
//!
//! The tool set is closed: [`ToolCall`] enumerates every operation and
//! [`execute`] dispatches exhaustively. Names the oracle invents never get
//! this far; the investigation parser turns them into an `UnknownTool`
//! decision instead.
//!
//! | Tool              | Parameter key | Works on                        |
//! |-------------------|---------------|---------------------------------|
//! | `analyze_papers`  | `FOCUS`       | every paper block               |
//! | `extract_details` | `CRITERIA`    | first 3 blocks, 200-char prefix |
//! | `compare_methods` | `ASPECT`      | every paper block               |

use serde::{Deserialize, Serialize};

use crate::literature::{block_id, block_title, split_papers};

/// Papers `extract_details` looks at.
pub const EXTRACT_MAX_PAPERS: usize = 3;
/// Characters of each paper block `extract_details` reports.
pub const EXTRACT_PREFIX_CHARS: usize = 200;
/// Matching papers listed per analysis before eliding the rest.
const MAX_LISTED_MATCHES: usize = 5;

/// The three analysis tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    AnalyzePapers,
    ExtractDetails,
    CompareMethods,
}

impl ToolKind {
    pub const ALL: [ToolKind; 3] = [Self::AnalyzePapers, Self::ExtractDetails, Self::CompareMethods];

    /// Name the oracle uses to pick this tool.
    pub fn name(self) -> &'static str {
        match self {
            Self::AnalyzePapers => "analyze_papers",
            Self::ExtractDetails => "extract_details",
            Self::CompareMethods => "compare_methods",
        }
    }

    /// Sentence key that carries this tool's parameter (`FOCUS: ...`).
    pub fn param_key(self) -> ParamKey {
        match self {
            Self::AnalyzePapers => ParamKey::Focus,
            Self::ExtractDetails => ParamKey::Criteria,
            Self::CompareMethods => ParamKey::Aspect,
        }
    }

    /// Exact-match lookup by tool name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn call(self, parameter: impl Into<String>) -> ToolCall {
        let parameter = parameter.into();
        match self {
            Self::AnalyzePapers => ToolCall::AnalyzePapers {
                focus_area: parameter,
            },
            Self::ExtractDetails => ToolCall::ExtractDetails {
                criteria: parameter,
            },
            Self::CompareMethods => ToolCall::CompareMethods { aspect: parameter },
        }
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameter keys recognised in a tool-selection sentence, in match order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamKey {
    Focus,
    Criteria,
    Aspect,
}

impl ParamKey {
    pub const ALL: [ParamKey; 3] = [Self::Focus, Self::Criteria, Self::Aspect];

    /// Marker as it appears in the oracle's sentence.
    pub fn marker(self) -> &'static str {
        match self {
            Self::Focus => "FOCUS:",
            Self::Criteria => "CRITERIA:",
            Self::Aspect => "ASPECT:",
        }
    }

    /// Parameter name as reported in echoed findings.
    pub fn param_name(self) -> &'static str {
        match self {
            Self::Focus => "focus_area",
            Self::Criteria => "criteria",
            Self::Aspect => "aspect",
        }
    }
}

/// A fully-resolved tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum ToolCall {
    AnalyzePapers { focus_area: String },
    ExtractDetails { criteria: String },
    CompareMethods { aspect: String },
}

impl ToolCall {
    pub fn kind(&self) -> ToolKind {
        match self {
            Self::AnalyzePapers { .. } => ToolKind::AnalyzePapers,
            Self::ExtractDetails { .. } => ToolKind::ExtractDetails,
            Self::CompareMethods { .. } => ToolKind::CompareMethods,
        }
    }

    pub fn parameter(&self) -> &str {
        match self {
            Self::AnalyzePapers { focus_area } => focus_area,
            Self::ExtractDetails { criteria } => criteria,
            Self::CompareMethods { aspect } => aspect,
        }
    }
}

/// Run a tool against the formatted literature text.
///
/// Never fails: empty or malformed literature yields an analysis that says so.
pub fn execute(call: &ToolCall, literature: &str) -> String {
    match call {
        ToolCall::AnalyzePapers { focus_area } => analyze_papers(focus_area, literature),
        ToolCall::ExtractDetails { criteria } => extract_details(criteria, literature),
        ToolCall::CompareMethods { aspect } => compare_methods(aspect, literature),
    }
}

/// Echo finding for a tool name outside the registry.
pub fn unknown_tool_echo(name: &str, key: Option<ParamKey>, value: &str) -> String {
    match key {
        Some(key) => format!(
            "Tool {name} executed with params {{'{}': '{value}'}}",
            key.param_name()
        ),
        None => format!("Tool {name} executed with params {{}}"),
    }
}

fn analyze_papers(focus_area: &str, literature: &str) -> String {
    let blocks = split_papers(literature);
    let mut out = format!(
        "Analysis of papers focusing on '{focus_area}': Found relevant insights from the pre-retrieved literature."
    );
    if blocks.is_empty() {
        out.push_str(" No retrieved papers were available to analyze.");
        return out;
    }
    append_matches(&mut out, focus_area, &blocks, "mention this focus area");
    out
}

fn extract_details(criteria: &str, literature: &str) -> String {
    let analyses: Vec<String> = split_papers(literature)
        .into_iter()
        .take(EXTRACT_MAX_PAPERS)
        .map(|block| {
            format!(
                "Paper analysis for '{criteria}': {}...",
                char_prefix(block, EXTRACT_PREFIX_CHARS)
            )
        })
        .collect();

    let mut out = format!(
        "Extracted details based on '{criteria}': {} papers analyzed.",
        analyses.len()
    );
    for analysis in &analyses {
        out.push('\n');
        out.push_str(analysis);
    }
    out
}

fn compare_methods(aspect: &str, literature: &str) -> String {
    let blocks = split_papers(literature);
    let mut out = format!(
        "Methodology comparison for '{aspect}': Analyzed methodological approaches in retrieved papers."
    );
    if blocks.is_empty() {
        out.push_str(" No retrieved papers were available to compare.");
        return out;
    }
    append_matches(&mut out, aspect, &blocks, "discuss this aspect");
    out
}

/// Append "N of M papers <verb>" and a short listing of the matches.
fn append_matches(out: &mut String, phrase: &str, blocks: &[&str], verb: &str) {
    let terms = search_terms(phrase);
    let matches: Vec<&str> = blocks
        .iter()
        .copied()
        .filter(|block| {
            let lower = block.to_lowercase();
            terms.iter().any(|t| lower.contains(t.as_str()))
        })
        .collect();

    out.push_str(&format!(" {} of {} papers {verb}.", matches.len(), blocks.len()));
    for block in matches.iter().take(MAX_LISTED_MATCHES) {
        out.push_str(&format!(
            "\n- {}: {}",
            block_id(block).unwrap_or("unknown"),
            block_title(block).unwrap_or("untitled")
        ));
    }
    if matches.len() > MAX_LISTED_MATCHES {
        out.push_str(&format!("\n- ... {} more", matches.len() - MAX_LISTED_MATCHES));
    }
}

/// Lowercased words of a phrase long enough to be meaningful.
fn search_terms(phrase: &str) -> Vec<String> {
    phrase
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 4)
        .map(str::to_lowercase)
        .collect()
}

/// First `max_chars` characters of `s`, never splitting a code point.
fn char_prefix(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literature::{prepare_for_reasoning, Paper, RawPapers};

    fn literature(n: usize) -> String {
        let papers = (0..n)
            .map(|i| {
                Paper::new(
                    format!("p{i}"),
                    format!("Paper number {i} on contrastive learning"),
                    "x".repeat(400),
                )
            })
            .collect();
        prepare_for_reasoning(&RawPapers::Flat(papers))
    }

    #[test]
    fn test_from_name_exact_match() {
        assert_eq!(ToolKind::from_name("extract_details"), Some(ToolKind::ExtractDetails));
        assert_eq!(ToolKind::from_name("Extract_Details"), None);
        assert_eq!(ToolKind::from_name("extract_details "), None);
    }

    #[test]
    fn test_extract_details_caps_at_three_papers() {
        let text = literature(5);
        let out = execute(&ToolKind::ExtractDetails.call("datasets"), &text);
        assert!(out.starts_with("Extracted details based on 'datasets': 3 papers analyzed."));
        assert_eq!(out.matches("Paper analysis for").count(), 3);
        assert!(out.contains("p0") && out.contains("p2"));
        assert!(!out.contains("p3") && !out.contains("p4"));
    }

    #[test]
    fn test_extract_details_truncates_blocks() {
        let text = literature(1);
        let out = execute(&ToolKind::ExtractDetails.call("c"), &text);
        let body = out
            .strip_prefix("Extracted details based on 'c': 1 papers analyzed.\n")
            .unwrap()
            .strip_prefix("Paper analysis for 'c': ")
            .unwrap()
            .strip_suffix("...")
            .unwrap();
        assert_eq!(body.chars().count(), EXTRACT_PREFIX_CHARS);
    }

    #[test]
    fn test_char_prefix_respects_boundaries() {
        assert_eq!(char_prefix("ééé", 2), "éé");
        assert_eq!(char_prefix("ab", 10), "ab");
    }

    #[test]
    fn test_empty_literature_is_graceful() {
        for kind in ToolKind::ALL {
            let out = execute(&kind.call("anything"), "");
            assert!(!out.is_empty(), "{kind} returned empty output");
        }
        let out = execute(&ToolKind::ExtractDetails.call("x"), "");
        assert!(out.contains("0 papers analyzed"));
    }

    #[test]
    fn test_analyze_papers_lists_matches() {
        let mut papers = vec![Paper::new("a", "Diffusion models for audio", "...")];
        papers.push(Paper::new("b", "Graph transformers", "..."));
        let text = prepare_for_reasoning(&RawPapers::Flat(papers));
        let out = execute(&ToolKind::AnalyzePapers.call("diffusion"), &text);
        assert!(out.contains("1 of 2 papers mention this focus area"));
        assert!(out.contains("- a: Diffusion models for audio"));
        assert!(!out.contains("- b:"));
    }

    #[test]
    fn test_compare_methods_elides_long_listing() {
        let text = literature(8);
        let out = execute(&ToolKind::CompareMethods.call("contrastive"), &text);
        assert!(out.contains("8 of 8 papers discuss this aspect"));
        assert!(out.contains("... 3 more"));
    }

    #[test]
    fn test_unknown_tool_echo() {
        assert_eq!(
            unknown_tool_echo("summarize", Some(ParamKey::Focus), "bias"),
            "Tool summarize executed with params {'focus_area': 'bias'}"
        );
    }

    #[test]
    fn test_tool_call_accessors() {
        let call = ToolKind::CompareMethods.call("ablation");
        assert_eq!(call.kind(), ToolKind::CompareMethods);
        assert_eq!(call.parameter(), "ablation");
        assert_eq!(call.kind().param_key(), ParamKey::Aspect);
    }
}
