//! Total parsers for the oracle's investigation and reflection replies.
//!
//! Both parsers always return a variant. Free text that doesn't follow the
//! requested sentence shape degrades to a safe default instead of an error.

use std::sync::LazyLock;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::state::Confidence;
use crate::tools::{unknown_tool_echo, ParamKey, ToolCall, ToolKind};

/// Finding recorded when a tool sentence carries no recognised parameter.
pub const INVALID_PARAMETERS_FINDING: &str = "Tool execution failed - invalid parameters";

const TOOL_PREFIX: &str = "TOOL:";

static INTEGER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("INTEGER_RE regex should compile"));

// ── Investigation ────────────────────────────────────────────────────────────

/// What the investigation step decided to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestigationDecision {
    /// Run a registered tool.
    Invoke(ToolCall),
    /// The oracle named a tool outside the registry.
    UnknownTool {
        name: String,
        key: Option<ParamKey>,
        value: String,
    },
    /// `TOOL:` sentence without any recognised parameter key.
    InvalidParameters,
    /// Stop investigating.
    Conclude,
}

impl InvestigationDecision {
    /// Parse `TOOL: <name>, <KEY>: <value>` or anything else (→ `Conclude`).
    ///
    /// Parameter keys are tried in the order `FOCUS`, `CRITERIA`, `ASPECT`.
    /// A value supplied under a key that belongs to a different tool is
    /// dropped and the tool runs with an empty parameter.
    pub fn parse(raw: &str) -> Self {
        let decision = raw.trim();
        let Some(rest) = decision.strip_prefix(TOOL_PREFIX) else {
            return Self::Conclude;
        };

        let name = rest
            .split([',', '\n'])
            .next()
            .unwrap_or_default()
            .trim()
            .trim_matches(|c| c == '"' || c == '`')
            .to_string();

        let Some((key, value)) = find_parameter(decision) else {
            return Self::InvalidParameters;
        };

        match ToolKind::from_name(&name) {
            Some(kind) if kind.param_key() == key => Self::Invoke(kind.call(value)),
            Some(kind) => Self::Invoke(kind.call(String::new())),
            None => Self::UnknownTool {
                name,
                key: Some(key),
                value,
            },
        }
    }

    /// Finding text this decision contributes, after running any tool.
    ///
    /// Returns `None` for `Conclude`, which contributes nothing.
    pub fn finding(&self, literature: &str) -> Option<String> {
        match self {
            Self::Invoke(call) => Some(crate::tools::execute(call, literature)),
            Self::UnknownTool { name, key, value } => Some(unknown_tool_echo(name, *key, value)),
            Self::InvalidParameters => Some(INVALID_PARAMETERS_FINDING.to_string()),
            Self::Conclude => None,
        }
    }

    pub fn is_conclude(&self) -> bool {
        matches!(self, Self::Conclude)
    }
}

fn find_parameter(decision: &str) -> Option<(ParamKey, String)> {
    ParamKey::ALL.into_iter().find_map(|key| {
        let start = decision.find(key.marker())? + key.marker().len();
        let value = decision[start..]
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .trim_matches(|c| c == '"' || c == '`')
            .trim()
            .to_string();
        Some((key, value))
    })
}

/// Tagged-variant form of the investigation decision for structured output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum InvestigationChoice {
    /// Run one of `analyze_papers`, `extract_details`, `compare_methods`.
    UseTool { tool: String, parameter: String },
    /// Enough evidence has been gathered.
    Conclude,
}

impl From<InvestigationChoice> for InvestigationDecision {
    fn from(choice: InvestigationChoice) -> Self {
        match choice {
            InvestigationChoice::Conclude => Self::Conclude,
            InvestigationChoice::UseTool { parameter, .. } if parameter.trim().is_empty() => {
                Self::InvalidParameters
            }
            InvestigationChoice::UseTool { tool, parameter } => {
                match ToolKind::from_name(tool.trim()) {
                    Some(kind) => Self::Invoke(kind.call(parameter)),
                    None => Self::UnknownTool {
                        name: tool,
                        key: None,
                        value: parameter,
                    },
                }
            }
        }
    }
}

// ── Reflection ───────────────────────────────────────────────────────────────

/// The oracle's own continue/conclude instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OracleSignal {
    Continue,
    Conclude,
}

/// Parsed reflection reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflectionReport {
    pub confidence: Confidence,
    /// What the oracle said it wanted to do, if it said anything.
    pub signal: Option<OracleSignal>,
}

impl ReflectionReport {
    /// Read confidences from the first line and the signal from anywhere.
    ///
    /// The first three integers on the first line are taken in order as
    /// novelty, feasibility, overall. Fewer than three → 50/50/50.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let first_line = trimmed.lines().next().unwrap_or_default();
        let numbers: Vec<u32> = INTEGER_RE
            .find_iter(first_line)
            .take(3)
            .map_while(|m| m.as_str().parse::<u32>().ok())
            .collect();

        let confidence = match numbers.as_slice() {
            [novelty, feasibility, overall] => Confidence {
                novelty: *novelty,
                feasibility: *feasibility,
                overall: *overall,
            },
            _ => Confidence::default(),
        };

        Self {
            confidence,
            signal: parse_signal(trimmed),
        }
    }
}

/// Last `CONTINUE` / `CONCLUDE` keyword in the reply.
fn parse_signal(text: &str) -> Option<OracleSignal> {
    text.lines().rev().find_map(|line| {
        let upper = line.to_uppercase();
        match (upper.rfind("CONCLUDE"), upper.rfind("CONTINUE")) {
            (Some(a), Some(b)) if a > b => Some(OracleSignal::Conclude),
            (Some(_), Some(_)) => Some(OracleSignal::Continue),
            (Some(_), None) => Some(OracleSignal::Conclude),
            (None, Some(_)) => Some(OracleSignal::Continue),
            (None, None) => None,
        }
    })
}

/// Structured form of the reflection reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ConfidenceReport {
    /// Confidence (0-100) in the novelty assessment.
    pub novelty: u32,
    /// Confidence (0-100) in the feasibility assessment.
    pub feasibility: u32,
    /// Overall investigation completeness (0-100).
    pub overall: u32,
    #[serde(default)]
    pub decision: Option<OracleSignal>,
}

impl From<ConfidenceReport> for ReflectionReport {
    fn from(report: ConfidenceReport) -> Self {
        Self {
            confidence: Confidence {
                novelty: report.novelty,
                feasibility: report.feasibility,
                overall: report.overall,
            },
            signal: report.decision,
        }
    }
}
