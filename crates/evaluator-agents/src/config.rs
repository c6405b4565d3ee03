//! Runtime configuration for evaluation runs.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. Values in a TOML file passed to [`EvaluatorConfig::load`]
//! 2. Environment variables (`EVAL_*`)
//! 3. Built-in defaults
//!
//! Any field missing from the file falls back to the environment, then to
//! the built-in default.

use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use assessment::debate::DEFAULT_MAX_ITERATIONS as DEFAULT_DEBATE_MAX_ITERATIONS;
use assessment::linear::routing::DEFAULT_MAX_ITERATIONS as LINEAR_ITERATION_CEILING;
use assessment::linear::LinearPolicy;
use serde::{Deserialize, Serialize};

use crate::errors::EvaluationError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TEMPERATURE: f64 = 0.0;
/// One worker per metric.
const DEFAULT_PANEL_WORKERS: usize = 3;
/// Upper bound on moderated rounds accepted from config or the CLI.
const MAX_DEBATE_ITERATIONS: u32 = 20;

const ENV_BASE_URL: &str = "EVAL_BASE_URL";
const ENV_API_KEY: &str = "EVAL_API_KEY";
const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
const ENV_MODEL: &str = "EVAL_MODEL";
const ENV_TEMPERATURE: &str = "EVAL_TEMPERATURE";
const ENV_DEBATE_MAX_ITERATIONS: &str = "EVAL_DEBATE_MAX_ITERATIONS";
const ENV_PANEL_WORKERS: &str = "EVAL_PANEL_WORKERS";
const ENV_DECISION_MODE: &str = "EVAL_DECISION_MODE";

/// How control decisions are requested from the oracle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DecisionMode {
    /// Ask for the sentence forms (`TOOL: ...`, `VERDICT: ...`) and parse them.
    #[default]
    FreeText,
    /// Ask for tagged JSON decisions; fall back to safe defaults on a bad reply.
    Structured,
}

impl FromStr for DecisionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "free_text" | "freetext" | "text" => Ok(Self::FreeText),
            "structured" | "json" => Ok(Self::Structured),
            other => Err(format!("unknown decision mode: {other}")),
        }
    }
}

impl std::fmt::Display for DecisionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FreeText => write!(f, "free_text"),
            Self::Structured => write!(f, "structured"),
        }
    }
}

/// Top-level configuration shared by the CLI and the orchestrators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// OpenAI-compatible API base URL.
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f64,
    pub linear: LinearPolicy,
    /// Moderated rounds before the debate ceiling applies.
    pub debate_max_iterations: u32,
    /// Concurrent debates in a panel.
    pub panel_workers: usize,
    pub decision_mode: DecisionMode,
    /// Append-only evaluation log; `None` disables logging.
    pub log_path: Option<PathBuf>,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            base_url: env::var(ENV_BASE_URL).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            api_key: env::var(ENV_API_KEY)
                .or_else(|_| env::var(ENV_OPENAI_API_KEY))
                .unwrap_or_default(),
            model: env::var(ENV_MODEL).unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            temperature: env_parse(ENV_TEMPERATURE).unwrap_or(DEFAULT_TEMPERATURE),
            linear: LinearPolicy::default(),
            debate_max_iterations: env_parse(ENV_DEBATE_MAX_ITERATIONS)
                .unwrap_or(DEFAULT_DEBATE_MAX_ITERATIONS),
            panel_workers: env_parse(ENV_PANEL_WORKERS).unwrap_or(DEFAULT_PANEL_WORKERS),
            decision_mode: env_parse(ENV_DECISION_MODE).unwrap_or_default(),
            log_path: None,
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

impl EvaluatorConfig {
    /// Environment and defaults only.
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Parse a TOML document on top of the environment defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, EvaluationError> {
        toml::from_str(text).map_err(|e| EvaluationError::Configuration(format!("invalid config: {e}")))
    }

    /// Load from an optional TOML file and validate the result.
    pub fn load(path: Option<&Path>) -> Result<Self, EvaluationError> {
        let config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    EvaluationError::Configuration(format!("cannot read {}: {e}", path.display()))
                })?;
                Self::from_toml_str(&text)?
            }
            None => Self::from_env(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate all fields.
    pub fn validate(&self) -> Result<(), EvaluationError> {
        let invalid = |msg: String| Err(EvaluationError::Configuration(msg));

        if self.model.trim().is_empty() {
            return invalid("model must not be empty".to_string());
        }
        if self.base_url.trim().is_empty() {
            return invalid("base_url must not be empty".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return invalid(format!("temperature must be in [0, 2], got {}", self.temperature));
        }
        if !(1..=LINEAR_ITERATION_CEILING).contains(&self.linear.max_iterations) {
            return invalid(format!(
                "linear.max_iterations must be in [1, {LINEAR_ITERATION_CEILING}], got {}",
                self.linear.max_iterations
            ));
        }
        if self.debate_max_iterations > MAX_DEBATE_ITERATIONS {
            return invalid(format!(
                "debate_max_iterations must be at most {MAX_DEBATE_ITERATIONS}, got {}",
                self.debate_max_iterations
            ));
        }
        if self.linear.confidence_threshold > 100 {
            return invalid(format!(
                "linear.confidence_threshold must be in [0, 100], got {}",
                self.linear.confidence_threshold
            ));
        }
        if self.panel_workers == 0 {
            return invalid("panel_workers must be > 0".to_string());
        }
        Ok(())
    }

    /// Build a Rig OpenAI-compatible client for the configured endpoint.
    pub fn client(&self) -> anyhow::Result<rig::providers::openai::CompletionsClient> {
        rig::providers::openai::CompletionsClient::builder()
            .api_key(&self.api_key)
            .base_url(&self.base_url)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build client for {}: {e}", self.base_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let mut cfg = EvaluatorConfig::default();
        // Environment may override the model; pin it so the check is stable.
        cfg.model = DEFAULT_MODEL.to_string();
        cfg.temperature = DEFAULT_TEMPERATURE;
        cfg.panel_workers = DEFAULT_PANEL_WORKERS;
        cfg.validate().expect("default config should be valid");
    }

    #[test]
    fn toml_overrides_selected_fields() {
        let cfg = EvaluatorConfig::from_toml_str(
            r#"
            model = "local-reasoner"
            temperature = 0.3
            debate_max_iterations = 5
            decision_mode = "structured"

            [linear]
            max_iterations = 2
            confidence_threshold = 60
            "#,
        )
        .unwrap();
        assert_eq!(cfg.model, "local-reasoner");
        assert_eq!(cfg.debate_max_iterations, 5);
        assert_eq!(cfg.decision_mode, DecisionMode::Structured);
        assert_eq!(cfg.linear.max_iterations, 2);
        assert_eq!(cfg.linear.confidence_threshold, 60);
    }

    #[test]
    fn malformed_toml_is_configuration_error() {
        let err = EvaluatorConfig::from_toml_str("temperature = \"hot\"").unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn zero_panel_workers_rejected() {
        let mut cfg = EvaluatorConfig::from_toml_str("model = \"m\"").unwrap();
        cfg.panel_workers = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn threshold_over_100_rejected() {
        let mut cfg = EvaluatorConfig::from_toml_str("model = \"m\"\ntemperature = 0.0").unwrap();
        cfg.panel_workers = 1;
        cfg.linear.confidence_threshold = 101;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn linear_ceiling_capped_at_four() {
        let mut cfg = EvaluatorConfig::from_toml_str("model = \"m\"\ntemperature = 0.0").unwrap();
        cfg.panel_workers = 1;
        cfg.debate_max_iterations = 3;
        cfg.linear.max_iterations = 4;
        assert!(cfg.validate().is_ok());
        cfg.linear.max_iterations = 5;
        assert!(matches!(cfg.validate(), Err(EvaluationError::Configuration(_))));
        cfg.linear.max_iterations = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn huge_debate_ceiling_rejected() {
        let mut cfg = EvaluatorConfig::from_toml_str("model = \"m\"\ntemperature = 0.0").unwrap();
        cfg.panel_workers = 1;
        cfg.debate_max_iterations = MAX_DEBATE_ITERATIONS;
        assert!(cfg.validate().is_ok());
        cfg.debate_max_iterations = u32::MAX;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("debate_max_iterations"));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("evaluator.toml");
        std::fs::write(&path, "model = \"file-model\"\ntemperature = 0.1\npanel_workers = 2\n").unwrap();
        let cfg = EvaluatorConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.model, "file-model");
        assert_eq!(cfg.panel_workers, 2);
    }

    #[test]
    fn load_missing_file_fails() {
        let err = EvaluatorConfig::load(Some(Path::new("/nonexistent/evaluator.toml"))).unwrap_err();
        assert!(matches!(err, EvaluationError::Configuration(_)));
    }

    #[test]
    fn decision_mode_parsing() {
        assert_eq!("free-text".parse::<DecisionMode>().unwrap(), DecisionMode::FreeText);
        assert_eq!("JSON".parse::<DecisionMode>().unwrap(), DecisionMode::Structured);
        assert!("voice".parse::<DecisionMode>().is_err());
    }
}
