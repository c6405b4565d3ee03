use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use assessment::debate::EvaluationMetric;
use assessment::literature::{search_many, RawPapers, SemanticScholarClient};
use assessment::persistence::JsonlRowSink;
use evaluator_agents::{
    discover_literature, evaluate_metrics, run_debate, run_linear, DecisionMode, EvaluationReport, EvaluationRequest,
    EvaluatorConfig, ReasoningOracle, RigOracle, RunMode,
};

#[derive(Debug, Parser)]
#[command(name = "evaluator-agents", version, about = "Evaluate research proposals with reasoning agents")]
struct Cli {
    /// TOML configuration file (overrides environment defaults).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Append one JSON row per run to this file.
    #[arg(long, global = true)]
    log_path: Option<PathBuf>,

    /// Print the report as JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[arg(long, global = true, value_enum)]
    decision_mode: Option<DecisionMode>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Plan, investigate and reflect, then score.
    Linear {
        #[command(flatten)]
        input: InputArgs,
        /// Investigation ceiling.
        #[arg(long)]
        max_iterations: Option<u32>,
    },
    /// Debate a single metric.
    Debate {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, default_value = "novelty")]
        metric: EvaluationMetric,
        /// Moderated rounds before the ceiling.
        #[arg(long)]
        max_iterations: Option<u32>,
    },
    /// Debate every requested metric concurrently.
    Panel {
        #[command(flatten)]
        input: InputArgs,
        /// Repeat to select metrics; all three when omitted.
        #[arg(long = "metric")]
        metrics: Vec<EvaluationMetric>,
        #[arg(long)]
        max_iterations: Option<u32>,
    },
}

#[derive(Debug, Args)]
struct InputArgs {
    /// Proposal text, or `@path` to read it from a file.
    #[arg(long)]
    proposal: String,

    /// JSON file of papers (flat list or query-keyed search results).
    #[arg(long, conflicts_with = "query")]
    papers: Option<PathBuf>,

    /// Literature search query; repeat for several. Planned from the
    /// proposal when neither this nor `--papers` is given.
    #[arg(long)]
    query: Vec<String>,

    /// Label recorded in logs and persisted rows.
    #[arg(long, default_value = "")]
    label: String,
}

impl InputArgs {
    async fn into_request(self, oracle: &dyn ReasoningOracle) -> Result<EvaluationRequest> {
        let proposal = match self.proposal.strip_prefix('@') {
            Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading proposal from {path}"))?,
            None => self.proposal,
        };
        if proposal.trim().is_empty() {
            bail!("proposal must not be empty");
        }

        let papers = if let Some(path) = &self.papers {
            let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            RawPapers::from_json(&text).with_context(|| format!("parsing papers from {}", path.display()))?
        } else if !self.query.is_empty() {
            let client = SemanticScholarClient::default();
            search_many(&client, &self.query).await
        } else {
            let client = SemanticScholarClient::default();
            discover_literature(oracle, &client, &proposal)
                .await
                .context("planning literature queries")?
        };
        if papers.iter().next().is_none() {
            warn!("no papers retrieved; evaluating without literature");
        }

        Ok(EvaluationRequest::new(proposal, &papers).with_label(self.label))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let mut config = EvaluatorConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(path) = cli.log_path {
        config.log_path = Some(path);
    }
    if let Some(mode) = cli.decision_mode {
        config.decision_mode = mode;
    }

    let oracle: Arc<dyn ReasoningOracle> =
        Arc::new(RigOracle::from_config(&config).context("building reasoning oracle")?);
    info!(
        model = %config.model,
        base_url = %config.base_url,
        mode = %config.decision_mode,
        "evaluator starting"
    );

    let (report, failure) = match cli.command {
        Command::Linear { input, max_iterations } => {
            if let Some(max) = max_iterations {
                config.linear.max_iterations = max;
            }
            config.validate().context("validating configuration")?;
            let request = input.into_request(oracle.as_ref()).await?;
            match run_linear(&request, oracle.as_ref(), &config).await {
                Ok(state) => (EvaluationReport::from_linear(&request, &state), None),
                Err(e) => (
                    EvaluationReport::from_failure(&request, RunMode::Linear, "overall", &e),
                    Some(e),
                ),
            }
        }
        Command::Debate {
            input,
            metric,
            max_iterations,
        } => {
            if let Some(max) = max_iterations {
                config.debate_max_iterations = max;
            }
            config.validate().context("validating configuration")?;
            let request = input.into_request(oracle.as_ref()).await?;
            match run_debate(&request, metric, oracle.as_ref(), &config).await {
                Ok(state) => (EvaluationReport::from_debate(&request, &state), None),
                Err(e) => (
                    EvaluationReport::from_failure(&request, RunMode::Debate, metric.as_str(), &e),
                    Some(e),
                ),
            }
        }
        Command::Panel {
            input,
            metrics,
            max_iterations,
        } => {
            if let Some(max) = max_iterations {
                config.debate_max_iterations = max;
            }
            config.validate().context("validating configuration")?;
            let metrics = if metrics.is_empty() {
                EvaluationMetric::ALL.to_vec()
            } else {
                metrics
            };
            let request = input.into_request(oracle.as_ref()).await?;
            let panel = evaluate_metrics(&request, &metrics, oracle.clone(), &config).await;
            if !cli.json {
                for line in panel.status_lines() {
                    println!("{line}");
                }
            }
            (EvaluationReport::from_panel(&request, &panel), None)
        }
    };

    if let Some(path) = &config.log_path {
        let mut sink = JsonlRowSink::open(path).context("opening evaluation log")?;
        report.persist(&mut sink).context("writing evaluation log")?;
        info!(path = %path.display(), "evaluation row appended");
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report).context("encoding report")?);
    } else {
        println!("{}", report.render_text());
    }

    match failure {
        Some(e) => Err(e).context("evaluation failed"),
        None => Ok(()),
    }
}
