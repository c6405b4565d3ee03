//! Reasoning oracle: the only seam between orchestration and a language model.
//!
//! ```text
//! infer(prompt)                 → free text
//! infer_json(prompt, schema)    → JSON value (shape not yet checked)
//! infer_structured::<T>(prompt) → T, or EvaluationError::StructuredOutput
//! ```
//!
//! No streaming and no retries: one prompt, one reply.

use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::EvaluatorConfig;
use crate::errors::EvaluationError;

const EVALUATOR_PREAMBLE: &str = "You are an expert research evaluator. You assess research \
proposals strictly against the literature you are given. Follow the requested response \
format exactly.";

/// Prompt-to-text and prompt-to-record capability.
#[async_trait]
pub trait ReasoningOracle: Send + Sync {
    async fn infer(&self, prompt: &str) -> Result<String, EvaluationError>;

    /// Ask for a JSON value conforming to `schema`.
    async fn infer_json(
        &self,
        prompt: &str,
        schema: &serde_json::Value,
    ) -> Result<serde_json::Value, EvaluationError>;
}

/// JSON schema for `T`, as shipped to the oracle.
pub fn schema_of<T: JsonSchema>() -> Result<serde_json::Value, EvaluationError> {
    serde_json::to_value(schemars::schema_for!(T)).map_err(|e| EvaluationError::Internal(e.into()))
}

/// Ask for a `T` and deserialize it; a shape mismatch is `StructuredOutput`.
pub async fn infer_structured<T>(oracle: &dyn ReasoningOracle, prompt: &str) -> Result<T, EvaluationError>
where
    T: DeserializeOwned + JsonSchema,
{
    let schema = schema_of::<T>()?;
    let value = oracle.infer_json(prompt, &schema).await?;
    serde_json::from_value(value).map_err(|e| EvaluationError::structured::<T>(e.to_string()))
}

/// Pull the JSON object out of a reply that may carry fences or prose.
pub fn extract_json_object(text: &str) -> Option<&str> {
    if let Some(start) = text.find("```json") {
        let json_start = start + 7;
        if let Some(end) = text[json_start..].find("```") {
            return Some(text[json_start..json_start + end].trim());
        }
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}

/// Append the schema instruction to a prompt.
pub fn with_schema_instruction(prompt: &str, schema: &serde_json::Value) -> String {
    format!(
        "{prompt}\n\nRespond with a single JSON object that conforms to this JSON schema. \
        Output ONLY the JSON object, no commentary.\n\n{schema}"
    )
}

// ── Rig-backed oracle ────────────────────────────────────────────────────────

/// Oracle backed by an OpenAI-compatible completions endpoint.
pub struct RigOracle {
    client: rig::providers::openai::CompletionsClient,
    model: String,
    temperature: f64,
}

impl RigOracle {
    pub fn from_config(config: &EvaluatorConfig) -> Result<Self, EvaluationError> {
        let client = config
            .client()
            .map_err(|e| EvaluationError::Configuration(e.to_string()))?;
        Ok(Self {
            client,
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ReasoningOracle for RigOracle {
    async fn infer(&self, prompt: &str) -> Result<String, EvaluationError> {
        let agent = self
            .client
            .agent(&self.model)
            .preamble(EVALUATOR_PREAMBLE)
            .temperature(self.temperature)
            .build();

        let prompt = prompt.to_string();
        let reply = agent
            .prompt(&prompt)
            .await
            .map_err(|e| EvaluationError::Inference(e.to_string()))?;

        debug!(model = %self.model, prompt_chars = prompt.len(), reply_chars = reply.len(), "oracle reply");
        Ok(reply)
    }

    async fn infer_json(
        &self,
        prompt: &str,
        schema: &serde_json::Value,
    ) -> Result<serde_json::Value, EvaluationError> {
        let raw = self.infer(&with_schema_instruction(prompt, schema)).await?;
        let json = extract_json_object(&raw).ok_or_else(|| EvaluationError::StructuredOutput {
            target: "json object",
            message: format!("no JSON object in reply: {raw}"),
        })?;
        serde_json::from_str(json).map_err(|e| EvaluationError::StructuredOutput {
            target: "json object",
            message: format!("{e}; raw: {raw}"),
        })
    }
}
