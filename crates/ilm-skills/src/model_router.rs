//! Model Router: sends the fallback prompt to an LLM (mock or live completions API) and returns
//! the generated text. Failures never escape: they become [`APOLOGY_ANSWER`].

use ilm_core::{AnswerGenerator, CoreConfig, LlmMode, DEFAULT_PROMPT_PREAMBLE};
use serde_json::{json, Value};

const GENERATOR_NAME: &str = "ModelRouter";
const COMPLETIONS_PATH: &str = "/completions";

/// Fixed user-facing answer when the external model cannot be reached or misbehaves.
pub const APOLOGY_ANSWER: &str = "I'm sorry, something went wrong. Please try again later.";

/// Why a live completion failed. Logged, then converted to [`APOLOGY_ANSWER`].
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("no API key configured (set llm_api_key or OPENAI_API_KEY)")]
    MissingApiKey,
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("completions API returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed completions response: {0}")]
    MalformedResponse(String),
}

impl GenerationError {
    /// Short machine-readable kind for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::MissingApiKey => "missing_api_key",
            GenerationError::Http { .. } => "http",
            GenerationError::Status { .. } => "status",
            GenerationError::MalformedResponse(_) => "malformed_response",
        }
    }
}

/// Routes the fallback prompt to a mock LLM or a live OpenAI-compatible completions API.
pub struct ModelRouter {
    mode: LlmMode,
    api_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    temperature: f32,
    preamble: String,
    client: reqwest::Client,
}

impl ModelRouter {
    /// Mock router with the default prompt and sampling settings.
    pub fn new() -> Self {
        Self::from_config(&CoreConfig::default())
    }

    pub fn from_config(config: &CoreConfig) -> Self {
        Self {
            mode: config.llm_mode,
            api_url: config.llm_api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key(),
            model: config.llm_model.clone(),
            max_tokens: config.llm_max_tokens,
            temperature: config.llm_temperature,
            preamble: config.prompt_preamble.clone(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_mode(mut self, mode: LlmMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key.filter(|k| !k.trim().is_empty());
        self
    }

    pub fn mode(&self) -> LlmMode {
        self.mode
    }

    /// Fixed prompt template embedding the raw question.
    pub fn build_prompt(&self, question: &str) -> String {
        let preamble = if self.preamble.trim().is_empty() {
            DEFAULT_PROMPT_PREAMBLE
        } else {
            self.preamble.as_str()
        };
        format!("{}\n\nQuestion: {}\nAnswer:", preamble, question)
    }

    /// Mock LLM: deterministic "generated" answer derived from the prompt's question line.
    fn mock_generate(&self, prompt: &str) -> String {
        let question = prompt
            .split("Question:")
            .nth(1)
            .and_then(|s| s.lines().next())
            .map(str::trim)
            .unwrap_or("");
        let mut preview: String = question.chars().take(80).collect();
        if question.chars().count() > 80 {
            preview.push('…');
        }
        format!(
            "[Generated – Mock LLM] No curated answer matched \"{}\". Enable live mode for a model-generated answer.",
            preview
        )
    }

    /// Live completion: POST `{api_url}/completions` with `{model, prompt, max_tokens, temperature}`
    /// and return `choices[0].text`, trimmed.
    async fn live_generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let key = self.api_key.as_deref().ok_or(GenerationError::MissingApiKey)?;
        let url = format!("{}{}", self.api_url, COMPLETIONS_PATH);
        let body = json!({
            "model": self.model,
            "prompt": prompt,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
        });

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", key))
            .json(&body)
            .send()
            .await
            .map_err(|source| GenerationError::Http {
                url: url.clone(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;
        let text = json["choices"]
            .get(0)
            .and_then(|choice| choice["text"].as_str())
            .ok_or_else(|| GenerationError::MalformedResponse("missing choices[0].text".into()))?;
        Ok(text.trim().to_string())
    }

    /// Fallible generation for the configured mode. [`AnswerGenerator::generate`] wraps this
    /// and never fails.
    pub async fn complete(&self, question: &str) -> Result<String, GenerationError> {
        let prompt = self.build_prompt(question);
        match self.mode {
            LlmMode::Mock => Ok(self.mock_generate(&prompt)),
            LlmMode::Live => self.live_generate(&prompt).await,
        }
    }
}

impl Default for ModelRouter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl AnswerGenerator for ModelRouter {
    fn name(&self) -> &str {
        GENERATOR_NAME
    }

    async fn generate(&self, question: &str) -> String {
        match self.complete(question).await {
            Ok(answer) => {
                tracing::info!(
                    target: "ilm::model_router",
                    mode = self.mode.as_str(),
                    chars = answer.len(),
                    "Model answer generated"
                );
                answer
            }
            Err(e) => {
                tracing::error!(
                    target: "ilm::model_router",
                    mode = self.mode.as_str(),
                    kind = e.kind(),
                    error = %e,
                    "Error with completions API"
                );
                APOLOGY_ANSWER.to_string()
            }
        }
    }
}
