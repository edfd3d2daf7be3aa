//! Shared configuration used across all ilm crates.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default LexicalMatcher cutoff on the 0–100 partial-ratio scale.
pub const DEFAULT_FUZZY_CUTOFF: f64 = 60.0;

/// Default number of shared words the KeywordMatcher requires.
pub const DEFAULT_KEYWORD_MIN_OVERLAP: usize = 2;

/// Longest accepted question, in characters after trimming.
pub const DEFAULT_MAX_QUESTION_CHARS: usize = 1000;

/// First line of the fallback prompt template.
pub const DEFAULT_PROMPT_PREAMBLE: &str = "The following is a Q&A system based on Islamic knowledge.";

const DEFAULT_CONFIG_PATH: &str = "config/ilm.toml";
const ENV_CONFIG_PATH: &str = "ILM_CONFIG";
const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";

/// Mode for LLM invocation: mock (deterministic offline generation) or live (calls the completions API).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmMode {
    #[default]
    Mock,
    Live,
}

impl LlmMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmMode::Mock => "mock",
            LlmMode::Live => "live",
        }
    }
}

/// Global application configuration (gateway, knowledge base, matchers, fallback model).
/// Load from TOML or env.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Application identity reported by `/v1/status`.
    pub app_name: String,
    /// HTTP port for the gateway.
    pub port: u16,
    /// Directory scanned for `*.json` record sources at startup.
    pub data_dir: String,

    /// If true, the gateway serves `index.html` from `frontend_dir` at `/`.
    #[serde(default)]
    pub frontend_enabled: bool,
    #[serde(default)]
    pub frontend_dir: String,

    /// LexicalMatcher threshold (0–100).
    pub fuzzy_cutoff: f64,
    /// KeywordMatcher threshold (shared lowercase words).
    pub keyword_min_overlap: usize,
    /// Questions longer than this are rejected before any matching runs.
    pub max_question_chars: usize,

    pub llm_mode: LlmMode,
    /// Base URL of an OpenAI-compatible API (the `/completions` path is appended).
    pub llm_api_url: String,
    /// Bearer key; when unset, `OPENAI_API_KEY` from the environment is used.
    #[serde(default)]
    pub llm_api_key: Option<String>,
    pub llm_model: String,
    pub llm_max_tokens: u32,
    pub llm_temperature: f32,
    pub prompt_preamble: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            app_name: "Ilm Q&A".to_string(),
            port: 5000,
            data_dir: "data".to_string(),
            frontend_enabled: true,
            frontend_dir: "templates".to_string(),
            fuzzy_cutoff: DEFAULT_FUZZY_CUTOFF,
            keyword_min_overlap: DEFAULT_KEYWORD_MIN_OVERLAP,
            max_question_chars: DEFAULT_MAX_QUESTION_CHARS,
            llm_mode: LlmMode::Mock,
            llm_api_url: "https://api.openai.com/v1".to_string(),
            llm_api_key: None,
            llm_model: "gpt-4".to_string(),
            llm_max_tokens: 150,
            llm_temperature: 0.7,
            prompt_preamble: DEFAULT_PROMPT_PREAMBLE.to_string(),
        }
    }
}

impl CoreConfig {
    /// Load config from file and environment. Precedence: env `ILM__*` > file (`ILM_CONFIG` path or
    /// `config/ilm.toml`) > defaults. A missing file is not an error.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path = std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(config_path)
    }

    /// Same as [`CoreConfig::load`] but reads the given file (if it exists) instead of the default path.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let d = Self::default();
        let builder = config::Config::builder()
            .set_default("app_name", d.app_name)?
            .set_default("port", i64::from(d.port))?
            .set_default("data_dir", d.data_dir)?
            .set_default("frontend_enabled", d.frontend_enabled)?
            .set_default("frontend_dir", d.frontend_dir)?
            .set_default("fuzzy_cutoff", d.fuzzy_cutoff)?
            .set_default("keyword_min_overlap", d.keyword_min_overlap as i64)?
            .set_default("max_question_chars", d.max_question_chars as i64)?
            .set_default("llm_mode", d.llm_mode.as_str())?
            .set_default("llm_api_url", d.llm_api_url)?
            .set_default("llm_model", d.llm_model)?
            .set_default("llm_max_tokens", i64::from(d.llm_max_tokens))?
            .set_default("llm_temperature", f64::from(d.llm_temperature))?
            .set_default("prompt_preamble", d.prompt_preamble)?;

        let path = path.as_ref();
        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        let built = builder
            .add_source(
                config::Environment::with_prefix("ILM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        built.try_deserialize()
    }

    /// Effective API key for live mode: the configured key, else `OPENAI_API_KEY`.
    pub fn api_key(&self) -> Option<String> {
        self.llm_api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(ENV_OPENAI_API_KEY).ok().filter(|k| !k.trim().is_empty()))
    }

    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    /// Location of the landing page served at `/`.
    pub fn index_file(&self) -> PathBuf {
        Path::new(&self.frontend_dir).join("index.html")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = CoreConfig::load_from(dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.data_dir, "data");
        assert_eq!(cfg.llm_mode, LlmMode::Mock);
        assert_eq!(cfg.llm_model, "gpt-4");
        assert_eq!(cfg.llm_max_tokens, 150);
        assert!((cfg.llm_temperature - 0.7).abs() < 1e-6);
        assert!((cfg.fuzzy_cutoff - DEFAULT_FUZZY_CUTOFF).abs() < f64::EPSILON);
        assert_eq!(cfg.keyword_min_overlap, DEFAULT_KEYWORD_MIN_OVERLAP);
        assert_eq!(cfg.max_question_chars, DEFAULT_MAX_QUESTION_CHARS);
        assert_eq!(cfg.prompt_preamble, DEFAULT_PROMPT_PREAMBLE);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ilm.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            r#"
app_name = "Fiqh Desk"
port = 8080
data_dir = "/srv/qa"
llm_mode = "live"
llm_model = "gpt-4o-mini"
fuzzy_cutoff = 75.5
keyword_min_overlap = 3
max_question_chars = 280
"#
        )
        .unwrap();

        let cfg = CoreConfig::load_from(&path).unwrap();
        assert_eq!(cfg.app_name, "Fiqh Desk");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.data_path(), PathBuf::from("/srv/qa"));
        assert_eq!(cfg.llm_mode, LlmMode::Live);
        assert_eq!(cfg.llm_model, "gpt-4o-mini");
        assert!((cfg.fuzzy_cutoff - 75.5).abs() < f64::EPSILON);
        assert_eq!(cfg.keyword_min_overlap, 3);
        assert_eq!(cfg.max_question_chars, 280);
        // untouched keys keep their defaults
        assert_eq!(cfg.llm_max_tokens, 150);
        assert_eq!(cfg.frontend_dir, "templates");
    }

    #[test]
    fn test_configured_api_key_wins() {
        let cfg = CoreConfig {
            llm_api_key: Some("sk-configured".to_string()),
            ..CoreConfig::default()
        };
        assert_eq!(cfg.api_key().as_deref(), Some("sk-configured"));
    }

    #[test]
    fn test_index_file_under_frontend_dir() {
        let cfg = CoreConfig {
            frontend_dir: "web".to_string(),
            ..CoreConfig::default()
        };
        assert_eq!(cfg.index_file(), Path::new("web").join("index.html"));
    }
}
