//! Configuration management.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! environment variables of the form `CITATION_AGENT__<SECTION>__<KEY>`.
//!
//! ```toml
//! [llm]
//! base_url = "https://openrouter.ai/api/v1"
//! model = "meta-llama/llama-3.1-8b-instruct"
//! max_tokens = 1000
//! temperature = 0.2
//!
//! [agent]
//! max_iterations = 10
//! auto_finish_iteration = 6
//! auto_finish_min_selections = 3
//! max_citations = 5
//!
//! [sources]
//! enabled_sources = "arxiv,semantic"
//! max_results_per_source = 5
//!
//! [http]
//! timeout_secs = 30
//! ```
//!
//! API keys may also come from `OPENAI_API_KEY` and `SEMANTIC_SCHOLAR_API_KEY`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment prefix for configuration overrides
pub const ENV_PREFIX: &str = "CITATION_AGENT";

/// Config file name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "citation-agent.toml";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Language-model endpoint settings
    pub llm: LlmConfig,

    /// Agent loop limits
    pub agent: AgentConfig,

    /// Bibliographic source settings
    pub sources: SourcesConfig,

    /// Outbound HTTP settings
    pub http: HttpConfig,
}

/// OpenAI-compatible chat completion endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Sent as `HTTP-Referer` (OpenRouter attribution)
    pub referer: Option<String>,
    /// Sent as `X-Title` (OpenRouter attribution)
    pub app_title: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "meta-llama/llama-3.1-8b-instruct".to_string(),
            api_key: None,
            max_tokens: 1000,
            temperature: 0.2,
            referer: None,
            app_title: None,
        }
    }
}

impl LlmConfig {
    /// API key from the config, falling back to `OPENAI_API_KEY`
    pub fn resolved_api_key(&self) -> Option<String> {
        non_blank(self.api_key.clone()).or_else(|| non_blank(std::env::var("OPENAI_API_KEY").ok()))
    }
}

/// Bounds on the reason/act loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Hard cap on model turns per run
    pub max_iterations: u32,
    /// Iteration from which the auto-terminate guard may fire
    pub auto_finish_iteration: u32,
    /// Selections required before the auto-terminate guard fires
    pub auto_finish_min_selections: usize,
    /// Citations returned to the caller
    pub max_citations: usize,
    /// Papers kept from each search for selection
    pub results_shown: usize,
    /// Abstract characters shown to the model per paper
    pub abstract_preview_chars: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            auto_finish_iteration: 6,
            auto_finish_min_selections: 3,
            max_citations: 5,
            results_shown: 5,
            abstract_preview_chars: 300,
        }
    }
}

/// Sources configuration
///
/// Priority rules: when `enabled_sources` is set only those sources are used;
/// `disabled_sources` always takes precedence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub enabled_sources: Option<String>,
    pub disabled_sources: Option<String>,
    pub max_results_per_source: usize,
    pub semantic_scholar_api_key: Option<String>,
    pub arxiv_base_url: Option<String>,
    pub semantic_scholar_base_url: Option<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            enabled_sources: None,
            disabled_sources: None,
            max_results_per_source: crate::models::DEFAULT_MAX_RESULTS,
            semantic_scholar_api_key: None,
            arxiv_base_url: None,
            semantic_scholar_base_url: None,
        }
    }
}

impl SourcesConfig {
    /// Whether a source id passes the enabled/disabled lists
    pub fn is_enabled(&self, id: &str) -> bool {
        if contains_id(self.disabled_sources.as_deref(), id) {
            return false;
        }
        match self.enabled_sources.as_deref() {
            Some(list) if !list.trim().is_empty() => contains_id(Some(list), id),
            _ => true,
        }
    }

    /// Semantic Scholar key from the config, falling back to `SEMANTIC_SCHOLAR_API_KEY`
    pub fn resolved_semantic_scholar_key(&self) -> Option<String> {
        non_blank(self.semantic_scholar_api_key.clone())
            .or_else(|| non_blank(std::env::var("SEMANTIC_SCHOLAR_API_KEY").ok()))
    }
}

fn contains_id(list: Option<&str>, id: &str) -> bool {
    list.map(|l| l.split(',').any(|s| s.trim().eq_ignore_ascii_case(id)))
        .unwrap_or(false)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Outbound HTTP client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl Config {
    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save configuration to a TOML file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }
}

/// Load configuration from an optional file plus environment overrides
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Locate a configuration file: `./citation-agent.toml`, then the user config directory
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    default_config_path().filter(|p| p.is_file())
}

/// `<config_dir>/citation-agent/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(env!("CARGO_PKG_NAME")).join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.agent.max_iterations, 10);
        assert_eq!(config.agent.auto_finish_iteration, 6);
        assert_eq!(config.agent.auto_finish_min_selections, 3);
        assert_eq!(config.agent.max_citations, 5);
        assert_eq!(config.sources.max_results_per_source, 5);
        assert_eq!(config.llm.max_tokens, 1000);
    }

    #[test]
    fn test_config_file_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        std::fs::write(
            &path,
            r#"
[agent]
max_iterations = 4

[sources]
enabled_sources = "arxiv"
max_results_per_source = 3

[http]
timeout_secs = 5
"#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.agent.max_iterations, 4);
        // Unspecified values keep their defaults
        assert_eq!(config.agent.auto_finish_iteration, 6);
        assert_eq!(config.sources.enabled_sources.as_deref(), Some("arxiv"));
        assert_eq!(config.sources.max_results_per_source, 3);
        assert_eq!(config.http.timeout_secs, 5);
    }

    #[test]
    fn test_config_env_override() {
        std::env::set_var("CITATION_AGENT__LLM__MODEL", "test/model-from-env");
        let config = load_config(None).unwrap();
        std::env::remove_var("CITATION_AGENT__LLM__MODEL");

        assert_eq!(config.llm.model, "test/model-from-env");
    }

    #[test]
    fn test_config_save_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.agent.max_citations = 2;
        config.save(&path).unwrap();

        let loaded = load_config(Some(&path)).unwrap();
        assert_eq!(loaded.agent.max_citations, 2);
    }

    #[test]
    fn test_config_file_nonexistent() {
        let path = PathBuf::from("/nonexistent/config.toml");
        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn test_source_filters() {
        let mut sources = SourcesConfig::default();
        assert!(sources.is_enabled("arxiv"));
        assert!(sources.is_enabled("semantic"));

        sources.enabled_sources = Some("arxiv, semantic".to_string());
        sources.disabled_sources = Some("semantic".to_string());
        assert!(sources.is_enabled("arxiv"));
        assert!(!sources.is_enabled("semantic"));
        assert!(!sources.is_enabled("pubmed"));
    }
}
