//! Configuration loading and the provider factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use markwise_core::engine::GradingEngineConfig;
use markwise_core::shortcut::{ShortcutRule, DEFAULT_TRIGGER_PHRASES};
use markwise_core::traits::ScoringProvider;

use crate::anthropic::AnthropicScorer;
use crate::openai::OpenAiScorer;

/// Configuration for a single scoring provider.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    OpenAi {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        org_id: Option<String>,
    },
    Anthropic {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::OpenAi {
                api_key: _,
                base_url,
                org_id,
            } => f
                .debug_struct("OpenAi")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("org_id", org_id)
                .finish(),
            ProviderConfig::Anthropic {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Anthropic")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
        }
    }
}

/// Top-level markwise configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkwiseConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Default provider to use.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Default model to use.
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Sampling temperature (0.0 for reproducible grading).
    #[serde(default)]
    pub temperature: f64,
    /// Response size bound per scoring call.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Max retries on transient scoring errors.
    #[serde(default = "default_retries")]
    pub max_retries: u32,
    /// Delay between retries in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    /// Max concurrent scoring requests.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Deadline for a single scoring call in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Directory holding module and student records.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Directory where run reports are written.
    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,
    /// Instruction phrases that force full marks without scoring.
    #[serde(default = "default_shortcut_phrases")]
    pub shortcut_phrases: Vec<String>,
}

fn default_provider() -> String {
    "openai".to_string()
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_max_tokens() -> u32 {
    500
}
fn default_retries() -> u32 {
    3
}
fn default_retry_delay() -> u64 {
    1000
}
fn default_parallelism() -> usize {
    4
}
fn default_request_timeout() -> u64 {
    60
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./markwise-data")
}
fn default_report_dir() -> PathBuf {
    PathBuf::from("./markwise-reports")
}
fn default_shortcut_phrases() -> Vec<String> {
    DEFAULT_TRIGGER_PHRASES.iter().map(|p| p.to_string()).collect()
}

impl Default for MarkwiseConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            default_model: default_model(),
            temperature: 0.0,
            max_tokens: default_max_tokens(),
            max_retries: default_retries(),
            retry_delay_ms: default_retry_delay(),
            parallelism: default_parallelism(),
            request_timeout_secs: default_request_timeout(),
            data_dir: default_data_dir(),
            report_dir: default_report_dir(),
            shortcut_phrases: default_shortcut_phrases(),
        }
    }
}

impl MarkwiseConfig {
    /// Build an engine configuration, optionally overriding the model.
    pub fn engine_config(&self, model: Option<String>) -> GradingEngineConfig {
        GradingEngineConfig {
            parallelism: self.parallelism,
            model: model.unwrap_or_else(|| self.default_model.clone()),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            max_retries: self.max_retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    /// Build the shortcut rule from the configured phrases.
    pub fn shortcut_rule(&self) -> ShortcutRule {
        ShortcutRule::new(self.shortcut_phrases.iter().cloned())
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Resolve env vars in a provider config.
fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::OpenAi {
            api_key,
            base_url,
            org_id,
        } => ProviderConfig::OpenAi {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
            org_id: org_id.as_ref().map(|o| resolve_env_vars(o)),
        },
        ProviderConfig::Anthropic { api_key, base_url } => ProviderConfig::Anthropic {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `markwise.toml` in the current directory
/// 2. `~/.config/markwise/config.toml`
///
/// Environment variable overrides: `MARKWISE_OPENAI_KEY`, `MARKWISE_ANTHROPIC_KEY`.
pub fn load_config() -> Result<MarkwiseConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<MarkwiseConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("markwise.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<MarkwiseConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => MarkwiseConfig::default(),
    };

    // Apply env var overrides
    if let Ok(key) = std::env::var("MARKWISE_OPENAI_KEY") {
        config
            .providers
            .entry("openai".into())
            .or_insert(ProviderConfig::OpenAi {
                api_key: String::new(),
                base_url: None,
                org_id: None,
            });
        if let Some(ProviderConfig::OpenAi { api_key, .. }) = config.providers.get_mut("openai") {
            *api_key = key;
        }
    }

    if let Ok(key) = std::env::var("MARKWISE_ANTHROPIC_KEY") {
        config
            .providers
            .entry("anthropic".into())
            .or_insert(ProviderConfig::Anthropic {
                api_key: String::new(),
                base_url: None,
            });
        if let Some(ProviderConfig::Anthropic { api_key, .. }) =
            config.providers.get_mut("anthropic")
        {
            *api_key = key;
        }
    }

    // Resolve env vars in all provider configs
    let resolved: HashMap<String, ProviderConfig> = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();
    config.providers = resolved;

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("markwise"))
}

/// Create a scoring provider instance from its configuration.
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn ScoringProvider>> {
    match config {
        ProviderConfig::OpenAi {
            api_key,
            base_url,
            org_id,
        } => Ok(Box::new(OpenAiScorer::new(
            api_key,
            base_url.clone(),
            org_id.clone(),
        ))),
        ProviderConfig::Anthropic { api_key, base_url } => {
            Ok(Box::new(AnthropicScorer::new(api_key, base_url.clone())))
        }
    }
}
