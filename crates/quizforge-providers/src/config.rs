//! Service configuration and factory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizforge_core::model::DEFAULT_QUESTION_COUNT;
use quizforge_core::service::QuestionService;

use crate::gemini::GeminiService;

/// Gemini service settings.
///
/// Note: Custom Debug impl masks the API key to prevent accidental
/// exposure in logs.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key; `${VAR}` references are resolved against the environment.
    #[serde(default)]
    pub api_key: String,
    /// Override for the API endpoint (used in tests).
    #[serde(default)]
    pub base_url: Option<String>,
    /// Model id; defaults to the service's stock model.
    #[serde(default)]
    pub model: Option<String>,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

/// Top-level quizforge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizforgeConfig {
    /// Gemini service settings.
    #[serde(default)]
    pub gemini: GeminiConfig,
    /// Questions per quiz when the command line does not say.
    #[serde(default = "default_question_count")]
    pub default_question_count: u32,
    /// Directory holding quiz history, topic frequencies, and preferences.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_question_count() -> u32 {
    DEFAULT_QUESTION_COUNT
}
fn default_data_dir() -> PathBuf {
    std::env::var("HOME")
        .map(|home| {
            PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("quizforge")
        })
        .unwrap_or_else(|_| PathBuf::from("./quizforge-data"))
}

impl Default for QuizforgeConfig {
    fn default() -> Self {
        Self {
            gemini: GeminiConfig::default(),
            default_question_count: default_question_count(),
            data_dir: default_data_dir(),
        }
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

/// Resolve env vars in the Gemini config.
fn resolve_gemini_config(config: &GeminiConfig) -> GeminiConfig {
    GeminiConfig {
        api_key: resolve_env_vars(&config.api_key),
        base_url: config.base_url.as_ref().map(|u| resolve_env_vars(u)),
        model: config.model.as_ref().map(|m| resolve_env_vars(m)),
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizforge.toml` in the current directory
/// 2. `~/.config/quizforge/config.toml`
///
/// Environment variable override: `QUIZFORGE_GEMINI_KEY`.
pub fn load_config() -> Result<QuizforgeConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizforgeConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizforge.toml");
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
            toml::from_str::<QuizforgeConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizforgeConfig::default(),
    };

    // Apply env var override
    if let Ok(key) = std::env::var("QUIZFORGE_GEMINI_KEY") {
        config.gemini.api_key = key;
    }

    config.gemini = resolve_gemini_config(&config.gemini);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizforge"))
}

/// Create the question service from its configuration.
pub fn create_service(config: &QuizforgeConfig) -> Result<Box<dyn QuestionService>> {
    let api_key = config.gemini.api_key.trim();
    if api_key.is_empty() {
        anyhow::bail!(
            "Gemini API key not configured; set QUIZFORGE_GEMINI_KEY or add it to quizforge.toml"
        );
    }
    Ok(Box::new(GeminiService::new(
        api_key,
        config.gemini.base_url.clone(),
        config.gemini.model.clone(),
    )))
}
