//! Configuration management for interview-digest
//!
//! Stores settings in ~/.config/interview-digest/config.json. Environment
//! variables (optionally from `.env.local` / `.env`) override the file.

use crate::error::{AnalysisError, Result};
use crate::llm::{resolve, REQUEST_TIMEOUT_SECS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "interview-digest";
const DEFAULT_DATA_DIR: &str = ".";
const DEFAULT_OUTPUT_DIR: &str = "logs";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub openrouter_api_key: Option<String>,
    /// Catalog key or provider model name used when neither `--model` nor
    /// `--auto-model` is given.
    pub default_model: Option<String>,
    /// Upper bound on the output reservation sent to the model.
    pub max_output_tokens: Option<usize>,
    /// Directory holding the session/message CSV exports.
    pub data_dir: Option<PathBuf>,
    /// Parent directory for per-run output folders.
    pub output_dir: Option<PathBuf>,
    /// Deadline for the generation call in seconds.
    pub request_timeout_secs: Option<u64>,
    /// OpenRouter-compatible chat completions URL.
    pub api_url: Option<String>,
}

/// Load `.env.local` then `.env` from the working directory; variables already set win.
pub fn load_env_files() {
    for file in [".env.local", ".env"] {
        match dotenvy::from_filename(file) {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded environment file"),
            Err(err) if err.not_found() => {}
            Err(err) => tracing::warn!(file, error = %err, "could not parse environment file"),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl Config {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_DIR))
    }

    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.json"))
    }

    /// Load the config file (if any) and apply environment overrides.
    pub fn load() -> Self {
        let from_file = Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default();
        from_file.apply_env_with(|name| std::env::var(name).ok())
    }

    /// Read one config file. Missing means defaults; a corrupt file is moved aside.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(err) => {
                preserve_corrupt_config(path, &content);
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "config file was corrupted; a backup was saved and defaults were loaded"
                );
                Self::default()
            }
        }
    }

    /// Overlay values from an environment lookup.
    pub fn apply_env_with(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) =
            non_empty(var("OPENROUTER_API_KEY")).or_else(|| non_empty(var("AI_GATEWAY_API_KEY")))
        {
            self.openrouter_api_key = Some(key);
        }
        if let Some(model) = non_empty(var("DEFAULT_MODEL")) {
            self.default_model = Some(model);
        }
        if let Some(raw) = non_empty(var("MAX_OUTPUT_TOKENS")) {
            match raw.parse() {
                Ok(tokens) => self.max_output_tokens = Some(tokens),
                Err(_) => tracing::warn!(value = %raw, "ignoring non-numeric MAX_OUTPUT_TOKENS"),
            }
        }
        if let Some(raw) = non_empty(var("OPENROUTER_TIMEOUT_SECS")) {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => self.request_timeout_secs = Some(secs),
                _ => tracing::warn!(value = %raw, "ignoring invalid OPENROUTER_TIMEOUT_SECS"),
            }
        }
        if let Some(url) = non_empty(var("OPENROUTER_API_URL")) {
            self.api_url = Some(url);
        }
        if let Some(dir) = non_empty(var("INTERVIEW_DIGEST_DATA_DIR")) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(dir) = non_empty(var("INTERVIEW_DIGEST_OUTPUT_DIR")) {
            self.output_dir = Some(PathBuf::from(dir));
        }
        self
    }

    /// The OpenRouter API key, or a configuration error naming where to put one.
    pub fn api_key(&self) -> Result<&str> {
        self.openrouter_api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| AnalysisError::MissingApiKey {
                location: Self::config_location(),
            })
    }

    /// Catalog key for the configured default model, if one is set.
    ///
    /// Accepts either a catalog key or the provider model name that older
    /// `.env` files carry.
    pub fn default_model_key(&self) -> Result<Option<&'static str>> {
        self.default_model
            .as_deref()
            .map(|value| resolve(value).map(|model| model.key))
            .transpose()
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .unwrap_or(REQUEST_TIMEOUT_SECS)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }

    /// Get the config file location for display
    pub fn config_location() -> String {
        Self::config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| format!("~/.config/{}/config.json", APP_DIR))
    }
}

fn preserve_corrupt_config(path: &Path, content: &str) {
    let corrupt_path = path.with_extension("json.corrupt");
    if fs::rename(path, &corrupt_path).is_err() {
        let _ = fs::write(&corrupt_path, content);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.openrouter_api_key.is_none());
        assert_eq!(config.data_dir(), PathBuf::from("."));
        assert_eq!(config.output_dir(), PathBuf::from("logs"));
        assert_eq!(config.request_timeout_secs(), 120);
        assert_eq!(config.default_model_key().unwrap(), None);
        assert!(config.api_key().unwrap_err().is_configuration());
    }

    #[test]
    fn loads_file_and_env_overrides_it() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"openrouter_api_key":"sk-file","default_model":"grok-2","output_dir":"out"}"#,
        )
        .unwrap();

        let config = Config::load_from(&path).apply_env_with(env(&[
            ("OPENROUTER_API_KEY", "sk-env"),
            ("MAX_OUTPUT_TOKENS", "4000"),
        ]));
        assert_eq!(config.api_key().unwrap(), "sk-env");
        assert_eq!(config.default_model.as_deref(), Some("grok-2"));
        assert_eq!(config.max_output_tokens, Some(4000));
        assert_eq!(config.output_dir(), PathBuf::from("out"));
    }

    #[test]
    fn gateway_key_is_a_fallback() {
        let config = Config::default().apply_env_with(env(&[
            ("OPENROUTER_API_KEY", "  "),
            ("AI_GATEWAY_API_KEY", "gw-key"),
        ]));
        assert_eq!(config.api_key().unwrap(), "gw-key");
    }

    #[test]
    fn default_model_accepts_provider_names() {
        let config = Config::default()
            .apply_env_with(env(&[("DEFAULT_MODEL", "google/gemini-2.0-flash-exp")]));
        assert_eq!(config.default_model_key().unwrap(), Some("gemini-2.0-flash"));

        let config = Config::default().apply_env_with(env(&[("DEFAULT_MODEL", "grok-2")]));
        assert_eq!(config.default_model_key().unwrap(), Some("grok-2"));

        let config = Config::default().apply_env_with(env(&[("DEFAULT_MODEL", "mystery/model")]));
        assert!(config.default_model_key().unwrap_err().is_configuration());
    }

    #[test]
    fn timeout_and_endpoint_overrides() {
        let config = Config::default().apply_env_with(env(&[
            ("OPENROUTER_TIMEOUT_SECS", "30"),
            ("OPENROUTER_API_URL", "http://127.0.0.1:9/v1/chat/completions"),
        ]));
        assert_eq!(config.request_timeout_secs(), 30);
        assert_eq!(
            config.api_url.as_deref(),
            Some("http://127.0.0.1:9/v1/chat/completions")
        );

        let config = Config::default().apply_env_with(env(&[("OPENROUTER_TIMEOUT_SECS", "0")]));
        assert_eq!(config.request_timeout_secs(), 120);
    }

    #[test]
    fn bad_token_override_is_ignored() {
        let config = Config::default().apply_env_with(env(&[("MAX_OUTPUT_TOKENS", "lots")]));
        assert_eq!(config.max_output_tokens, None);
    }

    #[test]
    fn corrupt_file_is_preserved_and_defaults_used() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();

        let config = Config::load_from(&path);
        assert_eq!(config, Config::default());
        assert!(!path.exists());
        assert_eq!(
            fs::read_to_string(dir.path().join("config.json.corrupt")).unwrap(),
            "{not json"
        );
    }

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempdir().unwrap();
        assert_eq!(Config::load_from(&dir.path().join("absent.json")), Config::default());
    }
}
