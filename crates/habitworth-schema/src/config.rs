//! Engine configuration, loaded from a YAML file.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

fn default_gemini_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_generation_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-004".to_string()
}

fn default_chroma_base() -> String {
    "http://localhost:8000".to_string()
}

fn default_collection() -> String {
    "habit_facts".to_string()
}

/// Generative endpoint settings. The API key and model identifiers are
/// configuration, never core logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    #[serde(default = "default_generation_model")]
    pub model: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_gemini_base")]
    pub base_url: String,
}

/// Vector-store endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChromaConfig {
    #[serde(default = "default_chroma_base")]
    pub base_url: String,
    #[serde(default = "default_collection")]
    pub collection: String,
}

impl Default for ChromaConfig {
    fn default() -> Self {
        Self {
            base_url: default_chroma_base(),
            collection: default_collection(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub chroma: ChromaConfig,
}

impl EngineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: EngineConfig =
            serde_yaml::from_str(&raw).with_context(|| "parsing engine config")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_minimal_config_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "gemini:\n  api_key: test-key").unwrap();

        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.gemini.api_key, "test-key");
        assert_eq!(config.gemini.model, "gemini-2.0-flash");
        assert_eq!(config.gemini.embedding_model, "text-embedding-004");
        assert_eq!(config.chroma.base_url, "http://localhost:8000");
        assert_eq!(config.chroma.collection, "habit_facts");
    }

    #[test]
    fn load_missing_file_reports_path() {
        let err = EngineConfig::load("/nonexistent/engine.yaml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/engine.yaml"));
    }

    #[test]
    fn load_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "gemini:\n  api_key: k\n  model: gemini-2.5-pro\nchroma:\n  base_url: http://chroma:8000\n  collection: facts"
        )
        .unwrap();

        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.gemini.model, "gemini-2.5-pro");
        assert_eq!(config.chroma.collection, "facts");
    }
}
