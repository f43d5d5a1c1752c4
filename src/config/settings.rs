//! Configuration settings for Guaxinim.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub corpus: CorpusSettings,
    pub embedding: EmbeddingSettings,
    pub retrieval: RetrievalSettings,
    pub generation: GenerationSettings,
    pub cache: CacheSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Optional log file written alongside console output.
    pub log_file: Option<String>,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.guaxinim".to_string(),
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

/// Where ingested documents live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusSettings {
    /// Directory of embedded document records (`*.json`).
    pub documents_dir: String,
    /// Directory of raw processed records waiting to be embedded.
    pub raw_dir: String,
}

impl Default for CorpusSettings {
    fn default() -> Self {
        Self {
            documents_dir: "~/.guaxinim/documents".to_string(),
            raw_dir: "~/.guaxinim/raw".to_string(),
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
        }
    }
}

/// Which embedding field drives the primary similarity search.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RankingField {
    /// Rank individual chunks, with a supplementary title search.
    #[default]
    Chunks,
    /// Rank documents by summary and expand to all of their chunks.
    Summary,
}

impl std::str::FromStr for RankingField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chunks" | "chunk" => Ok(RankingField::Chunks),
            "summary" | "summaries" => Ok(RankingField::Summary),
            _ => Err(format!("Unknown ranking field: {}", s)),
        }
    }
}

impl std::fmt::Display for RankingField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RankingField::Chunks => write!(f, "chunks"),
            RankingField::Summary => write!(f, "summary"),
        }
    }
}

/// How retrieved candidates are turned into context.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ReturnMode {
    /// One block per matched chunk.
    #[default]
    Chunks,
    /// Whole documents, capped by `max_whole_files`.
    #[serde(alias = "whole_file")]
    WholeFile,
}

impl std::str::FromStr for ReturnMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chunks" | "chunk" => Ok(ReturnMode::Chunks),
            "whole-file" | "whole_file" | "whole file" | "file" => Ok(ReturnMode::WholeFile),
            _ => Err(format!("Unknown return mode: {}", s)),
        }
    }
}

impl std::fmt::Display for ReturnMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReturnMode::Chunks => write!(f, "chunks"),
            ReturnMode::WholeFile => write!(f, "whole-file"),
        }
    }
}

/// Retrieval settings. A change in any field invalidates a cached assistant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(default)]
pub struct RetrievalSettings {
    pub ranking_field: RankingField,
    pub return_mode: ReturnMode,
    /// Number of primary matches per query.
    pub k: usize,
    /// Cap on distinct documents in whole-file mode.
    pub max_whole_files: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            ranking_field: RankingField::Chunks,
            return_mode: ReturnMode::Chunks,
            k: 5,
            max_whole_files: 2,
        }
    }
}

/// Answer generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// LLM model for response generation.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Token cap for answers and suggestions.
    pub max_tokens: u32,
    /// Token cap for brewing guides.
    pub guide_max_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            max_tokens: 500,
            guide_max_tokens: 1000,
        }
    }
}

/// Persistent response cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,
    /// Path to the SQLite cache database.
    pub path: String,
    /// Days before a cached response expires.
    pub ttl_days: u32,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "~/.guaxinim/cache.db".to_string(),
            ttl_days: 30,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::GuaxinimError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("guaxinim")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    pub fn documents_dir(&self) -> PathBuf {
        Self::expand_path(&self.corpus.documents_dir)
    }

    pub fn raw_dir(&self) -> PathBuf {
        Self::expand_path(&self.corpus.raw_dir)
    }

    pub fn cache_path(&self) -> PathBuf {
        Self::expand_path(&self.cache.path)
    }

    pub fn log_file(&self) -> Option<PathBuf> {
        self.general.log_file.as_deref().map(Self::expand_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.retrieval.k, 5);
        assert_eq!(settings.retrieval.max_whole_files, 2);
        assert_eq!(settings.retrieval.ranking_field, RankingField::Chunks);
        assert_eq!(settings.cache.ttl_days, 30);
    }

    #[test]
    fn test_parse_modes() {
        assert_eq!("summary".parse::<RankingField>().unwrap(), RankingField::Summary);
        assert_eq!("whole file".parse::<ReturnMode>().unwrap(), ReturnMode::WholeFile);
        assert!("titles".parse::<RankingField>().is_err());
        assert!("pages".parse::<ReturnMode>().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [retrieval]
            ranking_field = "summary"
            return_mode = "whole-file"
            "#,
        )
        .unwrap();

        assert_eq!(settings.retrieval.ranking_field, RankingField::Summary);
        assert_eq!(settings.retrieval.return_mode, ReturnMode::WholeFile);
        assert_eq!(settings.retrieval.max_whole_files, 2);
        assert_eq!(settings.generation.model, "gpt-4o-mini");
    }

    #[test]
    fn test_invalid_mode_rejected_at_load() {
        let result: std::result::Result<Settings, _> = toml::from_str(
            r#"
            [retrieval]
            return_mode = "paragraphs"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.retrieval.k = 8;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.retrieval.k, 8);
    }
}
