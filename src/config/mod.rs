//! Configuration module for Guaxinim.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AskPrompts, GuidePrompts, ImprovePrompts, Prompts};
pub use settings::{
    CacheSettings, CorpusSettings, EmbeddingSettings, GeneralSettings, GenerationSettings,
    PromptSettings, RankingField, RetrievalSettings, ReturnMode, Settings,
};
