//! Prompt templates for Guaxinim.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub ask: AskPrompts,
    pub guide: GuidePrompts,
    pub improve: ImprovePrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

const BARISTA_SYSTEM: &str = "You are a professional coffee barista expert.";

/// Prompts for answering questions from the knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AskPrompts {
    pub system: String,
    /// Used when retrieval produced context.
    pub user: String,
    /// Used when retrieval produced nothing above the relevance threshold.
    pub user_without_context: String,
}

impl Default for AskPrompts {
    fn default() -> Self {
        Self {
            system: BARISTA_SYSTEM.to_string(),
            user: r#"Check if the following question is coffee-related:
If yes: Provide a detailed answer, using the reference material below where it is relevant and citing the article titles you rely on.
If no: Reply with 'I only answer questions about coffee.'

Reference material:
{{context}}

Question: {{question}}"#
                .to_string(),
            user_without_context: r#"Check if the following question is coffee-related:
If yes: Provide a detailed answer
If no: Reply with 'I only answer questions about coffee.'

Question: {{question}}"#
                .to_string(),
        }
    }
}

/// Prompts for step-by-step brewing guides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuidePrompts {
    pub system: String,
    pub user: String,
}

impl Default for GuidePrompts {
    fn default() -> Self {
        Self {
            system: BARISTA_SYSTEM.to_string(),
            user: r#"You are a professional coffee barista with years of experience.
You are teaching someone how to make an excellent cup of coffee using the {{method}} method.
Please provide a detailed, step-by-step guide that includes:
1. Required equipment
2. Recommended coffee-to-water ratio
3. Grind size recommendation
4. Water temperature
5. Detailed brewing steps
6. Common mistakes to avoid
7. Tips for achieving the best results

Format your response in markdown for better readability."#
                .to_string(),
        }
    }
}

/// Prompts for diagnosing a brew and suggesting improvements.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImprovePrompts {
    pub system: String,
    pub user: String,
}

impl Default for ImprovePrompts {
    fn default() -> Self {
        Self {
            system: BARISTA_SYSTEM.to_string(),
            user: "Analyze these coffee parameters and suggest improvements:\n{{parameters}}"
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let ask_path = custom_path.join("ask.toml");
            if ask_path.exists() {
                let content = std::fs::read_to_string(&ask_path)?;
                prompts.ask = toml::from_str(&content)?;
            }

            let guide_path = custom_path.join("guide.toml");
            if guide_path.exists() {
                let content = std::fs::read_to_string(&guide_path)?;
                prompts.guide = toml::from_str(&content)?;
            }

            let improve_path = custom_path.join("improve.toml");
            if improve_path.exists() {
                let content = std::fs::read_to_string(&improve_path)?;
                prompts.improve = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.ask.user.contains("{{context}}"));
        assert!(prompts.guide.user.contains("{{method}}"));
        assert!(!prompts.improve.system.is_empty());
    }

    #[test]
    fn test_render_template() {
        let template = "Brew with {{method}} at {{temp}} degrees.";
        let mut vars = HashMap::new();
        vars.insert("method".to_string(), "V60".to_string());
        vars.insert("temp".to_string(), "94".to_string());

        assert_eq!(Prompts::render(template, &vars), "Brew with V60 at 94 degrees.");
    }

    #[test]
    fn test_provided_vars_override_custom() {
        let mut custom = HashMap::new();
        custom.insert("method".to_string(), "Chemex".to_string());
        custom.insert("roaster".to_string(), "Local".to_string());
        let prompts = Prompts::load(None, Some(&custom)).unwrap();

        let mut vars = HashMap::new();
        vars.insert("method".to_string(), "Aeropress".to_string());

        let rendered = prompts.render_with_custom("{{method}} / {{roaster}}", &vars);
        assert_eq!(rendered, "Aeropress / Local");
    }

    #[test]
    fn test_custom_dir_overrides() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("guide.toml"),
            "system = \"You are terse.\"\nuser = \"Explain {{method}}.\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.guide.user, "Explain {{method}}.");
        assert_eq!(prompts.ask.system, BARISTA_SYSTEM);
    }
}
