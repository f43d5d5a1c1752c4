//! Pre-flight checks before provider calls.
//!
//! Validates configuration up front so commands fail before loading the
//! corpus rather than on the first API request.

use crate::error::{GuaxinimError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Generation needs the API key.
    Ask,
    /// Query embedding needs the API key.
    Search,
    /// Ingestion embeds every record.
    Embed,
    /// Tag browsing reads the corpus only.
    Browse,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation) -> Result<()> {
    match operation {
        Operation::Ask | Operation::Search | Operation::Embed => check_api_key(),
        Operation::Browse => Ok(()),
    }
}

/// Check if OpenAI API key is configured.
fn check_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.trim().is_empty() => Ok(()),
        Ok(_) => Err(GuaxinimError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(GuaxinimError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}
