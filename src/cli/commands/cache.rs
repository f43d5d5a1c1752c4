//! Cache command implementation.

use crate::cache::ResponseCache;
use crate::cli::{CacheAction, Output};
use crate::config::Settings;
use anyhow::Result;

/// Run the cache command.
pub fn run_cache(action: &CacheAction, settings: Settings) -> Result<()> {
    match action {
        CacheAction::Clear => {
            let path = settings.cache_path();
            if !path.exists() {
                Output::info("Cache is already empty.");
                return Ok(());
            }

            let cache = ResponseCache::open(&path, settings.cache.ttl_days)?;
            let removed = cache.clear()?;
            Output::success(&format!("Cleared {} cached responses", removed));
        }
    }

    Ok(())
}
