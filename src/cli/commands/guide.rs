//! Guide command implementation.

use super::{plain_assistant, preflight};
use crate::assistant::BREWING_METHODS;
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the guide command. Without a method, list the known ones.
pub async fn run_guide(method: Option<&str>, settings: Settings) -> Result<()> {
    let Some(method) = method else {
        Output::header("Brewing methods");
        for method in BREWING_METHODS {
            Output::list_item(method);
        }
        return Ok(());
    };

    preflight(Operation::Ask)?;

    let assistant = plain_assistant(&settings)?;

    let spinner = Output::spinner(&format!("Writing a {} guide...", method));
    let guide = assistant.brewing_guide(method).await;
    spinner.finish_and_clear();

    match guide {
        Ok(guide) => println!("\n{}\n", guide),
        Err(e) => {
            Output::error(&format!("Failed to get guide: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
