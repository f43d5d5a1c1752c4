//! CLI output formatting utilities.

use crate::retrieval::{SearchResult, Source};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print a raw search match.
    pub fn search_result(result: &SearchResult) {
        println!(
            "\n{} {} (score: {:.2})",
            style(">>").green(),
            style(&result.title).bold(),
            result.similarity_score
        );
        if let Some(text) = result.matched_text.as_deref().or(result.summary.as_deref()) {
            println!("   {}", content_preview(text, 200));
        }
        if !result.tags.is_empty() {
            println!("   {}", style(format!("tags: {}", result.tags.join(", "))).dim());
        }
        println!("   {}", style(&result.source).dim());
    }

    /// Print a cited source.
    pub fn source(index: usize, source: &Source) {
        println!(
            "  {} {}",
            style(format!("[{}]", index)).cyan(),
            style(&source.title).bold()
        );
        println!("      {}", style(&source.url).dim());
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Flatten newlines and truncate with an ellipsis.
fn content_preview(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_chars {
        content
    } else {
        let truncated: String = content.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_preview() {
        assert_eq!(content_preview("short\ntext", 20), "short text");
        assert_eq!(content_preview("crème brûlée latte", 5), "crème...");
    }
}
