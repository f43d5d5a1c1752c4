//! Interactive question session.
//!
//! Every line is answered independently. Slash commands change the
//! retrieval settings; the session rebuilds the assistant when they do.

use super::{preflight, session};
use crate::cli::preflight::Operation;
use crate::cli::{Output, RetrievalArgs};
use crate::config::{RankingField, RetrievalSettings, ReturnMode, Settings};
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

const HELP: &str = "Commands: /field chunks|summary, /mode chunks|whole-file, /max N, /settings, exit";

/// What to do with one line of chat input.
#[derive(Debug, PartialEq)]
enum Input {
    Question(String),
    /// Retrieval settings were updated.
    Reconfigured,
    Show,
    Help,
    Invalid(String),
    Exit,
    Empty,
}

/// Interpret a line, applying slash commands to `settings`.
fn interpret(line: &str, settings: &mut RetrievalSettings) -> Input {
    let line = line.trim();

    if line.is_empty() {
        return Input::Empty;
    }
    if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
        return Input::Exit;
    }
    let Some(command) = line.strip_prefix('/') else {
        return Input::Question(line.to_string());
    };

    let (name, arg) = command
        .split_once(char::is_whitespace)
        .map(|(n, a)| (n, a.trim()))
        .unwrap_or((command, ""));

    match name {
        "field" => match arg.parse::<RankingField>() {
            Ok(field) => {
                settings.ranking_field = field;
                Input::Reconfigured
            }
            Err(e) => Input::Invalid(e),
        },
        "mode" => match arg.parse::<ReturnMode>() {
            Ok(mode) => {
                settings.return_mode = mode;
                Input::Reconfigured
            }
            Err(e) => Input::Invalid(e),
        },
        "max" => match arg.parse::<usize>() {
            Ok(max) if max > 0 => {
                settings.max_whole_files = max;
                Input::Reconfigured
            }
            _ => Input::Invalid(format!("Expected a positive number, got '{}'", arg)),
        },
        "settings" => Input::Show,
        "help" => Input::Help,
        _ => Input::Invalid(format!("Unknown command: /{}", name)),
    }
}

fn show(settings: &RetrievalSettings) {
    Output::kv("field", &settings.ranking_field.to_string());
    Output::kv("mode", &settings.return_mode.to_string());
    Output::kv("k", &settings.k.to_string());
    Output::kv("max files", &settings.max_whole_files.to_string());
}

/// Run the interactive chat command.
pub async fn run_chat(retrieval: &RetrievalArgs, model: Option<String>, settings: Settings) -> Result<()> {
    preflight(Operation::Ask)?;

    let mut session = session(&settings, model.as_deref())?;
    let mut current = retrieval.apply(&settings.retrieval);

    println!("\n{}", style("Guaxinim").bold().cyan());
    println!("{}\n", style(HELP).dim());

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        match interpret(&line, &mut current) {
            Input::Empty => continue,
            Input::Exit => {
                Output::info("Goodbye!");
                break;
            }
            Input::Help => println!("{}", style(HELP).dim()),
            Input::Show => show(&current),
            Input::Reconfigured => show(&current),
            Input::Invalid(msg) => Output::warning(&msg),
            Input::Question(question) => {
                let assistant = match session.assistant(&current) {
                    Ok(assistant) => assistant,
                    Err(e) => {
                        Output::error(&format!("Failed to load knowledge base: {}", e));
                        continue;
                    }
                };

                let spinner = Output::spinner("Thinking...");
                let answer = assistant.ask(&question).await;
                spinner.finish_and_clear();

                match answer {
                    Ok(answer) => {
                        println!("\n{} {}\n", style("Guaxinim:").cyan().bold(), answer.text);
                        for (i, source) in answer.sources.iter().enumerate() {
                            Output::source(i + 1, source);
                        }
                    }
                    Err(e) => Output::error(&format!("Error: {}", e)),
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_questions_and_exit() {
        let mut settings = RetrievalSettings::default();
        assert_eq!(
            interpret("  How hot should the water be? \n", &mut settings),
            Input::Question("How hot should the water be?".to_string())
        );
        assert_eq!(interpret("QUIT", &mut settings), Input::Exit);
        assert_eq!(interpret("   ", &mut settings), Input::Empty);
    }

    #[test]
    fn test_slash_commands_reconfigure() {
        let mut settings = RetrievalSettings::default();

        assert_eq!(interpret("/field summary", &mut settings), Input::Reconfigured);
        assert_eq!(interpret("/mode whole-file", &mut settings), Input::Reconfigured);
        assert_eq!(interpret("/max 3", &mut settings), Input::Reconfigured);

        assert_eq!(settings.ranking_field, RankingField::Summary);
        assert_eq!(settings.return_mode, ReturnMode::WholeFile);
        assert_eq!(settings.max_whole_files, 3);
    }

    #[test]
    fn test_invalid_commands_leave_settings_alone() {
        let mut settings = RetrievalSettings::default();

        assert!(matches!(interpret("/mode pages", &mut settings), Input::Invalid(_)));
        assert!(matches!(interpret("/max 0", &mut settings), Input::Invalid(_)));
        assert!(matches!(interpret("/roast dark", &mut settings), Input::Invalid(_)));
        assert_eq!(settings, RetrievalSettings::default());
    }
}
