//! Interactive model picker.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker provides the "run `cpi forecast` and choose a model" UX

use std::io::{self, BufRead, Write};

use clap::ValueEnum;

use crate::domain::ModelKind;
use crate::error::AppError;
use crate::report::format_model_menu;

/// Prompt on stdin/stdout for a forecast strategy.
pub fn prompt_for_model() -> Result<ModelKind, AppError> {
    let stdin = io::stdin();
    pick_model(stdin.lock(), io::stdout())
}

/// Behavior:
/// - list the available strategies
/// - accept either a number (from the list) or a strategy name
/// - `q` cancels
pub fn pick_model(mut input: impl BufRead, mut output: impl Write) -> Result<ModelKind, AppError> {
    let write_err = |e: io::Error| AppError::input(format!("Failed to write prompt: {e}"));
    let choices = ModelKind::ALL.len();

    write!(output, "Available forecast models:\n{}", format_model_menu()).map_err(write_err)?;

    loop {
        write!(output, "Select a model by number (1-{choices}) or name (q to quit): ").map_err(write_err)?;
        output.flush().map_err(write_err)?;

        let mut line = String::new();
        let bytes = input
            .read_line(&mut line)
            .map_err(|e| AppError::input(format!("Failed to read input: {e}")))?;
        if bytes == 0 {
            return Err(AppError::input(
                "No input received. Pass the strategy with `cpi forecast --model <sarima|arima|linear>`.",
            ));
        }

        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Err(AppError::input("Canceled."));
        }

        if let Ok(choice) = line.parse::<usize>() {
            if (1..=choices).contains(&choice) {
                return Ok(ModelKind::ALL[choice - 1]);
            }
            writeln!(output, "Invalid choice: {choice}. Enter a number between 1 and {choices}.").map_err(write_err)?;
            continue;
        }

        match ModelKind::from_str(line, true) {
            Ok(kind) => return Ok(kind),
            Err(_) => writeln!(output, "Unknown model '{line}'.").map_err(write_err)?,
        }
    }
}
