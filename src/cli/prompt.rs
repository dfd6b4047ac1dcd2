//! Interactive category prompt for `demand forecast`.
//!
//! Kept apart from clap parsing: clap handles flags, this handles the
//! "run `demand forecast` and type a category" flow.

use std::io::{self, BufRead, Write};

use crate::error::AppError;

/// Prompt on stdin/stdout. `Ok(None)` means the user cancelled.
pub fn prompt_for_category(categories: &[String]) -> Result<Option<String>, AppError> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    prompt_for_category_with(stdin.lock(), stdout.lock(), categories)
}

/// Prompt until the input names one of `categories` exactly.
///
/// Behavior:
/// - list the available categories once
/// - invalid input prints the valid set and asks again
/// - `q` or end of input cancels
pub fn prompt_for_category_with<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
    categories: &[String],
) -> Result<Option<String>, AppError> {
    if categories.is_empty() {
        return Err(AppError::input("The dataset has no product categories to forecast."));
    }

    let write_err = |e: io::Error| AppError::input(format!("Failed to write prompt: {e}"));

    writeln!(output, "Available categories: {}", categories.join(", ")).map_err(write_err)?;

    loop {
        write!(output, "Enter the product category for forecasting (q to quit): ").map_err(write_err)?;
        output.flush().map_err(write_err)?;

        let mut line = String::new();
        let bytes = input
            .read_line(&mut line)
            .map_err(|e| AppError::input(format!("Failed to read input: {e}")))?;
        if bytes == 0 {
            writeln!(output).map_err(write_err)?;
            return Ok(None);
        }

        let choice = line.trim();
        if choice.eq_ignore_ascii_case("q") {
            return Ok(None);
        }
        if categories.iter().any(|c| c == choice) {
            return Ok(Some(choice.to_string()));
        }

        writeln!(
            output,
            "Invalid product '{choice}'. Please choose from: {}",
            categories.join(", ")
        )
        .map_err(write_err)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories() -> Vec<String> {
        vec!["Dress".to_string(), "Shirt".to_string()]
    }

    fn run(input: &str) -> (Option<String>, String) {
        let mut out = Vec::new();
        let choice = prompt_for_category_with(input.as_bytes(), &mut out, &categories()).unwrap();
        (choice, String::from_utf8(out).unwrap())
    }

    #[test]
    fn exact_match_is_accepted() {
        let (choice, out) = run("Dress\n");
        assert_eq!(choice.as_deref(), Some("Dress"));
        assert!(out.starts_with("Available categories: Dress, Shirt\n"));
    }

    #[test]
    fn invalid_input_reprompts_with_valid_set() {
        let (choice, out) = run("Hat\nShirt\n");
        assert_eq!(choice.as_deref(), Some("Shirt"));
        assert!(out.contains("Invalid product 'Hat'. Please choose from: Dress, Shirt"));
        assert_eq!(out.matches("Enter the product category").count(), 2);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let (choice, out) = run("dress\n");
        assert_eq!(choice, None);
        assert!(out.contains("Invalid product 'dress'"));
    }

    #[test]
    fn quit_and_eof_cancel() {
        assert_eq!(run("q\n").0, None);
        assert_eq!(run("").0, None);
    }

    #[test]
    fn empty_category_set_is_an_error() {
        let err = prompt_for_category_with("".as_bytes(), Vec::new(), &[]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
