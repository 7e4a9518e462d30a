use std::io::{self, BufRead, Write};

use crate::error::Result;

/// Line-oriented user interaction.
pub trait Prompter {
    /// Shows `prompt` and returns the user's answer without the trailing newline.
    fn ask(&mut self, prompt: &str) -> Result<String>;

    /// Shows a block of text (tables, notices).
    fn show(&mut self, text: &str);
}

/// Prompts on stdout and reads answers from stdin.
#[derive(Debug, Default)]
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn ask(&mut self, prompt: &str) -> Result<String> {
        print!("{}", prompt);
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().lock().read_line(&mut input)?;
        Ok(input.trim_end_matches(['\r', '\n']).to_string())
    }

    fn show(&mut self, text: &str) {
        println!("{}", text);
    }
}
