//! # Console Terminal
//!
//! `Terminal` implementation for an interactive shell: colored output and dialoguer prompts.

use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::{Confirm, Input};

use crate::domain::traits::{Terminal, Tone};

#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleTerminal;

impl ConsoleTerminal {
    pub fn new() -> Self {
        Self
    }
}

impl Terminal for ConsoleTerminal {
    fn print(&self, tone: Tone, text: &str) {
        match tone {
            Tone::Plain => println!("{}", text),
            Tone::Heading => println!("{}", text.bold()),
            Tone::Info => println!("{}", text.cyan()),
            Tone::Success => println!("{}", text.green()),
            Tone::Warning => println!("{}", text.yellow()),
            Tone::Error => eprintln!("{}", text.red()),
            Tone::Muted => println!("{}", text.dimmed()),
        }
    }

    fn confirm(&self, question: &str, default: bool) -> Result<bool> {
        Confirm::new()
            .with_prompt(question)
            .default(default)
            .interact()
            .context("failed to read confirmation")
    }

    fn read_line(&self, prompt: &str) -> Result<Option<String>> {
        match Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
        {
            Ok(line) => Ok(Some(line)),
            Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                Ok(None)
            }
            Err(e) => Err(e).context("failed to read input"),
        }
    }
}
