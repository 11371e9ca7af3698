//! Parsing of console input lines.

use vector_api::TopK;

use crate::error_handler::CommandError;

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `insert [text]`: replace the draft text (if given) and submit it.
    Insert(Option<String>),
    /// `search [query]`: replace the draft query (if given) and submit it.
    Search(Option<String>),
    /// `top <n>`: default top_k for later searches.
    TopK(TopK),
    Results,
    Status,
    Help,
    Quit,
    /// Blank line.
    Nothing,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Command::Nothing);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let arg = (!rest.is_empty()).then(|| rest.to_string());

        match word.to_lowercase().as_str() {
            "insert" | "i" => Ok(Command::Insert(arg)),
            "search" | "s" => Ok(Command::Search(arg)),
            "top" | "k" => {
                let raw = arg.ok_or(CommandError::MissingTopK)?;
                raw.parse::<u64>()
                    .ok()
                    .and_then(|k| TopK::new(k).ok())
                    .map(Command::TopK)
                    .ok_or(CommandError::InvalidTopK(raw))
            }
            "results" | "r" => Ok(Command::Results),
            "status" => Ok(Command::Status),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}
