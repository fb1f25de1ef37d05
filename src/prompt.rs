//! User input and interaction handling.
//!
//! The variable resolver talks to the user exclusively through the
//! [`Prompter`] trait. Every method returns the user's answer unvalidated
//! beyond its basic shape; validation loops (re-asking until an acceptable
//! answer arrives) belong to the caller.

use crate::error::{Error, Result};
use dialoguer::{Input, Select};
use std::cell::RefCell;
use std::collections::VecDeque;

/// Interactive question-asking interface.
pub trait Prompter {
    /// Asks a yes/no question. Returns `None` when the answer is neither
    /// a yes nor a no; the caller re-asks.
    fn ask_yes_no(&self, prompt: &str) -> Result<Option<bool>>;

    /// Asks for a free-text line. Returns `None` when no answer was given.
    fn ask_text(&self, prompt: &str) -> Result<Option<String>>;

    /// Asks the user to pick one of `options` by index. Returns `None`
    /// when the answer is not a number; the caller checks the range.
    fn ask_choice(&self, prompt: &str, options: &[String]) -> Result<Option<usize>>;
}

/// Terminal prompter backed by dialoguer.
#[derive(Debug, Default)]
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self
    }
}

fn prompt_error(e: dialoguer::Error) -> Error {
    Error::Prompt(e.to_string())
}

impl Prompter for DialoguerPrompter {
    fn ask_yes_no(&self, prompt: &str) -> Result<Option<bool>> {
        let answer: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(prompt_error)?;
        Ok(parse_yes_no(&answer))
    }

    fn ask_text(&self, prompt: &str) -> Result<Option<String>> {
        let answer: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(prompt_error)?;
        Ok(Some(answer))
    }

    fn ask_choice(&self, prompt: &str, options: &[String]) -> Result<Option<usize>> {
        let selection = Select::new()
            .with_prompt(prompt)
            .items(options)
            .default(0)
            .interact_opt()
            .map_err(prompt_error)?;
        Ok(selection)
    }
}

/// Interprets a yes/no answer case-insensitively.
pub fn parse_yes_no(answer: &str) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Prompter that replays a fixed queue of answers.
///
/// Drives the resolver in tests and in non-interactive runs where answers
/// are known up front. Every question pops the next queued answer; an
/// exhausted queue is a prompt error.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: RefCell<VecDeque<String>>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: RefCell::new(answers.into_iter().map(Into::into).collect()),
        }
    }

    fn next(&self) -> Result<String> {
        self.answers
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| Error::Prompt("no scripted answer left".to_string()))
    }

    /// True when every queued answer has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.answers.borrow().is_empty()
    }
}

impl Prompter for ScriptedPrompter {
    fn ask_yes_no(&self, _prompt: &str) -> Result<Option<bool>> {
        Ok(parse_yes_no(&self.next()?))
    }

    fn ask_text(&self, _prompt: &str) -> Result<Option<String>> {
        Ok(Some(self.next()?))
    }

    fn ask_choice(&self, _prompt: &str, _options: &[String]) -> Result<Option<usize>> {
        Ok(self.next()?.trim().parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yes_no() {
        assert_eq!(parse_yes_no("y"), Some(true));
        assert_eq!(parse_yes_no("YES"), Some(true));
        assert_eq!(parse_yes_no("n"), Some(false));
        assert_eq!(parse_yes_no(" No "), Some(false));
        assert_eq!(parse_yes_no("maybe"), None);
        assert_eq!(parse_yes_no(""), None);
    }

    #[test]
    fn test_scripted_prompter_replays_in_order() {
        let prompter = ScriptedPrompter::new(["y", "Ada", "2"]);
        assert_eq!(prompter.ask_yes_no("?").unwrap(), Some(true));
        assert_eq!(prompter.ask_text("?").unwrap(), Some("Ada".to_string()));
        assert_eq!(prompter.ask_choice("?", &[]).unwrap(), Some(2));
        assert!(prompter.is_exhausted());
        assert!(prompter.ask_text("?").is_err());
    }
}
