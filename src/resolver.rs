//! Resolves variable declarations into environment bindings.
//!
//! Each entry of a file's declaration block either reuses an existing
//! binding or prompts the user for a value. Invalid declarations are
//! warned about and skipped; a later reference to the unbound name fails
//! that file's evaluation. Only a prompter failure propagates from here.

use crate::error::Result;
use crate::prompt::Prompter;
use crate::value::{ChoiceRegistry, ChoiceType, Environment, Value};
use log::warn;
use regex::Regex;
use std::sync::LazyLock;

static VALID_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_]+$").unwrap());
static WORD_FRAGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z][a-z]*").unwrap());
static CHOICE_SET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[.+\]$").unwrap());

/// Resolves every declaration in `declarations` against the shared
/// environment, prompting through `prompter` for names not yet bound.
///
/// `subject` names the file being processed and only appears in warnings.
pub fn resolve_declarations(
    declarations: &str,
    subject: &str,
    env: &mut Environment,
    registry: &mut ChoiceRegistry,
    prompter: &dyn Prompter,
) -> Result<()> {
    for entry in split_entries(declarations) {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let (name, type_spec) = match entry.split_once(':') {
            Some((name, type_spec)) => (name.trim(), type_spec.trim()),
            None => {
                warn!("Malformed declaration '{}' in {}", entry, subject);
                continue;
            }
        };
        if env.contains_key(name) {
            continue;
        }
        if !VALID_NAME.is_match(name) {
            warn!("Illegal variable name '{}'", name);
            continue;
        }
        resolve_one(name, type_spec, subject, env, registry, prompter)?;
    }
    Ok(())
}

/// Splits the declaration buffer on `|`, keeping `|` inside a bracketed
/// choice set with its entry.
fn split_entries(declarations: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in declarations.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '|' if depth == 0 => {
                entries.push(&declarations[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    entries.push(&declarations[start..]);
    entries
}

/// Derives the human-readable label shown in prompts: the identifier's
/// capitalized word fragments joined with spaces, underscores dropped.
/// `userName` becomes `user Name`, `max_count` becomes `max count`.
pub fn derive_label(name: &str) -> String {
    WORD_FRAGMENT
        .find_iter(name)
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn resolve_one(
    name: &str,
    type_spec: &str,
    subject: &str,
    env: &mut Environment,
    registry: &mut ChoiceRegistry,
    prompter: &dyn Prompter,
) -> Result<()> {
    let label = derive_label(name);
    match type_spec {
        "boolean" => loop {
            let prompt = format!("Please choose value for '{}' [Y/N]", label);
            match prompter.ask_yes_no(&prompt)? {
                Some(answer) => {
                    env.insert(name.to_string(), Value::Bool(answer));
                    return Ok(());
                }
                None => warn!("Invalid value! Please try again!"),
            }
        },
        "string" => loop {
            let prompt = format!("Please choose value for '{}' [string]", label);
            match prompter.ask_text(&prompt)? {
                Some(answer) => {
                    env.insert(name.to_string(), Value::Str(answer));
                    return Ok(());
                }
                None => warn!("Invalid value! Please try again!"),
            }
        },
        "float" => loop {
            let prompt = format!("Please choose value for '{}' [float]", label);
            match prompter.ask_text(&prompt)?.and_then(|s| s.trim().parse().ok()) {
                Some(answer) => {
                    env.insert(name.to_string(), Value::Float(answer));
                    return Ok(());
                }
                None => warn!("Invalid value! Please try again!"),
            }
        },
        "int" => loop {
            let prompt = format!("Please choose value for '{}' [int]", label);
            match prompter.ask_text(&prompt)?.and_then(|s| s.trim().parse().ok()) {
                Some(answer) => {
                    env.insert(name.to_string(), Value::Int(answer));
                    return Ok(());
                }
                None => warn!("Invalid value! Please try again!"),
            }
        },
        set if CHOICE_SET.is_match(set) => {
            let cases: Vec<String> = set[1..set.len() - 1]
                .split('|')
                .map(|case| case.trim().to_string())
                .collect();
            let display: Vec<String> =
                cases.iter().map(|case| case.replace('_', "")).collect();
            let prompt = format!("Please choose an option for '{}'", label);
            loop {
                match prompter.ask_choice(&prompt, &display)? {
                    Some(index) if index < cases.len() => {
                        let type_name = capitalize(name);
                        if !registry.contains_type(&type_name) {
                            registry.register(ChoiceType::new(
                                type_name.clone(),
                                cases.clone(),
                            ));
                        }
                        // Registration guarantees the symbol exists.
                        if let Some(symbol) = registry.resolve(&type_name, &cases[index])
                        {
                            env.insert(name.to_string(), symbol);
                        }
                        return Ok(());
                    }
                    _ => warn!("Invalid value! Please try again!"),
                }
            }
        }
        _ => {
            warn!(
                "Unable to initialize '{}:{}' variable in {}",
                name, type_spec, subject
            );
            Ok(())
        }
    }
}
