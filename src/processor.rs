//! Core template processing orchestration.
//!
//! Drives one instantiate run: walks the stored template tree in sorted
//! order, classifies each file, resolves its declarations, renders its
//! body, evaluates its eval script into an output path and writes the
//! result. One environment and one choice registry are shared across the
//! whole run; a failed file is abandoned and its siblings continue.

use crate::directive;
use crate::error::{Error, Result};
use crate::expr;
use crate::prompt::Prompter;
use crate::renderer;
use crate::resolver;
use crate::value::{ChoiceRegistry, Environment, Value};
use log::{debug, warn};
use std::fs;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// The resolved output of one processed template file.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    /// The eval script named a directory target (trailing `/`).
    Directory { path: String },
    /// The eval script named a file target; `content` is the rendered body.
    File { path: String, content: String },
}

/// Processor for a single instantiate run.
pub struct Processor<'a> {
    prompter: &'a dyn Prompter,
    env: Environment,
    registry: ChoiceRegistry,
}

impl<'a> Processor<'a> {
    pub fn new(prompter: &'a dyn Prompter) -> Self {
        Self { prompter, env: Environment::new(), registry: ChoiceRegistry::new() }
    }

    /// Walks the template rooted at `template_root` and processes every
    /// file in lexicographic sibling order with the shared environment.
    ///
    /// Per-file failures are reported and counted; an unreadable
    /// subdirectory is skipped with its contents. Only a failure on the
    /// root itself aborts the walk.
    ///
    /// # Errors
    /// * [`Error::Walk`] when the template root cannot be read
    /// * [`Error::Incomplete`] when at least one node failed
    /// * [`Error::Prompt`] when user interaction breaks down
    pub fn instantiate(&mut self, template_root: &Path) -> Result<()> {
        let mut total = 0usize;
        let mut failed = 0usize;

        for entry in WalkDir::new(template_root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let is_root =
                        e.path().is_none_or(|path| path == template_root);
                    if is_root {
                        return Err(Error::Walk(e.to_string()));
                    }
                    warn!("Failed to list '{}', skipping subtree: {}", subject(&e), e);
                    total += 1;
                    failed += 1;
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            total += 1;

            let name = entry.file_name().to_string_lossy().to_string();
            debug!("Processing '{}'", name);
            match self.process_file(entry.path()) {
                Ok(Outcome::Directory { path }) => {
                    println!("Directory '{}' successfully created", display_name(&path));
                }
                Ok(Outcome::File { path, .. }) => {
                    println!("File '{}' successfully created", display_name(&path));
                }
                Err(Error::NullOutputPath) => {
                    warn!("File '{}' produced no output path, skipping", name);
                }
                Err(e) => {
                    warn!("Failed to process '{}': {}", name, e);
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            return Err(Error::Incomplete { failed, total });
        }
        Ok(())
    }

    /// Runs the full pipeline on one template file and writes its output.
    fn process_file(&mut self, path: &Path) -> Result<Outcome> {
        let text = fs::read_to_string(path)?;
        let subject = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let blocks = directive::classify(&text);
        resolver::resolve_declarations(
            &blocks.declarations,
            &subject,
            &mut self.env,
            &mut self.registry,
            self.prompter,
        )?;

        let rendered = renderer::render_body(&blocks.body, &self.env, &self.registry)?;
        let output_path = self.eval_output_path(&blocks.eval_script)?;

        let outcome = resolve_outcome(output_path, rendered);
        write_outcome(&outcome)?;
        Ok(outcome)
    }

    /// Evaluates the eval script into the candidate output path.
    fn eval_output_path(&self, script: &str) -> Result<String> {
        if script.trim().is_empty() {
            return Err(Error::NullOutputPath);
        }
        let evaluated =
            expr::evaluate(&self.registry.substitute(script), &self.env, &self.registry)?;
        match evaluated {
            None => Err(Error::NullOutputPath),
            Some(Value::Str(path)) if !path.is_empty() => Ok(path),
            Some(Value::Str(_)) => Err(Error::NullOutputPath),
            Some(other) => Err(Error::Eval {
                message: format!(
                    "eval script must produce a path string, got '{}'",
                    other
                ),
            }),
        }
    }
}

/// Decides directory vs file output from the evaluated path.
fn resolve_outcome(path: String, content: String) -> Outcome {
    if path.ends_with('/') {
        if !content.is_empty() {
            warn!("File '{}' content not used", display_name(&path));
        }
        Outcome::Directory { path }
    } else {
        Outcome::File { path, content }
    }
}

/// Materializes an outcome relative to the current working directory.
///
/// File targets are created fresh; an already existing file is an error
/// rather than an overwrite.
fn write_outcome(outcome: &Outcome) -> Result<()> {
    match outcome {
        Outcome::Directory { path } => {
            fs::create_dir_all(path)?;
            Ok(())
        }
        Outcome::File { path, content } => {
            let path = Path::new(path);
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            let mut file = fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(path)?;
            io::Write::write_all(&mut file, content.as_bytes())?;
            Ok(())
        }
    }
}

/// Last path component, used in user-facing messages.
fn display_name(path: &str) -> &str {
    path.trim_end_matches('/').rsplit('/').next().unwrap_or(path)
}

fn subject(e: &walkdir::Error) -> String {
    e.path()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "<unknown>".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_outcome_directory() {
        let outcome = resolve_outcome("out/sub/".to_string(), String::new());
        assert_eq!(outcome, Outcome::Directory { path: "out/sub/".to_string() });
    }

    #[test]
    fn test_resolve_outcome_file() {
        let outcome = resolve_outcome("out/a.txt".to_string(), "body".to_string());
        assert_eq!(
            outcome,
            Outcome::File { path: "out/a.txt".to_string(), content: "body".to_string() }
        );
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("out/sub/"), "sub");
        assert_eq!(display_name("out/a.txt"), "a.txt");
        assert_eq!(display_name("a.txt"), "a.txt");
    }
}
