//! Error handling for the tmpl application.
//! Defines custom error types and results used throughout the application.

use std::io;
use thiserror::Error;

/// Custom error types for tmpl operations.
///
/// This enum represents all possible errors that can occur within the tmpl
/// application. It implements the standard Error trait through thiserror's
/// derive macro.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// An expression referenced a name with no binding in the environment
    #[error("unbound variable '{name}'")]
    UnboundVariable { name: String },

    /// Malformed expression syntax or a type mismatch during evaluation
    #[error("evaluation error: {message}")]
    Eval { message: String },

    /// The eval script of a file yielded no output path
    #[error("eval script produced no output path")]
    NullOutputPath,

    /// A named template does not exist under the templates root
    #[error("no such '{name}' template")]
    TemplateNotFound { name: String },

    /// Traversal of the template tree failed at its root
    #[error("failed to walk template tree: {0}")]
    Walk(String),

    /// Interaction with the user failed (closed terminal, broken pipe)
    #[error("prompt error: {0}")]
    Prompt(String),

    /// At least one template node failed during an instantiate run
    #[error("{failed} of {total} template nodes could not be processed")]
    Incomplete { failed: usize, total: usize },
}

/// Convenience type alias for Results with tmpl's Error as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) -> ! {
    eprintln!("{}", err);
    std::process::exit(1);
}
