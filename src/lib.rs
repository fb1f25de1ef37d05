//! tmpl is a template-driven project scaffolding tool.
//! A template is captured once from existing sources, stored under a
//! templates root, and later instantiated into a new project by prompting
//! for declared variables and evaluating embedded expressions that decide
//! output paths and content.

/// Command-line interface module for the tmpl application
pub mod cli;

/// Directive classification: splitting a template file into declaration
/// block, eval script and literal body
pub mod directive;

/// Error types and handling for the tmpl application
pub mod error;

/// The expression sub-language evaluated inside eval scripts and
/// backtick spans
pub mod expr;

/// Core template processing orchestration
/// Combines all components to generate the final output
pub mod processor;

/// User input and interaction handling
pub mod prompt;

/// Template body rendering with inline expression spans
pub mod renderer;

/// Variable declaration resolution against the shared environment
pub mod resolver;

/// The template store: capture, locate, list and delete stored templates
pub mod template;

/// Typed values, the shared environment and the choice registry
pub mod value;
