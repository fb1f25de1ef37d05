//! Command-line interface implementation for tmpl.
//! Provides argument parsing using clap's derive API.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments structure for tmpl.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "tmpl: create reusable project templates and scaffold new projects from them",
    long_about = None
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new template from existing sources
    New {
        /// Name of the template; the name of the first transferred file
        /// is used when not specified
        #[arg(short, long)]
        name: Option<String>,

        /// Files or directories from which the template will be created
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,

        /// Directory where templates are placed
        #[arg(short = 'd', long = "custom-dir", value_name = "DIR")]
        custom_dir: Option<PathBuf>,

        /// Delete source files after creating the template
        #[arg(short = 'r', long = "remove-source")]
        remove_source: bool,
    },

    /// Create a new project from a template
    Use {
        /// The name of the template
        name: String,

        /// Directory where templates are placed
        #[arg(short = 'd', long = "custom-dir", value_name = "DIR")]
        custom_dir: Option<PathBuf>,
    },

    /// Delete an existing template
    Rm {
        /// The name of the template
        name: String,

        /// Directory where templates are placed
        #[arg(short = 'd', long = "custom-dir", value_name = "DIR")]
        custom_dir: Option<PathBuf>,
    },

    /// List available templates
    Ls {
        /// Directory where templates are placed
        #[arg(short = 'd', long = "custom-dir", value_name = "DIR")]
        custom_dir: Option<PathBuf>,
    },
}

/// Parses command line arguments and returns the Args structure.
pub fn get_args() -> Args {
    Args::parse()
}
