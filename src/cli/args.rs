//! Command-line arguments for the `piklisp` binary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "piklisp",
    version,
    about = "Parse Piklisp source in classic or indentation-sensitive syntax."
)]
pub struct PiklispArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse one file and print its syntax tree.
    Parse {
        /// The Piklisp source file to parse.
        #[arg(required = true)]
        file: PathBuf,
        /// Print the tree as JSON instead of an s-expression.
        #[arg(long)]
        json: bool,
    },
    /// Parse every source file under the given directories and report failures.
    Check {
        /// Directories to scan for source files.
        #[arg(default_value = "tests/fixtures")]
        paths: Vec<PathBuf>,
        /// YAML file with batch settings.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Disable colored output.
        #[arg(long)]
        no_color: bool,
    },
}
