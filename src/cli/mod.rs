//! The Piklisp command-line interface.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use crate::batch::{print_report, run_batch};
use crate::config::BatchConfig;
use crate::errors::{print_error, DriverError, SourceContext};
use crate::parser::parse_source;

pub mod args;

use args::{Command, PiklispArgs};

/// Parses arguments, runs the chosen command and maps the result to an exit code.
pub fn run() -> ExitCode {
    let args = PiklispArgs::parse();
    let result = match args.command {
        Command::Parse { file, json } => handle_parse(&file, json),
        Command::Check {
            paths,
            config,
            no_color,
        } => handle_check(&paths, config.as_deref(), no_color),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            print_error(e);
            ExitCode::FAILURE
        }
    }
}

fn handle_parse(path: &Path, json: bool) -> Result<bool, DriverError> {
    let content = std::fs::read_to_string(path).map_err(|source| DriverError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let source = SourceContext::from_file(path.display().to_string(), content);
    let tree = parse_source(&source)?;
    if json {
        // Tree serialization has no failure modes of its own.
        let text = serde_json::to_string_pretty(&tree).unwrap_or_default();
        println!("{text}");
    } else {
        println!("{tree}");
    }
    Ok(true)
}

fn handle_check(
    paths: &[PathBuf],
    config_path: Option<&Path>,
    no_color: bool,
) -> Result<bool, DriverError> {
    let mut config = match config_path {
        Some(path) => BatchConfig::load(path)?,
        None => BatchConfig::default(),
    };
    if no_color {
        config.use_colors = false;
    }

    let report = run_batch(paths, &config)?;
    print_report(&report, &config).map_err(|source| DriverError::Io {
        path: PathBuf::from("<stdout>"),
        source,
    })?;
    Ok(report.failed() == 0)
}
