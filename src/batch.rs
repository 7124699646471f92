//! Batch driver: parses every source unit under a set of directories and
//! reports which ones pass.
//!
//! Each unit is isolated from the others. A parse error, an unreadable file
//! or even a panic inside the parser is recorded as that unit's failure and
//! the run moves on to the next unit.
//!
//! A unit `foo.pgo` may sit next to a `foo.expected` file holding the tree it
//! should produce, rendered as an s-expression. When present, the unit only
//! passes if its tree renders to exactly that text (surrounding whitespace
//! ignored).

use std::fs;
use std::io::{self, Write};
use std::panic;
use std::path::{Path, PathBuf};

use difference::{Changeset, Difference};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::BatchConfig;
use crate::errors::{DriverError, SourceContext};
use crate::parser::parse_source;
use crate::tree::Tree;

/// Extension of the optional expected-tree file next to a unit.
pub const EXPECTED_EXTENSION: &str = "expected";

// =============================================================================
// CORE TYPES
// =============================================================================

/// What happened to one source unit.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitOutcome {
    Pass {
        path: PathBuf,
        nodes: usize,
    },
    Fail {
        path: PathBuf,
        error: String,
        /// Expected and actual renderings, when the tree did not match.
        mismatch: Option<(String, String)>,
    },
}

impl UnitOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::Pass { path, .. } | Self::Fail { path, .. } => path,
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass { .. })
    }
}

/// Outcomes of a batch run, in discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub outcomes: Vec<UnitOutcome>,
}

impl BatchReport {
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_pass()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }

    pub fn failures(&self) -> impl Iterator<Item = &UnitOutcome> {
        self.outcomes.iter().filter(|o| !o.is_pass())
    }
}

// =============================================================================
// DISCOVERY
// =============================================================================

/// Recursively collects the source units under `root`, sorted by path.
pub fn discover_sources<P: AsRef<Path>>(
    root: P,
    config: &BatchConfig,
) -> Result<Vec<PathBuf>, DriverError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if config.accepts(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

// =============================================================================
// EXECUTION
// =============================================================================

/// Reads and parses one file.
pub fn parse_file(path: &Path) -> Result<Tree, DriverError> {
    let content = read(path)?;
    let source = SourceContext::from_file(path.display().to_string(), content);
    Ok(parse_source(&source)?)
}

/// Parses one unit and checks it against its expected tree, if any.
pub fn run_unit(path: &Path) -> UnitOutcome {
    let fail = |error: String, mismatch| UnitOutcome::Fail {
        path: path.to_path_buf(),
        error,
        mismatch,
    };

    let tree = match panic::catch_unwind(|| parse_file(path)) {
        Ok(Ok(tree)) => tree,
        Ok(Err(e)) => return fail(e.to_string(), None),
        Err(payload) => return fail(format!("parser panicked: {}", panic_message(&*payload)), None),
    };

    let expected_path = path.with_extension(EXPECTED_EXTENSION);
    if expected_path.is_file() {
        let expected = match read(&expected_path) {
            Ok(text) => text.trim().to_string(),
            Err(e) => return fail(e.to_string(), None),
        };
        let actual = tree.to_string();
        if expected != actual {
            return fail("tree does not match expected output".into(), Some((expected, actual)));
        }
    }

    UnitOutcome::Pass {
        path: path.to_path_buf(),
        nodes: tree.len(),
    }
}

/// Runs every unit found under `roots`.
pub fn run_batch(roots: &[PathBuf], config: &BatchConfig) -> Result<BatchReport, DriverError> {
    let mut report = BatchReport::default();
    for root in roots {
        let files = discover_sources(root, config)?;
        info!(root = %root.display(), units = files.len(), "discovered sources");
        for file in files {
            let outcome = run_unit(&file);
            match &outcome {
                UnitOutcome::Pass { nodes, .. } => debug!(path = %file.display(), nodes, "pass"),
                UnitOutcome::Fail { error, .. } => warn!(path = %file.display(), %error, "fail"),
            }
            report.outcomes.push(outcome);
        }
    }
    Ok(report)
}

fn read(path: &Path) -> Result<String, DriverError> {
    fs::read_to_string(path).map_err(|source| DriverError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        return (*s).to_string();
    }
    if let Some(s) = payload.downcast_ref::<String>() {
        return s.clone();
    }
    "unknown panic".to_string()
}

// =============================================================================
// REPORTING
// =============================================================================

/// Prints a report to stdout, colored if the config asks for it.
pub fn print_report(report: &BatchReport, config: &BatchConfig) -> io::Result<()> {
    let choice = if config.use_colors {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(choice);
    write_report(&mut stdout, report)
}

/// Writes one PASS/FAIL line per unit, diffs for mismatches, then a summary.
pub fn write_report<W: WriteColor>(out: &mut W, report: &BatchReport) -> io::Result<()> {
    for outcome in &report.outcomes {
        match outcome {
            UnitOutcome::Pass { path, .. } => {
                write_tag(out, "PASS", Color::Green)?;
                writeln!(out, " {}", path.display())?;
            }
            UnitOutcome::Fail {
                path,
                error,
                mismatch,
            } => {
                write_tag(out, "FAIL", Color::Red)?;
                writeln!(out, " {}", path.display())?;
                writeln!(out, "  Error: {}", error)?;
                if let Some((expected, actual)) = mismatch {
                    write_diff(out, expected, actual)?;
                }
            }
        }
    }
    writeln!(
        out,
        "{} passed, {} failed, {} total",
        report.passed(),
        report.failed(),
        report.outcomes.len()
    )
}

fn write_tag<W: WriteColor>(out: &mut W, tag: &str, color: Color) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(out, "{}", tag)?;
    out.reset()
}

fn write_diff<W: WriteColor>(out: &mut W, expected: &str, actual: &str) -> io::Result<()> {
    let changeset = Changeset::new(expected, actual, " ");
    for diff in &changeset.diffs {
        match diff {
            Difference::Same(x) => {
                out.reset()?;
                writeln!(out, "   {}", x)?;
            }
            Difference::Add(x) => {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
                writeln!(out, "  +{}", x)?;
            }
            Difference::Rem(x) => {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
                writeln!(out, "  -{}", x)?;
            }
        }
    }
    out.reset()
}
