//! Piklisp error handling.
//!
//! Parse failures are `miette` diagnostics carrying the source they came from
//! and the span of the offending input. Failures in the outer layers (reading
//! files, walking directories, loading config) are plain [`DriverError`]s.

use miette::{Diagnostic, NamedSource, SourceSpan};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

// ============================================================================
// SOURCE CONTEXT
// ============================================================================

/// Names the text being parsed so diagnostics can point into it.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub name: String,
    pub content: String,
}

impl SourceContext {
    pub fn from_file(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Context for text that did not come from a file.
    pub fn anonymous(content: impl Into<String>) -> Self {
        Self::from_file("<input>", content)
    }

    pub fn to_named_source(&self) -> Arc<NamedSource<String>> {
        Arc::new(NamedSource::new(self.name.clone(), self.content.clone()))
    }
}

// ============================================================================
// PARSE ERRORS
// ============================================================================

/// A failed parse. No partial tree survives one of these.
#[derive(Error, Diagnostic, Debug)]
pub enum ParseError {
    #[error("Parse error: could not find end of token {excerpt}")]
    #[diagnostic(
        code(piklisp::parse::unterminated_token),
        help("strings need a closing double quote; character literals look like 'c'")
    )]
    UnterminatedToken {
        /// First line of the unparsable remainder.
        excerpt: String,
        #[source_code]
        src: Arc<NamedSource<String>>,
        #[label("no valid end for this token")]
        span: SourceSpan,
    },

    #[error("Parse error: unbalanced close moves above the top level")]
    #[diagnostic(
        code(piklisp::parse::unbalanced_close),
        help("check for an extra `)` or a dedent past the start of the block")
    )]
    UnbalancedClose {
        #[source_code]
        src: Arc<NamedSource<String>>,
        #[label("nothing left to close here")]
        span: SourceSpan,
    },
}

/// Payload-free classification of a [`ParseError`], for matching in tests
/// and batch reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnterminatedToken,
    UnbalancedClose,
}

impl ParseError {
    /// Builds an unterminated-token error for the input remaining at `offset`.
    pub(crate) fn unterminated_token(source: &SourceContext, offset: usize) -> Self {
        let remainder = &source.content[offset..];
        let excerpt = remainder.lines().next().unwrap_or_default().to_string();
        Self::UnterminatedToken {
            excerpt,
            src: source.to_named_source(),
            span: (offset..source.content.len()).into(),
        }
    }

    pub(crate) fn unbalanced_close(source: &SourceContext, offset: usize) -> Self {
        let len = source.content.len();
        Self::UnbalancedClose {
            src: source.to_named_source(),
            span: (offset.min(len)..(offset + 1).min(len)).into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnterminatedToken { .. } => ErrorKind::UnterminatedToken,
            Self::UnbalancedClose { .. } => ErrorKind::UnbalancedClose,
        }
    }

    pub fn span(&self) -> SourceSpan {
        match self {
            Self::UnterminatedToken { span, .. } | Self::UnbalancedClose { span, .. } => *span,
        }
    }
}

// ============================================================================
// DRIVER ERRORS
// ============================================================================

/// Failures outside the parser proper.
#[derive(Error, Diagnostic, Debug)]
pub enum DriverError {
    #[error("Failed to read '{}': {}", .path.display(), .source)]
    #[diagnostic(code(piklisp::driver::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk directory: {0}")]
    #[diagnostic(code(piklisp::driver::walk))]
    Walk(#[from] walkdir::Error),

    #[error("Invalid config '{}': {}", .path.display(), .source)]
    #[diagnostic(code(piklisp::driver::config))]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),
}

// ============================================================================
// ERROR FORMATTING UTILITIES
// ============================================================================

/// Prints an error with full miette diagnostics to stderr.
pub fn print_error(error: impl Diagnostic + Send + Sync + 'static) {
    let report = miette::Report::new(error);
    eprintln!("{report:?}");
}
