//! Piklisp: a parser for a Lisp notation that mixes fully parenthesized
//! blocks with indentation-sensitive ones in the same source file.
//!
//! ```
//! let tree = piklisp::parse("func main ()\n\tfmt.Println \"hi\"").unwrap();
//! assert_eq!(tree.to_string(), "(func main () (fmt.Println \"hi\"))");
//! ```

pub use crate::errors::{ErrorKind, ParseError, SourceContext};
pub use crate::parser::{parse, parse_source, SyntaxMode};
pub use crate::tree::{NodeId, NodeRef, Tree};

pub mod batch;
pub mod cli;
pub mod config;
pub mod errors;
pub mod lexer;
pub mod parser;
pub mod tree;
