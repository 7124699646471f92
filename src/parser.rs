//! Piklisp parser.
//!
//! Turns source text into a [`Tree`]. Each top-level block picks its own
//! syntax: a block opening with `(` is classic, fully parenthesized Lisp;
//! anything else is indentation-sensitive, where every leading tab on a
//! continuation line is one level of nesting (in the manner of SRFI-49).
//! Parentheses keep working inside indented blocks.
//!
//! The parser is purely syntactic. It never looks at what a token means.

use std::cmp::Ordering;

use tracing::{debug, trace};

use crate::errors::{ParseError, SourceContext};
use crate::lexer::find_token_end;
use crate::tree::{NodeId, Tree};

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parses Piklisp source into its syntax tree.
pub fn parse(text: &str) -> Result<Tree, ParseError> {
    parse_source(&SourceContext::anonymous(text))
}

/// Parses the content of `source`, naming it in any diagnostic.
pub fn parse_source(source: &SourceContext) -> Result<Tree, ParseError> {
    let tree = Parser::new(source).run()?;
    debug!(source = %source.name, nodes = tree.len(), "parsed");
    Ok(tree)
}

/// Syntax used by one top-level block, fixed when the block starts.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SyntaxMode {
    /// Opens with `(`; nesting is explicit and line breaks are insignificant.
    Classic,
    /// Leading tabs set the nesting depth of each continuation line.
    Indented,
}

// ============================================================================
// PARSER STATE
// ============================================================================

struct Parser<'a> {
    source: &'a SourceContext,
    text: &'a str,
    pos: usize,
    tree: Tree,
}

impl<'a> Parser<'a> {
    fn new(source: &'a SourceContext) -> Self {
        Self {
            source,
            text: &source.content,
            pos: 0,
            tree: Tree::new(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    /// Scans for top-level blocks until the input runs out.
    fn run(mut self) -> Result<Tree, ParseError> {
        while let Some(byte) = self.peek() {
            match byte {
                b' ' | b'\t' | b'\n' => self.pos += 1,
                b';' => self.skip_to_line_end(),
                _ => self.parse_block()?,
            }
        }
        self.tree.collapse();
        Ok(self.tree)
    }

    // ------------------------------------------------------------------------
    // Blocks
    // ------------------------------------------------------------------------

    fn parse_block(&mut self) -> Result<(), ParseError> {
        let mode = if self.peek() == Some(b'(') {
            // The block node itself stands for this paren.
            self.pos += 1;
            SyntaxMode::Classic
        } else {
            SyntaxMode::Indented
        };
        debug!(offset = self.pos, ?mode, "block");

        let root = self.tree.root();
        let mut cursor = self.tree.make_child(root);
        let mut depth = 0;

        while let Some(byte) = self.peek() {
            match byte {
                b'(' => {
                    cursor = self.tree.make_child(cursor);
                    self.pos += 1;
                }
                b')' => {
                    cursor = self.ascend(cursor)?;
                    self.pos += 1;
                }
                b' ' | b'\t' => self.pos += 1,
                b'\n' => {
                    self.skip_line_breaks(mode);
                    match mode {
                        SyntaxMode::Classic if cursor == root => break,
                        SyntaxMode::Classic => {}
                        SyntaxMode::Indented => {
                            let new_depth = self.take_tabs();
                            if new_depth == 0 {
                                break;
                            }
                            cursor = self.indent(cursor, depth, new_depth)?;
                            depth = new_depth;
                        }
                    }
                }
                b';' => {
                    self.skip_to_line_end();
                    // An in-block comment takes its line break with it.
                    if self.peek() == Some(b'\n') {
                        self.pos += 1;
                    }
                }
                _ => self.push_token(cursor)?,
            }
        }
        Ok(())
    }

    fn push_token(&mut self, cursor: NodeId) -> Result<(), ParseError> {
        let rest = self.rest();
        let end = find_token_end(rest)
            .ok_or_else(|| ParseError::unterminated_token(self.source, self.pos))?;
        self.tree.add_token(cursor, &rest[..end]);
        self.pos += end;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Indentation
    // ------------------------------------------------------------------------

    /// Moves the cursor for a line whose depth went from `old` to `new`.
    ///
    /// Shallower lines climb back to the new depth and open a sibling there,
    /// equal lines open a sibling, deeper lines open one nested node per level.
    /// Assumes the cursor sits on the node of the previous non-blank line.
    fn indent(&mut self, cursor: NodeId, old: usize, new: usize) -> Result<NodeId, ParseError> {
        trace!(old, new, "depth change");
        match new.cmp(&old) {
            Ordering::Less => {
                let mut node = cursor;
                for _ in new..old {
                    node = self.ascend(node)?;
                }
                let parent = self.ascend(node)?;
                Ok(self.tree.make_child(parent))
            }
            Ordering::Equal => {
                let parent = self.ascend(cursor)?;
                Ok(self.tree.make_child(parent))
            }
            Ordering::Greater => {
                let mut node = cursor;
                for _ in old..new {
                    node = self.tree.make_child(node);
                }
                Ok(node)
            }
        }
    }

    fn ascend(&self, node: NodeId) -> Result<NodeId, ParseError> {
        self.tree
            .parent(node)
            .ok_or_else(|| ParseError::unbalanced_close(self.source, self.pos))
    }

    /// Consumes leading tabs and returns how many there were.
    fn take_tabs(&mut self) -> usize {
        let tabs = self.rest().bytes().take_while(|&b| b == b'\t').count();
        self.pos += tabs;
        tabs
    }

    // ------------------------------------------------------------------------
    // Whitespace and comments
    // ------------------------------------------------------------------------

    /// Consumes a run of line breaks.
    ///
    /// In indented blocks this also swallows lines holding nothing but
    /// spaces, tabs or a comment, so they never count as a depth change.
    fn skip_line_breaks(&mut self, mode: SyntaxMode) {
        loop {
            while self.peek() == Some(b'\n') {
                self.pos += 1;
            }
            if mode == SyntaxMode::Classic {
                return;
            }
            let rest = self.rest();
            let indent = rest.bytes().take_while(|&b| b == b' ' || b == b'\t').count();
            match rest.as_bytes().get(indent) {
                Some(b'\n') => self.pos += indent,
                Some(b';') => {
                    self.pos += indent;
                    self.skip_to_line_end();
                }
                None => {
                    self.pos += indent;
                    return;
                }
                _ => return,
            }
        }
    }

    /// Skips a comment up to, not including, the line break that ends it.
    ///
    /// Inside a block the caller consumes that line break as well.
    fn skip_to_line_end(&mut self) {
        let len = self.rest().find('\n').unwrap_or(self.rest().len());
        self.pos += len;
    }
}

// ============================================================================
// TESTS
// ============================================================================
