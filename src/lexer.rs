//! Token classification.
//!
//! Given input starting at a token, decides where that token ends. Three
//! shapes exist, chosen by the first character:
//!
//! - `"`: a string literal running to the next unescaped `"`.
//! - `'`: a character literal, `'c'` or `'\c'`.
//! - anything else: a bare run up to the next space, tab, newline, `"`, `(`
//!   or `)`.

use once_cell::sync::Lazy;
use regex::Regex;

static STRING_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^"([^"\\]|\\.)*""#).expect("string token pattern is valid"));

static CHAR_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^'\\?.'").expect("char token pattern is valid"));

static BARE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new("^[^ \t\n\"()]+").expect("bare token pattern is valid"));

/// The lexical shape of a token, picked from its first character.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TokenShape {
    String,
    Char,
    Bare,
}

impl TokenShape {
    pub fn of(first: char) -> Self {
        match first {
            '"' => Self::String,
            '\'' => Self::Char,
            _ => Self::Bare,
        }
    }

    fn pattern(self) -> &'static Regex {
        match self {
            Self::String => &*STRING_TOKEN,
            Self::Char => &*CHAR_TOKEN,
            Self::Bare => &*BARE_TOKEN,
        }
    }
}

/// Byte offset just past the token that `s` starts with.
///
/// Returns `None` when `s` is empty or does not start with a valid token of
/// the shape its first character selects, e.g. an unclosed string.
pub fn find_token_end(s: &str) -> Option<usize> {
    let first = s.chars().next()?;
    TokenShape::of(first).pattern().find(s).map(|m| m.end())
}
