//! Reply patterns
//!
//! A tiny template language for validating replies and pulling numbers out
//! of them. A template is literal text with two placeholders:
//!
//! - `{space}`: one or more ASCII whitespace characters (`[ \t\n\r\x0b\x0c]`), not captured
//! - `{digit}`: one or more ASCII digits, captured
//!
//! ```
//! use hvctl::protocol::Pattern;
//!
//! let pattern = Pattern::new("chan{space}{digit}, code{space}{digit} <- HV setup").unwrap();
//! let fields = pattern.parse("chan 99, code 100 <- HV setup\r\n").unwrap();
//! assert_eq!(fields.get_u32(0).unwrap(), 99);
//! assert_eq!(fields.get_u32(1).unwrap(), 100);
//! ```

use std::fmt;

use crate::error::{HvError, Result};

/// One element of a compiled template
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Space,
    Digit,
}

/// A compiled reply template
#[derive(Debug, Clone)]
pub struct Pattern {
    template: String,
    tokens: Vec<Token>,
}

impl Pattern {
    /// Compile a template.
    ///
    /// Fails on an unknown placeholder or an unbalanced brace.
    pub fn new(template: &str) -> Result<Self> {
        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut rest = template;

        while let Some(c) = rest.chars().next() {
            match c {
                '{' => {
                    let end = rest.find('}').ok_or_else(|| {
                        HvError::Config(format!("unclosed placeholder in pattern '{}'", template))
                    })?;
                    let token = match &rest[1..end] {
                        "space" => Token::Space,
                        "digit" => Token::Digit,
                        other => {
                            return Err(HvError::Config(format!(
                                "unknown placeholder {{{}}} in pattern '{}'",
                                other, template
                            )))
                        }
                    };
                    if !literal.is_empty() {
                        tokens.push(Token::Literal(std::mem::take(&mut literal)));
                    }
                    tokens.push(token);
                    rest = &rest[end + 1..];
                }
                '}' => {
                    return Err(HvError::Config(format!(
                        "unbalanced '}}' in pattern '{}'",
                        template
                    )))
                }
                _ => {
                    literal.push(c);
                    rest = &rest[c.len_utf8()..];
                }
            }
        }
        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }

        Ok(Self {
            template: template.to_string(),
            tokens,
        })
    }

    /// The template this pattern was compiled from
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Number of `{digit}` captures a successful match yields
    pub fn capture_count(&self) -> usize {
        self.tokens.iter().filter(|t| **t == Token::Digit).count()
    }

    /// Match `text` and return the captured digit runs.
    ///
    /// Leading ASCII whitespace is skipped, then the whole template must
    /// match from there. Anything after the match is ignored.
    pub fn captures<'t>(&self, text: &'t str) -> Option<Vec<&'t str>> {
        let start = text.len() - text.trim_start_matches(is_space).len();
        let mut captures = Vec::with_capacity(self.capture_count());
        if match_tokens(&self.tokens, text, start, &mut captures) {
            Some(captures)
        } else {
            None
        }
    }

    /// Whether `text` has the shape of this pattern
    pub fn is_match(&self, text: &str) -> bool {
        self.captures(text).is_some()
    }

    /// Validate `text`, failing with a protocol error that carries both
    /// the text and the template
    pub fn parse<'a>(&'a self, text: &'a str) -> Result<Fields<'a>> {
        match self.captures(text) {
            Some(values) => Ok(Fields {
                response: text,
                template: &self.template,
                values,
            }),
            None => Err(HvError::protocol(text, self.template.as_str())),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

/// Backtracking matcher over run lengths, longest run first
fn match_tokens<'t>(
    tokens: &[Token],
    text: &'t str,
    pos: usize,
    captures: &mut Vec<&'t str>,
) -> bool {
    let Some((token, remaining)) = tokens.split_first() else {
        return true;
    };

    match token {
        Token::Literal(lit) => {
            text[pos..].starts_with(lit.as_str())
                && match_tokens(remaining, text, pos + lit.len(), captures)
        }
        Token::Space => {
            // ASCII whitespace is one byte each
            let run = run_length(&text[pos..], is_space);
            (1..=run)
                .rev()
                .any(|len| match_tokens(remaining, text, pos + len, captures))
        }
        Token::Digit => {
            // ASCII digits are one byte each
            let run = run_length(&text[pos..], |c: char| c.is_ascii_digit());
            for len in (1..=run).rev() {
                captures.push(&text[pos..pos + len]);
                if match_tokens(remaining, text, pos + len, captures) {
                    return true;
                }
                captures.pop();
            }
            false
        }
    }
}

/// Whitespace as the unit's byte-oriented replies know it.
///
/// Latin-1 decoding turns 0x85 and 0xA0 into Unicode whitespace; those are
/// line noise here, not separators.
fn is_space(c: char) -> bool {
    c.is_ascii_whitespace() || c == '\x0b'
}

/// Byte length of the leading run of chars satisfying `pred`
fn run_length(s: &str, pred: impl Fn(char) -> bool) -> usize {
    s.char_indices()
        .find(|&(_, c)| !pred(c))
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Digit runs captured from one reply
#[derive(Debug, Clone)]
pub struct Fields<'t> {
    response: &'t str,
    template: &'t str,
    values: Vec<&'t str>,
}

impl<'t> Fields<'t> {
    /// Number of captured fields
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw text of field `index`
    pub fn get(&self, index: usize) -> Option<&'t str> {
        self.values.get(index).copied()
    }

    /// Field `index` as an unsigned integer.
    ///
    /// A missing field or a value too large for `u32` is a protocol error.
    pub fn get_u32(&self, index: usize) -> Result<u32> {
        self.get(index)
            .and_then(|digits| digits.parse().ok())
            .ok_or_else(|| HvError::protocol(self.response, self.template))
    }

    /// All fields as unsigned integers, in order
    pub fn to_u32s(&self) -> Result<Vec<u32>> {
        (0..self.len()).map(|i| self.get_u32(i)).collect()
    }
}
