//! Parser for the tfvars assignment syntax
//!
//! Accepts the subset the renderer emits plus the conveniences found in
//! hand-authored files: `#`/`//` comments, multi-line lists, trailing
//! commas, and quoted map keys. Errors carry the 1-based line number.

use std::fmt;
use std::path::Path;

use crate::error::{PilotError, PilotResult};

use super::{Document, TfValue};

/// Syntax error with the line it occurred on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Parse a tfvars document from text.
pub fn parse_str(text: &str) -> Result<Document, ParseError> {
    Parser::new(text).document()
}

/// Parse a tfvars document from a file, attaching the path to any error.
pub fn parse_file(path: &Path) -> PilotResult<Document> {
    let text = std::fs::read_to_string(path)?;
    parse_str(&text).map_err(|err| PilotError::TfvarsParse {
        file: path.to_path_buf(),
        line: err.line,
        message: err.message,
    })
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl Parser {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
        }
        Some(ch)
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            line: self.line,
            message: message.into(),
        }
    }

    fn at_comment(&self) -> bool {
        matches!(self.peek(), Some('#'))
            || (self.peek() == Some('/') && self.peek_at(1) == Some('/'))
    }

    fn skip_to_eol(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.bump();
        }
    }

    /// Skip spaces, tabs, carriage returns and comments; newlines too when
    /// `through_newlines` is set.
    fn skip_blank(&mut self, through_newlines: bool) {
        loop {
            match self.peek() {
                Some(' ' | '\t' | '\r') => {
                    self.bump();
                }
                Some('\n') if through_newlines => {
                    self.bump();
                }
                _ if self.at_comment() => self.skip_to_eol(),
                _ => break,
            }
        }
    }

    fn document(&mut self) -> Result<Document, ParseError> {
        let mut doc = Document::new();
        loop {
            self.skip_blank(true);
            if self.peek().is_none() {
                return Ok(doc);
            }
            let (key, value) = self.entry()?;
            doc.insert(key, value);
            self.skip_blank(false);
            match self.peek() {
                None => return Ok(doc),
                Some('\n') => {
                    self.bump();
                }
                Some(other) => {
                    return Err(self.error(format!("expected newline after value, found '{other}'")))
                }
            }
        }
    }

    fn entry(&mut self) -> Result<(String, TfValue), ParseError> {
        let key = self.key()?;
        self.skip_blank(false);
        match self.bump() {
            Some('=') => {}
            _ => return Err(self.error(format!("expected '=' after key '{key}'"))),
        }
        self.skip_blank(false);
        let value = self.value()?;
        Ok((key, value))
    }

    fn key(&mut self) -> Result<String, ParseError> {
        match self.peek() {
            Some('"') => self.string(),
            Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => {
                let mut key = String::new();
                while let Some(ch) = self.peek() {
                    if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' {
                        key.push(ch);
                        self.bump();
                    } else {
                        break;
                    }
                }
                Ok(key)
            }
            Some(other) => Err(self.error(format!("expected key, found '{other}'"))),
            None => Err(self.error("expected key, found end of input")),
        }
    }

    fn value(&mut self) -> Result<TfValue, ParseError> {
        match self.peek() {
            Some('"') => Ok(TfValue::String(self.string()?)),
            Some('[') => self.list(),
            Some('{') => self.map(),
            Some(ch) if ch.is_ascii_digit() || ch == '-' || ch == '+' => self.number(),
            Some(ch) if ch.is_ascii_alphabetic() => {
                let word = self.key()?;
                match word.as_str() {
                    "true" => Ok(TfValue::Bool(true)),
                    "false" => Ok(TfValue::Bool(false)),
                    other => Err(self.error(format!("unexpected identifier '{other}'"))),
                }
            }
            Some(other) => Err(self.error(format!("expected value, found '{other}'"))),
            None => Err(self.error("expected value, found end of input")),
        }
    }

    fn list(&mut self) -> Result<TfValue, ParseError> {
        self.bump(); // '['
        let mut items = Vec::new();
        loop {
            self.skip_blank(true);
            match self.peek() {
                Some(']') => {
                    self.bump();
                    return Ok(TfValue::List(items));
                }
                None => return Err(self.error("unterminated list")),
                _ => {}
            }
            items.push(self.value()?);
            self.skip_blank(true);
            if self.peek() == Some(',') {
                self.bump();
            }
        }
    }

    fn map(&mut self) -> Result<TfValue, ParseError> {
        self.bump(); // '{'
        let mut doc = Document::new();
        loop {
            self.skip_blank(true);
            match self.peek() {
                Some('}') => {
                    self.bump();
                    return Ok(TfValue::Map(doc));
                }
                None => return Err(self.error("unterminated map")),
                _ => {}
            }
            let (key, value) = self.entry()?;
            doc.insert(key, value);
            self.skip_blank(false);
            match self.peek() {
                Some(',') | Some('\n') => {
                    self.bump();
                }
                Some('}') | None => {}
                Some(other) => {
                    return Err(self.error(format!("expected ',' or newline in map, found '{other}'")))
                }
            }
        }
    }

    fn number(&mut self) -> Result<TfValue, ParseError> {
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() || matches!(ch, '.' | 'e' | 'E' | '+' | '-') {
                text.push(ch);
                self.bump();
            } else {
                break;
            }
        }
        if text.contains(['.', 'e', 'E']) {
            text.parse::<f64>()
                .map(TfValue::Float)
                .map_err(|_| self.error(format!("invalid number '{text}'")))
        } else {
            text.parse::<i64>()
                .map(TfValue::Int)
                .map_err(|_| self.error(format!("invalid number '{text}'")))
        }
    }

    fn string(&mut self) -> Result<String, ParseError> {
        self.bump(); // '"'
        let mut text = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some('"') => return Ok(text),
                Some('\\') => match self.bump() {
                    Some('n') => text.push('\n'),
                    Some('t') => text.push('\t'),
                    Some('r') => text.push('\r'),
                    Some('"') => text.push('"'),
                    Some('\\') => text.push('\\'),
                    Some('/') => text.push('/'),
                    Some('u') => {
                        let mut code = String::new();
                        for _ in 0..4 {
                            match self.bump() {
                                Some(ch) if ch.is_ascii_hexdigit() => code.push(ch),
                                _ => return Err(self.error("invalid \\u escape")),
                            }
                        }
                        let value = u32::from_str_radix(&code, 16)
                            .ok()
                            .and_then(char::from_u32)
                            .ok_or_else(|| self.error("invalid \\u escape"))?;
                        text.push(value);
                    }
                    Some(other) => {
                        return Err(self.error(format!("unknown escape '\\{other}'")))
                    }
                    None => return Err(self.error("unterminated string")),
                },
                Some(ch) => text.push(ch),
            }
        }
    }
}
