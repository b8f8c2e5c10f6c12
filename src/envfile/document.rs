//! Line-preserving model of a `.env` file
//!
//! Every line keeps its original text so that rendering an unmodified document
//! reproduces the input byte for byte. Only lines that are explicitly archived,
//! replaced or appended ever change.

use crate::error::{AutomatorError, AutomatorResult};

/// Prefix written in front of archived entries
pub const ARCHIVE_MARKER: &str = "# OLD_";

/// A key/value pair to be written to an env file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvEntry {
    pub key: String,
    pub value: String,
}

impl EnvEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Keys written by this tool are uppercase underscore tokens
    pub fn validate_key(key: &str) -> AutomatorResult<()> {
        let mut chars = key.chars();
        let valid_first = chars
            .next()
            .is_some_and(|c| c.is_ascii_uppercase() || c == '_');
        let valid_rest = chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_');

        if valid_first && valid_rest {
            Ok(())
        } else {
            Err(AutomatorError::Validation(format!(
                "Invalid env key '{}': expected uppercase letters, digits and underscores",
                key
            )))
        }
    }

    /// Render as a `KEY=value` line, quoting the value when needed
    pub fn render(&self) -> String {
        format!("{}={}", self.key, render_value(&self.value))
    }
}

/// What a single line of the file holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Comment,
    /// An active `KEY=value` assignment
    Entry { key: String, value: String },
    /// Anything else; kept verbatim, never interpreted
    Unparsed,
}

/// One line of an env file with its original text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvLine {
    raw: String,
    kind: LineKind,
}

impl EnvLine {
    pub fn parse(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            kind: classify(raw),
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> &LineKind {
        &self.kind
    }

    /// Key of an active entry line
    pub fn key(&self) -> Option<&str> {
        match &self.kind {
            LineKind::Entry { key, .. } => Some(key),
            _ => None,
        }
    }
}

/// An env file as an ordered sequence of lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvDocument {
    lines: Vec<EnvLine>,
    trailing_newline: bool,
    /// Lines end in `\r\n`; added lines follow suit
    crlf: bool,
}

impl EnvDocument {
    pub fn parse(contents: &str) -> Self {
        if contents.is_empty() {
            return Self::default();
        }

        let (body, trailing_newline) = match contents.strip_suffix('\n') {
            Some(body) => (body, true),
            None => (contents, false),
        };

        Self {
            lines: body.split('\n').map(EnvLine::parse).collect(),
            trailing_newline,
            crlf: contents.contains("\r\n"),
        }
    }

    pub fn render(&self) -> String {
        let mut out = self
            .lines
            .iter()
            .map(EnvLine::raw)
            .collect::<Vec<_>>()
            .join("\n");
        if self.trailing_newline && !self.lines.is_empty() {
            out.push('\n');
        }
        out
    }

    pub fn lines(&self) -> &[EnvLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Active entries in file order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.lines.iter().filter_map(|line| match &line.kind {
            LineKind::Entry { key, value } => Some((key.as_str(), value.as_str())),
            _ => None,
        })
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.lines.iter().any(|line| line.key() == Some(key))
    }

    /// Value of the last active entry with `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries()
            .filter(|(k, _)| *k == key)
            .map(|(_, v)| v)
            .last()
    }

    /// Comment out every active line with `key` as `# OLD_<line>`
    ///
    /// Returns the number of lines archived.
    pub fn archive(&mut self, key: &str) -> usize {
        let mut archived = 0;
        for line in self.lines.iter_mut().filter(|l| l.key() == Some(key)) {
            let text = line.raw.trim_start();
            let text = text.strip_prefix("export ").unwrap_or(text).trim_start();
            *line = EnvLine::parse(&format!("{}{}", ARCHIVE_MARKER, text));
            archived += 1;
        }
        archived
    }

    /// Replace the value of every active line with `key`
    ///
    /// Returns false when the key is absent.
    pub fn set(&mut self, entry: &EnvEntry) -> bool {
        let rendered = self.with_line_ending(entry.render());
        let mut found = false;
        for line in self
            .lines
            .iter_mut()
            .filter(|l| l.key() == Some(entry.key.as_str()))
        {
            *line = EnvLine::parse(&rendered);
            found = true;
        }
        found
    }

    pub fn push_entry(&mut self, entry: &EnvEntry) {
        self.push_raw(&entry.render());
    }

    pub fn push_comment(&mut self, text: &str) {
        if text.starts_with('#') {
            self.push_raw(text);
        } else {
            self.push_raw(&format!("# {}", text));
        }
    }

    /// Append a blank line unless the document is empty or already ends with one
    pub fn push_separator(&mut self) {
        let ends_blank = self
            .lines
            .last()
            .map_or(true, |l| l.kind == LineKind::Blank);
        if !ends_blank {
            self.push_raw("");
        }
    }

    fn push_raw(&mut self, raw: &str) {
        if self.crlf && !self.trailing_newline {
            if let Some(last) = self.lines.last_mut() {
                if !last.raw.ends_with('\r') {
                    last.raw.push('\r');
                }
            }
        }
        let raw = self.with_line_ending(raw.to_string());
        self.lines.push(EnvLine::parse(&raw));
        self.trailing_newline = true;
    }

    /// Raw lines keep their `\r`, so new ones get it too in CRLF files
    fn with_line_ending(&self, mut raw: String) -> String {
        if self.crlf {
            raw.push('\r');
        }
        raw
    }
}

fn classify(raw: &str) -> LineKind {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }
    if trimmed.starts_with('#') {
        return LineKind::Comment;
    }

    let assignment = trimmed.strip_prefix("export ").unwrap_or(trimmed);
    let Some((key, value)) = assignment.split_once('=') else {
        return LineKind::Unparsed;
    };

    let key = key.trim();
    if !is_key(key) {
        return LineKind::Unparsed;
    }

    LineKind::Entry {
        key: key.to_string(),
        value: parse_value(value.trim()),
    }
}

fn is_key(key: &str) -> bool {
    let mut chars = key.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

fn parse_value(value: &str) -> String {
    if let Some(rest) = value.strip_prefix('"') {
        let mut out = String::new();
        let mut chars = rest.chars();
        while let Some(c) = chars.next() {
            match c {
                '"' => return out,
                '\\' => match chars.next() {
                    Some('n') => out.push('\n'),
                    Some(other) => out.push(other),
                    None => out.push('\\'),
                },
                c => out.push(c),
            }
        }
        // Unterminated quote: keep the raw remainder.
        return value.to_string();
    }

    if let Some(rest) = value.strip_prefix('\'') {
        if let Some((inner, _)) = rest.split_once('\'') {
            return inner.to_string();
        }
        return value.to_string();
    }

    match value.find(" #") {
        Some(idx) => value[..idx].trim_end().to_string(),
        None => value.to_string(),
    }
}

fn render_value(value: &str) -> String {
    let needs_quotes = value
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '#' | '"' | '\'' | '\\' | '$' | '`'));
    if !needs_quotes {
        return value.to_string();
    }

    if !value.contains('\'') && !value.contains('\n') {
        return format!("'{}'", value);
    }

    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '$' => out.push_str("\\$"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
