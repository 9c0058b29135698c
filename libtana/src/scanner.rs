//! Phase 1: Scanner
//!
//! The scanner converts raw source text into lines. It performs:
//! - Indentation counting (tabs count as two spaces, two spaces per level)
//! - Header detection (`#` runs followed by whitespace)
//! - Code fence detection
//! - List marker classification (bullets, lettered and numbered items)
//!
//! Scanning never fails. Blank lines are kept so that line indices stay
//! aligned with the source.

use std::sync::LazyLock;

use regex::Regex;

static HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#+)\s").expect("header regex"));

pub(crate) static BULLET_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*+•]\s+").expect("bullet marker regex"));

pub(crate) static LETTER_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z]\.\s+").expect("letter marker regex"));

pub(crate) static NUMBER_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s+").expect("number marker regex"));

static CHECKBOX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[[ x]\]").expect("checkbox regex"));

const CODE_FENCE: &str = "```";

/// Structural parent of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parent {
    /// Top of the outline.
    Root,
    /// Index of an earlier line.
    Line(usize),
}

impl Parent {
    /// Returns the line index, or `None` for the root.
    pub fn index(self) -> Option<usize> {
        match self {
            Parent::Root => None,
            Parent::Line(i) => Some(i),
        }
    }
}

/// Kind of list marker that opens a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMarker {
    /// `-`, `*`, `+` or `•`.
    Bullet,
    /// `a.` through `z.`, either case.
    Letter,
    /// `1.`, `2.`, ...
    Number,
}

impl ListMarker {
    /// Classify the marker at the start of trimmed content, if any.
    pub fn detect(content: &str) -> Option<Self> {
        if BULLET_MARKER.is_match(content) {
            Some(ListMarker::Bullet)
        } else if LETTER_MARKER.is_match(content) {
            Some(ListMarker::Letter)
        } else if NUMBER_MARKER.is_match(content) {
            Some(ListMarker::Number)
        } else {
            None
        }
    }

    /// Remove exactly one marker of this kind from the start of `content`.
    ///
    /// A bullet followed by a checkbox (`- [ ] task`) is left alone so the
    /// checkbox survives.
    pub fn strip(self, content: &str) -> &str {
        let re: &Regex = match self {
            ListMarker::Bullet => &BULLET_MARKER,
            ListMarker::Letter => &LETTER_MARKER,
            ListMarker::Number => &NUMBER_MARKER,
        };
        match re.find(content) {
            Some(m) => {
                let rest = &content[m.end()..];
                if self == ListMarker::Bullet && CHECKBOX.is_match(rest) {
                    content
                } else {
                    rest
                }
            }
            None => content,
        }
    }
}

/// A single line after the scanning phase.
#[derive(Debug, Clone)]
pub struct Line {
    /// Content after indentation, with trailing whitespace trimmed.
    pub content: String,
    /// Indentation depth (leading whitespace / 2).
    pub indent: usize,
    /// Original text of the line.
    pub raw: String,
    /// Number of leading `#` when the line is a header.
    pub header_level: Option<usize>,
    /// Whether the line opens or closes a code fence.
    pub is_code_block: bool,
    /// List marker opening the line, if any.
    pub marker: Option<ListMarker>,
    /// Assigned by the hierarchy builder.
    pub parent: Option<Parent>,
}

impl Line {
    /// Parse one physical line.
    pub fn parse(raw: &str) -> Self {
        let (indent, rest) = split_indent(raw);
        let content = rest.trim_end();

        let header_level = HEADER
            .captures(content)
            .map(|caps| caps[1].len());

        Line {
            content: content.to_string(),
            indent,
            raw: raw.to_string(),
            header_level,
            is_code_block: content.starts_with(CODE_FENCE),
            marker: ListMarker::detect(content),
            parent: None,
        }
    }

    pub fn is_header(&self) -> bool {
        self.header_level.is_some()
    }

    pub fn is_list_item(&self) -> bool {
        self.marker.is_some()
    }

    pub fn is_blank(&self) -> bool {
        self.content.is_empty()
    }
}

/// Scan source text into lines, one per `\n`-separated row.
pub fn scan(source: &str) -> Vec<Line> {
    source.split('\n').map(Line::parse).collect()
}

/// Split leading whitespace from a line, returning its depth and the rest.
fn split_indent(line: &str) -> (usize, &str) {
    let rest = line.trim_start();
    let leading = &line[..line.len() - rest.len()];
    let spaces: usize = leading
        .chars()
        .map(|c| if c == '\t' { 2 } else { 1 })
        .sum();
    (spaces / 2, rest)
}
