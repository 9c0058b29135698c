//! Field detection: `key: value` → `key::value`.
//!
//! Colons show up in prose all the time, so a line is only rewritten when
//! the heuristics below agree that the key reads like metadata. Each
//! heuristic is a named rule that either gives a verdict or abstains; the
//! first verdict in [`FIELD_RULES`] order wins and the fallback is prose.

use std::sync::LazyLock;

use regex::Regex;

use crate::scanner::ListMarker;

static FIELD_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*[-*+]\s+)?([^:\n]+):\s+([^\n]+)$").expect("field line regex")
});

static NUMBERED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\.\s+").expect("numbered line regex"));

static INSTRUCTIONAL_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)press|click|select|use|open|go to|install|save|using")
        .expect("instructional value regex")
});

static SENTENCE_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(The|A|An|This|That|These|Those|To|In|On|At|By|With|From|For|About)\s")
        .expect("sentence start regex")
});

static PROSE_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[;,()]").expect("prose punctuation regex"));

static FIELD_ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\([^)]*field[^)]*\)").expect("field annotation regex"));

static COMPLEX_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[;,():"']"#).expect("complex value regex"));

const INSTRUCTIONAL_WORDS: &[&str] = &[
    "step", "how to", "note", "example", "tip", "warning", "caution", "important", "remember",
    "click", "select", "choose", "press", "type", "enter", "copy", "paste", "invoke", "generate",
    "hook", "connect", "create", "toggle", "shortcut", "using", "next", "first", "second",
    "third", "fourth", "fifth", "last", "final",
];

const UI_ELEMENTS: &[&str] = &[
    "window", "dialog", "menu", "button", "link", "option", "panel", "screen", "tab", "toolbar",
    "sidebar", "modal", "keyboard", "mouse",
];

const KNOWN_FIELDS: &[&str] = &[
    // project metadata
    "name", "title", "status", "priority", "assignee", "tag", "category", "owner", "due date",
    "start date", "created", "updated", "version", "id", "type", "format",
    // content metadata
    "author", "publisher", "published", "isbn", "url", "link",
    // common
    "email", "phone", "address", "location", "property", "completion",
];

/// Outcome of a single field rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Rewrite as `key::value`.
    Field,
    /// Leave the colon alone.
    Text,
}

/// A `key: value` split of one line, plus the context the rules need.
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    pub key: &'a str,
    pub value: &'a str,
    /// The line came from a bullet or lettered list item.
    pub listed: bool,
    /// The line came from a numbered list item.
    pub numbered: bool,
}

/// A named heuristic. Returns `None` to abstain.
pub struct FieldRule {
    pub name: &'static str,
    pub check: fn(&Candidate<'_>) -> Option<Verdict>,
}

/// Field rules in precedence order.
pub const FIELD_RULES: &[FieldRule] = &[
    FieldRule { name: "standalone-text", check: standalone_text },
    FieldRule { name: "numbered-list", check: numbered_list },
    FieldRule { name: "instructional-key", check: instructional_key },
    FieldRule { name: "ui-element-key", check: ui_element_key },
    FieldRule { name: "instructional-value", check: instructional_value },
    FieldRule { name: "sentence-value", check: sentence_value },
    FieldRule { name: "field-annotation", check: field_annotation },
    FieldRule { name: "punctuated-value", check: punctuated_value },
    FieldRule { name: "known-field-key", check: known_field_key },
    FieldRule { name: "short-pair", check: short_pair },
];

fn standalone_text(c: &Candidate<'_>) -> Option<Verdict> {
    (!c.listed).then_some(Verdict::Text)
}

fn numbered_list(c: &Candidate<'_>) -> Option<Verdict> {
    c.numbered.then_some(Verdict::Text)
}

fn instructional_key(c: &Candidate<'_>) -> Option<Verdict> {
    let key = c.key.to_lowercase();
    INSTRUCTIONAL_WORDS
        .iter()
        .any(|w| key.contains(w))
        .then_some(Verdict::Text)
}

fn ui_element_key(c: &Candidate<'_>) -> Option<Verdict> {
    let key = c.key.to_lowercase();
    UI_ELEMENTS
        .iter()
        .any(|w| key.contains(w))
        .then_some(Verdict::Text)
}

fn instructional_value(c: &Candidate<'_>) -> Option<Verdict> {
    INSTRUCTIONAL_VALUE
        .is_match(c.value)
        .then_some(Verdict::Text)
}

fn sentence_value(c: &Candidate<'_>) -> Option<Verdict> {
    SENTENCE_START.is_match(c.value).then_some(Verdict::Text)
}

fn field_annotation(c: &Candidate<'_>) -> Option<Verdict> {
    if c.value.contains("(not a field)") {
        Some(Verdict::Text)
    } else if c.value.contains("(field)") {
        Some(Verdict::Field)
    } else {
        None
    }
}

fn punctuated_value(c: &Candidate<'_>) -> Option<Verdict> {
    let punctuated = PROSE_PUNCTUATION.is_match(c.value) || c.value.contains(" - ");
    (punctuated && !FIELD_ANNOTATION.is_match(c.value)).then_some(Verdict::Text)
}

fn known_field_key(c: &Candidate<'_>) -> Option<Verdict> {
    let key = c.key.to_lowercase();
    KNOWN_FIELDS
        .iter()
        .any(|f| {
            key == *f
                || key.starts_with(&format!("{} ", f))
                || key.ends_with(&format!(" {}", f))
        })
        .then_some(Verdict::Field)
}

fn short_pair(c: &Candidate<'_>) -> Option<Verdict> {
    if !c.listed || word_count(c.key) > 3 {
        return None;
    }
    let value_words = word_count(c.value);
    if value_words <= 3 && !COMPLEX_VALUE.is_match(c.value) {
        return Some(Verdict::Field);
    }
    let capitalized = c.key.chars().next().is_some_and(|ch| !ch.is_lowercase());
    (capitalized && value_words <= 5).then_some(Verdict::Field)
}

fn word_count(s: &str) -> usize {
    s.split(' ').count()
}

/// Run the rules in order; prose wins when every rule abstains.
pub fn classify(candidate: &Candidate<'_>) -> Verdict {
    FIELD_RULES
        .iter()
        .find_map(|rule| (rule.check)(candidate))
        .unwrap_or(Verdict::Text)
}

/// Rewrite `key: value` as `key::value` when the line reads like metadata.
///
/// `marker` is the list marker the line carried before it was stripped.
pub fn convert_fields(text: &str, marker: Option<ListMarker>) -> String {
    if text.contains("::") || text.contains('|') {
        return text.to_string();
    }
    let Some(caps) = FIELD_LINE.captures(text) else {
        return text.to_string();
    };

    let prefix = caps.get(1).map_or("", |m| m.as_str());
    let key = &caps[2];
    let value = &caps[3];
    if value.starts_with("[[") {
        return text.to_string();
    }

    let candidate = Candidate {
        key,
        value,
        listed: !prefix.is_empty()
            || matches!(marker, Some(ListMarker::Bullet | ListMarker::Letter)),
        numbered: marker == Some(ListMarker::Number) || NUMBERED_LINE.is_match(text),
    };
    match classify(&candidate) {
        Verdict::Field => format!("{}{}::{}", prefix, key, value),
        Verdict::Text => text.to_string(),
    }
}
