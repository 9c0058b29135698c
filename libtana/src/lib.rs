//! Markdown to Tana Paste converter.
//!
//! Turns loosely structured text (markdown notes, LLM answers, meeting and
//! video transcripts) into the indented outline that Tana accepts on paste:
//!
//! ```text
//! %%tana%%
//! - Heading
//!   - child
//! ```
//!
//! # Conversion Pipeline
//!
//! The converter operates in three phases:
//!
//! 1. **Scanner**: Splits source text into lines, extracting indentation,
//!    header levels, code fences and list markers.
//!
//! 2. **Outline Builder**: Links every line to a parent line, treating
//!    heading depth as authoritative over literal indentation.
//!
//! 3. **Renderer**: Resolves display depths and rewrites each line's text
//!    (fields, dates, inline markup) on the way out.
//!
//! Conversion never fails. Odd input produces a flatter outline, not an
//! error.

mod chunk;
pub mod dates;
mod error;
pub mod fields;
mod inline;
mod options;
mod outline;
mod render;
mod scanner;
mod stash;
mod transcript;

use tracing::debug;

pub use chunk::chunk_content;
pub use error::{Error, Result};
pub use inline::process_inline_formatting;
pub use options::{ConvertOptions, PinnedSection, DEFAULT_MAX_CHUNK_SIZE};
pub use scanner::{Line, ListMarker, Parent};
pub use transcript::{is_transcript, split_timestamps};

/// First line of every Tana Paste document.
pub const TANA_HEADER: &str = "%%tana%%";

/// Returned in place of output when there is nothing to convert.
pub const NO_TEXT_SELECTED: &str = "No text selected.";

/// Convert markdown to Tana Paste with the default options.
///
/// # Example
///
/// ```
/// let out = libtana::convert("- First item\n- Second item");
/// assert_eq!(out, "%%tana%%\n  - First item\n  - Second item\n");
/// ```
pub fn convert(input: &str) -> String {
    convert_with_options(input, &ConvertOptions::default())
}

/// Convert possibly absent input; `None` gets the no-text notice.
pub fn convert_opt(input: Option<&str>) -> String {
    input.map_or_else(|| NO_TEXT_SELECTED.to_string(), convert)
}

/// Convert markdown to Tana Paste.
pub fn convert_with_options(input: &str, options: &ConvertOptions) -> String {
    if input.is_empty() {
        return NO_TEXT_SELECTED.to_string();
    }

    let transcript = is_transcript(input, options.transcript_min_lines);

    let source = if options.split_timestamps {
        input
            .split('\n')
            .flat_map(split_timestamps)
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        input.to_string()
    };

    // Phase 1: Scan source into lines
    let mut lines = scanner::scan(&source);

    // Phase 2: Link lines into an outline
    outline::build_hierarchy(&mut lines);
    debug!(lines = lines.len(), transcript, "built outline");

    // Phase 3: Render
    render::render(&lines, transcript, options)
}

/// Parse and link `input` without rendering, for inspecting the outline.
pub fn parse_outline(input: &str) -> Vec<Line> {
    let mut lines = scanner::scan(input);
    outline::build_hierarchy(&mut lines);
    lines
}

/// Normalise a `|`-delimited table row: cells trimmed, empty cells
/// dropped, rejoined with ` | `.
pub fn process_table_row(row: &str) -> String {
    row.split('|')
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .collect::<Vec<_>>()
        .join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(convert(""), NO_TEXT_SELECTED);
        assert_eq!(convert_opt(None), NO_TEXT_SELECTED);
        assert_eq!(convert_opt(Some("")), NO_TEXT_SELECTED);
    }

    #[test]
    fn test_whitespace_only_input() {
        assert_eq!(convert("   \n\n"), "%%tana%%\n");
    }

    #[test]
    fn test_table_row() {
        assert_eq!(process_table_row("| a | b  |  | c |"), "a | b | c");
        assert_eq!(process_table_row("||"), "");
    }

    #[test]
    fn test_timestamp_splitting_can_be_disabled() {
        let input = "Transcript: (0:01) hello (0:02) world";
        let split = convert(input);
        assert_eq!(split.lines().count(), 3);

        let options = ConvertOptions {
            split_timestamps: false,
            ..ConvertOptions::default()
        };
        assert_eq!(convert_with_options(input, &options).lines().count(), 2);
    }
}
