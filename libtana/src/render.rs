//! Phase 3: Renderer
//!
//! Resolves a display depth for every line and emits the Tana Paste
//! outline. Depth comes from the hierarchy, not from the source
//! indentation:
//!
//! - A header of level `N` sits at depth `N - 1`.
//! - Content whose parent is a header of level `L` sits at depth `L`.
//! - Everything else sits one level below its parent.
//!
//! Transcript quote lines and list items under an H3 get adjusted at
//! emission time. Code fences collapse into a single node.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::dates::convert_dates;
use crate::fields::convert_fields;
use crate::inline::process_inline_formatting;
use crate::options::ConvertOptions;
use crate::scanner::{Line, Parent};
use crate::transcript::speaker_line;
use crate::TANA_HEADER;

static HEADER_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,6}\s+(.+)$").expect("header text regex"));

const TIMING_MARK: &str = "startMs=";

struct Renderer<'a> {
    lines: &'a [Line],
    /// The input was classified as a speaker transcript.
    transcript: bool,
    options: &'a ConvertOptions,
    depths: Vec<usize>,
}

/// Render linked lines as Tana Paste, header included.
pub fn render(lines: &[Line], transcript: bool, options: &ConvertOptions) -> String {
    let mut renderer = Renderer {
        lines,
        transcript,
        options,
        depths: Vec::with_capacity(lines.len()),
    };
    renderer.resolve_depths();
    let out = renderer.emit();
    debug!(lines = lines.len(), bytes = out.len(), "rendered outline");
    out
}

impl Renderer<'_> {
    fn parent_of(&self, i: usize) -> Parent {
        self.lines[i].parent.unwrap_or(Parent::Root)
    }

    fn header_level(&self, parent: Parent) -> Option<usize> {
        parent.index().and_then(|p| self.lines[p].header_level)
    }

    /// Nearest header at or above `start`.
    fn header_ancestor(&self, start: Parent) -> Option<usize> {
        let mut current = start;
        while let Parent::Line(i) = current {
            if self.lines[i].is_header() {
                return Some(i);
            }
            current = self.parent_of(i);
        }
        None
    }

    fn is_quote(&self, line: &Line) -> bool {
        self.transcript && line.content.starts_with('>')
    }

    fn resolve_depths(&mut self) {
        for i in 0..self.lines.len() {
            let line = &self.lines[i];
            let parent = self.parent_of(i);
            let parent_depth = parent.index().map_or(0, |p| self.depths[p]);

            let depth = if let Some(level) = line.header_level {
                level - 1
            } else if self.is_quote(line) && line.content.contains(TIMING_MARK) {
                match self.header_ancestor(parent) {
                    Some(header) => self.depths[header] + 1,
                    None => parent_depth + 1,
                }
            } else if let Some(level) = self.header_level(parent) {
                level
            } else {
                parent_depth + 1
            };
            self.depths.push(depth);
        }
    }

    /// Final depth of line `i`, after the emission-time adjustments.
    fn display_depth(&self, i: usize) -> usize {
        let line = &self.lines[i];
        let mut depth = self.depths[i];

        if line.is_list_item() && self.header_level(self.parent_of(i)) == Some(3) {
            depth += 1;
        }

        if self.is_quote(line) {
            if let Some(header) = self.header_ancestor(Parent::Line(i)) {
                let title = &self.lines[header].content;
                let pinned = self
                    .options
                    .pinned_transcript_sections
                    .iter()
                    .find(|p| line.content.contains(TIMING_MARK) && title.contains(&p.title));
                depth = match pinned {
                    Some(section) => section.depth,
                    None => self.depths[header] + self.options.transcript_section_offset,
                };
            }
        }
        depth
    }

    fn emit(&self) -> String {
        let mut out = format!("{}\n", TANA_HEADER);
        let mut fence: Option<(usize, Vec<&str>)> = None;

        for (i, line) in self.lines.iter().enumerate() {
            if line.is_blank() {
                continue;
            }
            let depth = self.display_depth(i);

            if let Some((_, body)) = fence.as_mut() {
                if line.is_code_block {
                    push_code_block(&mut out, depth, &body[1..]);
                    fence = None;
                } else {
                    body.push(&line.raw);
                }
                continue;
            }
            if line.is_code_block {
                fence = Some((depth, vec![line.raw.as_str()]));
                continue;
            }

            push_node(&mut out, depth, &self.payload(line));
        }

        // An unclosed fence keeps everything after its opener.
        if let Some((depth, body)) = fence {
            push_code_block(&mut out, depth, &body[1..]);
        }
        out
    }

    fn payload(&self, line: &Line) -> String {
        let content = line.content.as_str();
        if line.is_header() {
            return match HEADER_TEXT.captures(content) {
                Some(caps) => caps[1].to_string(),
                None => content.to_string(),
            };
        }

        let (text, marker) = if self.is_quote(line) {
            (speaker_line(content), None)
        } else {
            match line.marker {
                Some(marker) => (marker.strip(content).to_string(), Some(marker)),
                None => (content.to_string(), None),
            }
        };

        let text = convert_fields(&text, marker);
        let text = convert_dates(&text, self.options.convert_bare_years);
        process_inline_formatting(&text)
    }
}

/// A fence with no content emits nothing.
fn push_code_block(out: &mut String, depth: usize, body: &[&str]) {
    let code = body
        .iter()
        .map(|line| line.trim())
        .collect::<Vec<_>>()
        .join("\n");
    if !code.is_empty() {
        push_node(out, depth, &code);
    }
}

fn push_node(out: &mut String, depth: usize, payload: &str) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    out.push_str("- ");
    out.push_str(payload);
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::build_hierarchy;
    use crate::scanner::scan;

    fn run(source: &str, transcript: bool) -> String {
        let mut lines = scan(source);
        build_hierarchy(&mut lines);
        render(&lines, transcript, &ConvertOptions::default())
    }

    #[test]
    fn test_headers_and_children() {
        assert_eq!(
            run("# Top\n## Sub\n- item\nText", false),
            "%%tana%%\n- Top\n  - Sub\n    - item\n  - Text\n"
        );
    }

    #[test]
    fn test_list_under_h3_gets_extra_level() {
        assert_eq!(
            run("### Deep\n- item", false),
            "%%tana%%\n    - Deep\n        - item\n"
        );
    }

    #[test]
    fn test_code_block_collapses() {
        assert_eq!(
            run("- a\n  ```\n  let x = 1;\n    y\n  ```", false),
            "%%tana%%\n  - a\n    - let x = 1;\ny\n"
        );
    }

    #[test]
    fn test_unclosed_code_block_flushed() {
        assert_eq!(run("```\nfn main() {}", false), "%%tana%%\n  - fn main() {}\n");
    }

    #[test]
    fn test_empty_code_block_skipped() {
        assert_eq!(run("```", false), "%%tana%%\n");
        assert_eq!(run("- a\n```\n```\n- b", false), "%%tana%%\n  - a\n  - b\n");
    }

    #[test]
    fn test_transcript_offset_below_header() {
        let source = "# Meeting\n\
                      \x20 > [Ann](#startMs=1&endMs=2): Hi\n\
                      \x20 > [Bob](#startMs=2&endMs=3): Hello";
        assert_eq!(
            run(source, true),
            "%%tana%%\n- Meeting\n      - Ann: Hi\n      - Bob: Hello\n"
        );
    }

    #[test]
    fn test_pinned_transcript_section() {
        let pinned = "## Section One\n    > [Ann](#startMs=1&endMs=2): Hi";
        assert_eq!(run(pinned, true), "%%tana%%\n  - Section One\n      - Ann: Hi\n");

        let other = "## Other\n    > [Ann](#startMs=1&endMs=2): Hi";
        assert_eq!(run(other, true), "%%tana%%\n  - Other\n        - Ann: Hi\n");
    }

    #[test]
    fn test_quotes_untouched_outside_transcripts() {
        assert_eq!(
            run("> [Ann](#startMs=1&endMs=2): Hi", false),
            "%%tana%%\n  - > Ann #startMs=1&endMs=2: Hi\n"
        );
    }
}
