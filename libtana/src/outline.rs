//! Phase 2: Outline builder
//!
//! Assigns every non-blank line a parent, turning the flat line list into a
//! forest of parent indices. Heading depth is authoritative; literal
//! indentation only decides nesting for content that is not claimed by a
//! heading rule. Rules, in priority order:
//!
//! 1. Lines inside a code fence share the parent active when it opened.
//! 2. Headers nest under the most recent header one level up.
//! 3. List items that follow a header (only blank lines or other list items
//!    in between) belong to that header.
//! 4. `**Label:**` lead-ins belong to the current numbered section.
//! 5. Lettered runs after a colon nest one level deeper and stay aligned.
//! 6. Everything else nests by indentation.
//!
//! Parents always point backwards, so the result can never be cyclic.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use crate::scanner::{Line, ListMarker, Parent};

static NUMBERED_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#+\s+\d+\.").expect("numbered header regex"));

static SECTION_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*\*[^*:]+:\*\*").expect("section label regex"));

/// Link every non-blank line to its structural parent.
pub fn build_hierarchy(lines: &mut [Line]) {
    let mut builder = Builder::new();
    for i in 0..lines.len() {
        if lines[i].is_blank() {
            continue;
        }
        let parent = builder.place(lines, i);
        trace!(line = i, ?parent, "placed");
        lines[i].parent = Some(parent);
    }
}

struct Builder {
    /// Most recent header per level (index 0 holds H1).
    headers_at_level: Vec<Option<usize>>,
    /// Slot `k` is the parent for a line at resolved indent `k`.
    stack: Vec<Parent>,
    /// Parent shared by the lines of the open code fence.
    fence: Option<Parent>,
    /// Current numbered section header.
    section: Option<usize>,
    last_heading: Option<usize>,
}

impl Builder {
    fn new() -> Self {
        Self {
            headers_at_level: Vec::new(),
            stack: vec![Parent::Root],
            fence: None,
            section: None,
            last_heading: None,
        }
    }

    fn place(&mut self, lines: &[Line], i: usize) -> Parent {
        let line = &lines[i];

        if let Some(parent) = self.fence {
            if line.is_code_block {
                self.fence = None;
            }
            return parent;
        }
        if line.is_code_block {
            let parent = self.stack.last().copied().unwrap_or(Parent::Root);
            self.fence = Some(parent);
            return parent;
        }

        if let Some(level) = line.header_level {
            return self.place_header(line, i, level);
        }

        if line.is_list_item() {
            if let Some(heading) = self.heading_for_list(lines, i) {
                return Parent::Line(heading);
            }
        }

        if let Some(section) = self.section {
            if SECTION_LABEL.is_match(&line.content) {
                self.stack = vec![Parent::Line(section)];
                return Parent::Line(section);
            }
        }

        if line.marker == Some(ListMarker::Letter) {
            if let Some(prev) = self.lettered_run(lines, i) {
                self.stack.truncate(line.indent + 1);
                self.record(line.indent + 1, i);
                return lines[prev].parent.unwrap_or(Parent::Root);
            }
        }

        // The first lettered item after a colon looks one level deeper for
        // its parent, so it nests under the line that introduced it. When
        // the item is already indented under that line, the slot at its own
        // indent holds it.
        let after_colon = i > 0 && lines[i - 1].content.ends_with(':');
        let deeper = line.marker == Some(ListMarker::Letter)
            && after_colon
            && self.stack.len() > line.indent + 1;
        let resolved = if deeper { line.indent + 1 } else { line.indent };

        self.stack.truncate(resolved + 1);
        let parent = match self.stack.get(resolved) {
            Some(parent) => *parent,
            None => match self.section {
                Some(section) if line.indent <= 1 => Parent::Line(section),
                _ => Parent::Root,
            },
        };
        self.record(line.indent + 1, i);
        parent
    }

    fn place_header(&mut self, line: &Line, i: usize, level: usize) -> Parent {
        self.last_heading = Some(i);

        let parent = if level == 1 {
            self.section = None;
            Parent::Root
        } else {
            if NUMBERED_TITLE.is_match(&line.content) {
                self.section = Some(i);
            }
            self.headers_at_level
                .get(level - 2)
                .copied()
                .flatten()
                .map_or(Parent::Root, Parent::Line)
        };

        // A shallower heading closes every deeper subsection.
        self.headers_at_level.resize(level, None);
        self.headers_at_level[level - 1] = Some(i);

        self.stack.truncate(level + 1);
        self.record(level, i);
        parent
    }

    /// The heading a list item hangs from, when nothing but blank lines and
    /// list items separate them.
    fn heading_for_list(&self, lines: &[Line], i: usize) -> Option<usize> {
        let heading = self.last_heading?;
        lines[heading + 1..i]
            .iter()
            .all(|l| l.is_blank() || l.is_list_item())
            .then_some(heading)
    }

    /// Earlier lettered item in the same run as line `i`. The run continues
    /// across blank lines and lines nested deeper than `i`.
    fn lettered_run(&self, lines: &[Line], i: usize) -> Option<usize> {
        let indent = lines[i].indent;
        for j in (0..i).rev() {
            let line = &lines[j];
            if line.is_blank() {
                continue;
            }
            if line.marker == Some(ListMarker::Letter) && line.parent.is_some() {
                return Some(j);
            }
            if line.indent > indent {
                continue;
            }
            return None;
        }
        None
    }

    fn record(&mut self, slot: usize, index: usize) {
        if self.stack.len() <= slot {
            self.stack.resize(slot + 1, Parent::Root);
        }
        self.stack[slot] = Parent::Line(index);
    }
}
