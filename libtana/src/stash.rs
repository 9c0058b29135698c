//! Placeholder stash used to shield spans of text from later rewrites.
//!
//! Placeholders are wrapped in private-use code points so they cannot
//! collide with user text or be matched by the markup patterns.

use regex::{Captures, Regex};

const OPEN: char = '\u{E000}';
const CLOSE: char = '\u{E001}';

#[derive(Debug)]
pub(crate) struct Stash {
    tag: char,
    items: Vec<String>,
}

impl Stash {
    pub(crate) fn new(tag: char) -> Self {
        Self {
            tag,
            items: Vec::new(),
        }
    }

    /// Store `item` and return the placeholder standing in for it.
    pub(crate) fn push(&mut self, item: String) -> String {
        let key = self.key(self.items.len());
        self.items.push(item);
        key
    }

    /// Replace every match of `re` in `text` with a placeholder.
    pub(crate) fn protect(&mut self, re: &Regex, text: &str) -> String {
        re.replace_all(text, |caps: &Captures<'_>| self.push(caps[0].to_string()))
            .into_owned()
    }

    /// Put every stashed item back in place of its placeholder.
    ///
    /// Items are restored newest first: a span stashed later may contain
    /// the placeholder of an earlier one.
    pub(crate) fn restore(&self, text: &str) -> String {
        let mut out = text.to_string();
        for (i, item) in self.items.iter().enumerate().rev() {
            out = out.replacen(&self.key(i), item, 1);
        }
        out
    }

    fn key(&self, index: usize) -> String {
        format!("{}{}{}{}", OPEN, self.tag, index, CLOSE)
    }
}
