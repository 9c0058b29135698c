//! Inline markup rewriting: markdown emphasis, images and links to their
//! Tana Paste spellings.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::stash::Stash;

static PROTECTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[.*?\]\]|https?://[^\s)]+").expect("protected regex"));

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("bold regex"));

static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*]+)\*").expect("italic regex"));

static HIGHLIGHT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"==([^=]+)==").expect("highlight regex"));

static IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").expect("image regex"));

static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("link regex"));

static BRACKETED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]").expect("bracketed regex"));

/// Rewrite inline markdown in one line of text.
///
/// - `**bold**` is kept as is
/// - `*italic*` becomes `__italic__`
/// - `==highlight==` becomes `^^highlight^^`
/// - `![alt](url)` becomes `alt::!alt url`, or `!Image url` without alt text
/// - `[text](url)` becomes `text url`
///
/// URLs, `[[references]]` and other bracketed text pass through untouched.
pub fn process_inline_formatting(text: &str) -> String {
    // One stash for every shielded span, so a span can hold the
    // placeholders of spans shielded before it.
    let mut stash = Stash::new('p');

    let text = stash.protect(&PROTECTED, text);
    let text = BOLD
        .replace_all(&text, |caps: &Captures<'_>| {
            stash.push(format!("**{}**", &caps[1]))
        })
        .into_owned();

    let text = ITALIC.replace_all(&text, "__${1}__");
    let text = HIGHLIGHT.replace_all(&text, "^^${1}^^");
    let text = IMAGE.replace_all(&text, |caps: &Captures<'_>| {
        let (alt, url) = (&caps[1], &caps[2]);
        if alt.is_empty() {
            format!("!Image {}", url)
        } else {
            format!("{}::!{} {}", alt, alt, url)
        }
    });
    let text = LINK
        .replace_all(&text, |caps: &Captures<'_>| {
            stash.push(format!("{} {}", &caps[1], &caps[2]))
        })
        .into_owned();
    let text = stash.protect(&BRACKETED, &text);

    stash.restore(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emphasis() {
        assert_eq!(process_inline_formatting("**bold** text"), "**bold** text");
        assert_eq!(process_inline_formatting("an *italic* word"), "an __italic__ word");
        assert_eq!(process_inline_formatting("==marked=="), "^^marked^^");
        assert_eq!(
            process_inline_formatting("**bold** and *soft*"),
            "**bold** and __soft__"
        );
    }

    #[test]
    fn test_links() {
        assert_eq!(
            process_inline_formatting("see [docs](https://docs.rs)"),
            "see docs https://docs.rs"
        );
        assert_eq!(
            process_inline_formatting("[a](x) and [b](y)"),
            "a x and b y"
        );
    }

    #[test]
    fn test_images() {
        assert_eq!(
            process_inline_formatting("![Logo](https://x.io/logo.png)"),
            "Logo::!Logo https://x.io/logo.png"
        );
        assert_eq!(
            process_inline_formatting("![](https://x.io/a.png)"),
            "!Image https://x.io/a.png"
        );
    }

    #[test]
    fn test_protected_text() {
        assert_eq!(
            process_inline_formatting("[[date:2024-01-01]] and [[Node]]"),
            "[[date:2024-01-01]] and [[Node]]"
        );
        assert_eq!(
            process_inline_formatting("https://x.io/*not*italic*"),
            "https://x.io/*not*italic*"
        );
        assert_eq!(process_inline_formatting("[note] here"), "[note] here");
        assert_eq!(process_inline_formatting("- [ ] task"), "- [ ] task");
    }

    #[test]
    fn test_brackets_around_shielded_spans() {
        assert_eq!(
            process_inline_formatting("see [a [[Node]] b]"),
            "see [a [[Node]] b]"
        );
        assert_eq!(
            process_inline_formatting("[draft **now**] ok"),
            "[draft **now**] ok"
        );
        assert_eq!(
            process_inline_formatting("[ref https://x.io]"),
            "[ref https://x.io]"
        );
        assert!(!process_inline_formatting("[x [[y]]] [z](https://a.io)").contains('\u{E000}'));
    }
}
