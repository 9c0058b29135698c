//! Transcript handling.
//!
//! Two shapes of transcript are recognized:
//!
//! - Speaker quotes from meeting recorders:
//!   `> [Speaker](#startMs=1000&endMs=2000): text`
//! - Video transcripts on one line, with `(MM:SS)` or `(HH:MM:SS)` stamps
//!   after a `Transcript:` label.

use std::sync::LazyLock;

use regex::Regex;

static SPEAKER_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^>\s*\[(.*?)\]\(#startMs=\d+&endMs=\d+\):").expect("speaker prefix regex")
});

static SPEAKER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^>\s*\[(.*?)\]\(#startMs=\d+&endMs=\d+\):\s*(.*?)$")
        .expect("speaker line regex")
});

static TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\((\d{1,2}:\d{2}(?::\d{2})?)\)").expect("timestamp regex")
});

static LABEL_QUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"Transcript:\s*""#).expect("label quote regex"));

const LABEL: &str = "Transcript:";

/// Whether `input` holds at least `min_lines` speaker quote lines.
pub fn is_transcript(input: &str, min_lines: usize) -> bool {
    input
        .split('\n')
        .filter(|line| SPEAKER_PREFIX.is_match(line))
        .take(min_lines)
        .count()
        >= min_lines
}

/// Rewrite a speaker quote as `Speaker: text`. Other lines pass through.
pub fn speaker_line(content: &str) -> String {
    match SPEAKER_LINE.captures(content) {
        Some(caps) => format!("{}: {}", &caps[1], &caps[2]),
        None => content.to_string(),
    }
}

/// Split a `Transcript:` line so every timestamp starts its own segment.
///
/// The first segment keeps the label. Lines without the label or without
/// timestamps come back as a single segment.
pub fn split_timestamps(line: &str) -> Vec<String> {
    if !line.contains(LABEL) || !TIMESTAMP.is_match(line) {
        return vec![line.to_string()];
    }

    let cleaned = LABEL_QUOTE.replace(line, "Transcript: ");
    let cleaned = cleaned.strip_suffix('"').unwrap_or(&cleaned);

    let starts: Vec<usize> = TIMESTAMP.find_iter(cleaned).map(|m| m.start()).collect();
    let Some(&first) = starts.first() else {
        return vec![line.to_string()];
    };

    let label_at = cleaned.find(LABEL).unwrap_or(0);
    let lead = cleaned.get(label_at..first).unwrap_or("").trim();

    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(cleaned.len());
            let body = cleaned[start..end].trim();
            if i == 0 {
                format!("{} {}", lead, body)
            } else {
                body.to_string()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "> [Alice](#startMs=1000&endMs=2000): Hello\n\
                          > [Bob](#startMs=2000&endMs=3000): Hi\n\
                          > [Alice](#startMs=3000&endMs=4000): Bye";

    #[test]
    fn test_is_transcript() {
        assert!(is_transcript(SAMPLE, 3));
        assert!(!is_transcript(SAMPLE, 4));
        assert!(!is_transcript("> just a quote\n> another", 1));
    }

    #[test]
    fn test_speaker_line() {
        assert_eq!(
            speaker_line("> [Alice](#startMs=1000&endMs=2000): Hello there"),
            "Alice: Hello there"
        );
        assert_eq!(speaker_line("> plain quote"), "> plain quote");
    }

    #[test]
    fn test_split_timestamps() {
        let line = r#"Transcript: "(0:00) Intro here (1:15) Main part (1:02:03) Outro""#;
        assert_eq!(
            split_timestamps(line),
            vec![
                "Transcript: (0:00) Intro here",
                "(1:15) Main part",
                "(1:02:03) Outro",
            ]
        );
    }

    #[test]
    fn test_split_keeps_text_before_first_stamp() {
        assert_eq!(
            split_timestamps("Transcript: welcome (0:05) first (0:10) second"),
            vec!["Transcript: welcome (0:05) first", "(0:10) second"]
        );
    }

    #[test]
    fn test_split_passthrough() {
        assert_eq!(split_timestamps("Notes (1:15) here"), vec!["Notes (1:15) here"]);
        assert_eq!(split_timestamps("Transcript: none"), vec!["Transcript: none"]);
    }
}
