//! Splitting rendered output into paste-sized chunks.

use tracing::debug;

use crate::TANA_HEADER;

/// Split Tana Paste output into chunks of at most `max_chunk_size`
/// characters where possible.
///
/// Every chunk starts with the `%%tana%%` header and ends with a newline.
/// Lines are never split, so a single line longer than the limit gets a
/// chunk of its own.
pub fn chunk_content(output: &str, max_chunk_size: usize) -> Vec<String> {
    if output.chars().count() <= max_chunk_size {
        return vec![output.to_string()];
    }

    let body = output
        .strip_prefix(TANA_HEADER)
        .map_or(output, |rest| rest.strip_prefix('\n').unwrap_or(rest));

    let mut chunks = Vec::new();
    let mut current = format!("{}\n", TANA_HEADER);
    let mut size = current.chars().count();
    let mut has_body = false;

    for line in body.lines() {
        let len = line.chars().count() + 1;
        if has_body && size + len > max_chunk_size {
            chunks.push(std::mem::replace(&mut current, format!("{}\n", TANA_HEADER)));
            size = current.chars().count();
            has_body = false;
        }
        current.push_str(line);
        current.push('\n');
        size += len;
        has_body = true;
    }
    if has_body {
        chunks.push(current);
    }

    debug!(chunks = chunks.len(), max_chunk_size, "chunked output");
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_output_is_one_chunk() {
        let out = "%%tana%%\n  - a\n";
        assert_eq!(chunk_content(out, 100), vec![out.to_string()]);
    }

    #[test]
    fn test_split_on_line_boundaries() {
        let out = "%%tana%%\n  - aaaa\n  - bbbb\n  - cccc\n";
        let chunks = chunk_content(out, 20);
        assert_eq!(
            chunks,
            vec![
                "%%tana%%\n  - aaaa\n",
                "%%tana%%\n  - bbbb\n",
                "%%tana%%\n  - cccc\n",
            ]
        );
    }

    #[test]
    fn test_oversized_line_gets_own_chunk() {
        let out = "%%tana%%\n  - short\n  - a very long line indeed\n  - x\n";
        let chunks = chunk_content(out, 20);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1], "%%tana%%\n  - a very long line indeed\n");
        assert!(chunks.iter().all(|c| c.starts_with("%%tana%%\n")));
    }

    #[test]
    fn test_chunks_keep_every_line() {
        let body: String = (0..50).map(|i| format!("  - item {}\n", i)).collect();
        let out = format!("%%tana%%\n{}", body);
        let chunks = chunk_content(&out, 64);
        let rejoined: String = chunks
            .iter()
            .map(|c| c.strip_prefix("%%tana%%\n").unwrap())
            .collect();
        assert_eq!(rejoined, body);
    }
}
