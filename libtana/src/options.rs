//! Conversion options and their TOML form.
//!
//! Every key is optional; a file only overrides what it names.
//!
//! ```toml
//! transcript_section_offset = 3
//! transcript_min_lines = 3
//! convert_bare_years = false
//! split_timestamps = true
//! max_chunk_size = 90000
//!
//! [[pinned_transcript_sections]]
//! title = "Section One"
//! depth = 3
//! ```

use std::path::Path;

use toml_edit::{DocumentMut, Item, Value};
use tracing::debug;

use crate::error::{Error, Result};

/// Default maximum size of one output chunk, in characters.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 90_000;

/// A header title whose transcript lines render at a fixed depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinnedSection {
    /// Matched as a substring of the header text.
    pub title: String,
    pub depth: usize,
}

/// Tunable heuristics for a conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Depth added below a section header for transcript quote lines.
    pub transcript_section_offset: usize,
    pub pinned_transcript_sections: Vec<PinnedSection>,
    /// Speaker quote lines needed before input is treated as a transcript.
    pub transcript_min_lines: usize,
    /// Wrap a lone four-digit number as a date reference.
    pub convert_bare_years: bool,
    /// Split `Transcript:` lines at `(MM:SS)` timestamps.
    pub split_timestamps: bool,
    /// Upper bound for one chunk of output, in characters.
    pub max_chunk_size: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            transcript_section_offset: 3,
            pinned_transcript_sections: vec![PinnedSection {
                title: "Section One".to_string(),
                depth: 3,
            }],
            transcript_min_lines: 3,
            convert_bare_years: false,
            split_timestamps: true,
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
        }
    }
}

impl ConvertOptions {
    /// Parse options from TOML text, starting from the defaults.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let doc: DocumentMut = input.parse()?;
        let mut options = Self::default();

        for (key, item) in doc.iter() {
            match key {
                "transcript_section_offset" => {
                    options.transcript_section_offset = usize_item(key, item)?;
                }
                "transcript_min_lines" => {
                    options.transcript_min_lines = usize_item(key, item)?;
                }
                "convert_bare_years" => options.convert_bare_years = bool_item(key, item)?,
                "split_timestamps" => options.split_timestamps = bool_item(key, item)?,
                "max_chunk_size" => {
                    let size = usize_item(key, item)?;
                    if size == 0 {
                        return Err(Error::invalid(key, "must be greater than zero"));
                    }
                    options.max_chunk_size = size;
                }
                "pinned_transcript_sections" => {
                    options.pinned_transcript_sections = pinned_sections(key, item)?;
                }
                _ => return Err(Error::invalid(key, "unknown option")),
            }
        }

        debug!(?options, "loaded options");
        Ok(options)
    }

    /// Read and parse an options file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        debug!(path = %path.display(), "reading options");
        Self::from_toml_str(&text)
    }
}

fn usize_item(key: &str, item: &Item) -> Result<usize> {
    usize_value(key, item.as_value())
}

fn usize_value(key: &str, value: Option<&Value>) -> Result<usize> {
    let n = value
        .and_then(Value::as_integer)
        .ok_or_else(|| Error::invalid(key, "expected an integer"))?;
    usize::try_from(n).map_err(|_| Error::invalid(key, "must not be negative"))
}

fn bool_item(key: &str, item: &Item) -> Result<bool> {
    item.as_bool()
        .ok_or_else(|| Error::invalid(key, "expected true or false"))
}

/// Accepts an array of tables or an inline array of inline tables.
fn pinned_sections(key: &str, item: &Item) -> Result<Vec<PinnedSection>> {
    if let Some(tables) = item.as_array_of_tables() {
        return tables
            .iter()
            .map(|table| pinned_entry(key, table.iter().map(|(k, v)| (k, v.as_value()))))
            .collect();
    }
    if let Some(array) = item.as_array() {
        return array
            .iter()
            .map(|value| {
                let table = value
                    .as_inline_table()
                    .ok_or_else(|| Error::invalid(key, "expected a table"))?;
                pinned_entry(key, table.iter().map(|(k, v)| (k, Some(v))))
            })
            .collect();
    }
    Err(Error::invalid(key, "expected an array of tables"))
}

fn pinned_entry<'a>(
    key: &str,
    fields: impl Iterator<Item = (&'a str, Option<&'a Value>)>,
) -> Result<PinnedSection> {
    let mut title = None;
    let mut depth = None;
    for (field, value) in fields {
        match field {
            "title" => {
                let text = value
                    .and_then(Value::as_str)
                    .ok_or_else(|| Error::invalid(key, "title must be a string"))?;
                title = Some(text.to_string());
            }
            "depth" => depth = Some(usize_value(key, value)?),
            other => {
                return Err(Error::invalid(key, format!("unknown field \"{}\"", other)));
            }
        }
    }
    match (title, depth) {
        (Some(title), Some(depth)) => Ok(PinnedSection { title, depth }),
        _ => Err(Error::invalid(key, "each entry needs a title and a depth")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(ConvertOptions::from_toml_str("").unwrap(), ConvertOptions::default());
    }

    #[test]
    fn test_overrides_only_named_keys() {
        let options = ConvertOptions::from_toml_str("convert_bare_years = true\n").unwrap();
        assert!(options.convert_bare_years);
        assert_eq!(options.transcript_section_offset, 3);
        assert_eq!(options.max_chunk_size, DEFAULT_MAX_CHUNK_SIZE);
    }

    #[test]
    fn test_pinned_sections_array_of_tables() {
        let input = "[[pinned_transcript_sections]]\ntitle = \"Intro\"\ndepth = 1\n\n\
                     [[pinned_transcript_sections]]\ntitle = \"Outro\"\ndepth = 2\n";
        let options = ConvertOptions::from_toml_str(input).unwrap();
        assert_eq!(
            options.pinned_transcript_sections,
            vec![
                PinnedSection { title: "Intro".to_string(), depth: 1 },
                PinnedSection { title: "Outro".to_string(), depth: 2 },
            ]
        );
    }

    #[test]
    fn test_pinned_sections_inline() {
        let input = "pinned_transcript_sections = [{ title = \"Q&A\", depth = 4 }]\n";
        let options = ConvertOptions::from_toml_str(input).unwrap();
        assert_eq!(options.pinned_transcript_sections[0].title, "Q&A");
        assert_eq!(options.pinned_transcript_sections[0].depth, 4);

        let cleared = ConvertOptions::from_toml_str("pinned_transcript_sections = []\n").unwrap();
        assert!(cleared.pinned_transcript_sections.is_empty());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            ConvertOptions::from_toml_str("colour = \"blue\"\n"),
            Err(Error::InvalidOption { .. })
        ));
        assert!(matches!(
            ConvertOptions::from_toml_str("transcript_min_lines = -1\n"),
            Err(Error::InvalidOption { .. })
        ));
        assert!(matches!(
            ConvertOptions::from_toml_str("split_timestamps = \"yes\"\n"),
            Err(Error::InvalidOption { .. })
        ));
        assert!(matches!(
            ConvertOptions::from_toml_str("max_chunk_size = 0\n"),
            Err(Error::InvalidOption { .. })
        ));
        assert!(matches!(
            ConvertOptions::from_toml_str("this is = = not toml"),
            Err(Error::Toml(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ConvertOptions::load("/nonexistent/tana.toml").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
