//! Error types for loading options and reading input.
//!
//! Conversion itself never fails; only the edges that touch files or
//! configuration do.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for fallible library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for option loading and I/O.
#[derive(Error, Debug)]
pub enum Error {
    /// Reading or writing a file failed.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The options file is not valid TOML.
    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml_edit::TomlError),

    /// An option key is unknown or its value has the wrong shape.
    #[error("Invalid option \"{key}\": {reason}")]
    InvalidOption { key: String, reason: String },
}

impl Error {
    /// Wrap an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidOption {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = Error::invalid("depth", "expected an integer");
        assert_eq!(err.to_string(), "Invalid option \"depth\": expected an integer");

        let err = Error::io(
            "notes.md",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        assert_eq!(err.to_string(), "notes.md: not found");
    }
}
