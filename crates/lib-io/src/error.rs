//! Error types for reading and writing data files.

use lib_types::TypesError;
use thiserror::Error;

/// Errors that can occur while reading a data file.
#[derive(Debug, Error)]
pub enum ParseError {
    /// I/O error reading the file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A line could not be parsed.
    #[error("Syntax error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    /// A field parsed but its value is unusable.
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    /// The file as a whole does not have the expected shape.
    #[error("Invalid {format} format: {message}")]
    InvalidFormat { format: String, message: String },

    /// Parsed columns could not be paired into a container.
    #[error(transparent)]
    Types(#[from] TypesError),

    /// Nom parsing error (internal).
    #[error("Parse error: {0}")]
    Nom(String),
}

impl ParseError {
    pub fn syntax(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            column,
            message: message.into(),
        }
    }

    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invalid_format(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            format: format.into(),
            message: message.into(),
        }
    }
}

impl<'a> From<nom::Err<nom::error::Error<&'a str>>> for ParseError {
    fn from(err: nom::Err<nom::error::Error<&'a str>>) -> Self {
        match err {
            nom::Err::Incomplete(_) => ParseError::Nom("Incomplete input".to_string()),
            nom::Err::Error(e) | nom::Err::Failure(e) => {
                let preview: String = e.input.chars().take(20).collect();
                ParseError::Nom(format!("{:?} at '{}'", e.code, preview))
            }
        }
    }
}
