//! Error types for the disclose library.
//!
//! Data-quality outcomes (no matching outline, no valid table, a page
//! without usable glyphs) are not errors: they surface as empty
//! collections or `None`. The variants below are integration faults.

use std::io;
use thiserror::Error;

/// Result type alias for disclose operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading or analysing a document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted and requires a password.
    #[error("Document is encrypted")]
    Encrypted,

    /// Error extracting glyphs from a content stream.
    #[error("Glyph extraction error: {0}")]
    GlyphExtract(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// A region box that is empty, inverted or outside its page.
    #[error("Invalid region {bbox} on page {page}")]
    InvalidRegion {
        /// 0-based page number
        page: u32,
        /// Offending box, formatted
        bbox: String,
    },

    /// A title or content pattern failed to compile.
    #[error("Invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        /// The pattern as written by the caller
        pattern: String,
        /// Underlying regex error
        #[source]
        source: regex::Error,
    },

    /// A summary could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}
