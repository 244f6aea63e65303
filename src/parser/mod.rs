//! PDF loading: pages of positioned glyphs plus the bookmark list.

mod backend;
mod interpreter;
mod options;
mod pdf_parser;

pub use backend::{
    check_header, decode_text_simple, BackendFontInfo, ContentOp, LopdfBackend, PageId, PdfBackend,
    PdfValue,
};
pub use interpreter::GlyphInterpreter;
pub use options::{ErrorMode, PageSelection, ParseOptions};
pub use pdf_parser::PdfParser;
