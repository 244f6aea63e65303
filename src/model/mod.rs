//! Document model types for layout analysis.
//!
//! The model is deliberately small: a document is a list of pages, a page is
//! a list of positioned glyphs, and every derived view (main text, sections,
//! columns) is computed on demand from a borrowed [`Region`].

mod document;
mod glyph;
mod page;
mod table;

pub use document::{Bookmark, Document, OutlineEntry, PageRange};
pub use glyph::{BBox, Glyph};
pub use page::{Page, Region};
pub use table::RawTable;
