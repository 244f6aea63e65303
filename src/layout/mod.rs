//! Layout inference from glyph statistics.
//!
//! This module provides:
//! - Main/feature text classification by font mode
//! - Line reconstruction and feature runs
//! - Section assembly by vertical gap clustering
//! - Two-column detection

mod classify;
mod columns;
mod sections;
mod text;

pub use classify::{feature_text, main_text, main_text_bbox, FontProfile, LanguageFilter, TextView};
pub use columns::{ColumnSplitter, Columns};
pub use sections::{runs, title_runs, Section, SectionAssembler, TextRun};
pub use text::{group_lines, join_glyphs, TextLine, LINE_TOLERANCE};

pub(crate) use text::region_text;
