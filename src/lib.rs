//! # disclose
//!
//! Layout inference and disclosure extraction for financial-statement PDFs.
//!
//! A document is loaded as pages of positioned glyphs. On top of that the
//! library infers the typographic layout (main text against headings,
//! sections, one or two columns), resolves named reports through the
//! bookmark tree or a full-text scan, locates sections by title, rebuilds
//! disclosure tables from text alignment and validates extracted names
//! against a registry.
//!
//! ## Quick Start
//!
//! ```no_run
//! use disclose::{parse_file, AnnualReport, ExtractOptions};
//!
//! fn main() -> disclose::Result<()> {
//!     let doc = parse_file("annual-report.pdf")?;
//!
//!     let summary = AnnualReport::analyse(
//!         &doc,
//!         vec!["KPMG".to_string(), "Deloitte".to_string()],
//!         &["goodwill", "revenue"],
//!         &ExtractOptions::default(),
//!     )?;
//!     println!("{:?}", summary.auditors);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Building blocks
//!
//! - [`resolve_outline`]: page ranges of a report title
//! - [`locate_sections`]: regions under matching section headings
//! - [`extract_table`]: grid reconstruction and table validation
//! - [`validate_entity`]: fuzzy registry matching

pub mod entity;
pub mod error;
pub mod layout;
pub mod locate;
pub mod model;
pub mod options;
pub mod parser;
pub mod report;
pub mod table;

// Re-export commonly used types
pub use entity::{validate_entity, EntityValidator, Fallback};
pub use error::{Error, Result};
pub use layout::{ColumnSplitter, Columns, FontProfile, LanguageFilter, Section, SectionAssembler, TextView};
pub use locate::{OutlineResolver, OutlineSource, SectionLocator, TitlePattern};
pub use model::{BBox, Bookmark, Document, Glyph, OutlineEntry, Page, PageRange, RawTable, Region};
pub use options::ExtractOptions;
pub use parser::{ErrorMode, PageSelection, ParseOptions, PdfParser};
pub use report::{
    AnnualReport, AnnualReportSummary, AuditFeeTable, AuditorReport, CorporateGovernanceReport,
    KeyAuditMatter, KeywordSet,
};
pub use table::{extract_table, GridOptions, TableExtraction, TableSummary};

use std::io::Read;
use std::path::Path;

/// Page ranges whose outline title matches `pattern`.
///
/// Bookmarks are searched first; when none matches, the pages are scanned
/// and the largest block of consecutive matching pages is returned.
///
/// # Example
///
/// ```no_run
/// use disclose::{parse_file, resolve_outline, ExtractOptions, TitlePattern};
///
/// let doc = parse_file("annual-report.pdf").unwrap();
/// let pattern = TitlePattern::new("corporate governance").unwrap();
/// for range in resolve_outline(&doc, &pattern, &ExtractOptions::default()) {
///     println!("pages {}", range);
/// }
/// ```
pub fn resolve_outline(document: &Document, pattern: &TitlePattern, options: &ExtractOptions) -> Vec<PageRange> {
    OutlineResolver::for_options(options).resolve(document, pattern)
}

/// Regions under the section headings of `range` that match `pattern`.
pub fn locate_sections<'a>(
    document: &'a Document,
    range: PageRange,
    pattern: &TitlePattern,
    options: &ExtractOptions,
) -> Vec<Region<'a>> {
    SectionLocator::new(options).locate(document, range, pattern)
}

/// Load a PDF file.
///
/// # Example
///
/// ```no_run
/// use disclose::parse_file;
///
/// let doc = parse_file("annual-report.pdf").unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let parser = PdfParser::open(path)?;
    parser.parse()
}

/// Load a PDF file with custom options.
///
/// # Example
///
/// ```no_run
/// use disclose::{parse_file_with_options, ParseOptions};
///
/// let options = ParseOptions::new().lenient();
/// let doc = parse_file_with_options("annual-report.pdf", options).unwrap();
/// ```
pub fn parse_file_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Document> {
    let parser = PdfParser::open_with_options(path, options)?;
    parser.parse()
}

/// Load a PDF from bytes.
pub fn parse_bytes(data: &[u8]) -> Result<Document> {
    let parser = PdfParser::from_bytes(data)?;
    parser.parse()
}

/// Load a PDF from bytes with custom options.
pub fn parse_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Document> {
    let parser = PdfParser::from_bytes_with_options(data, options)?;
    parser.parse()
}

/// Load a PDF from a reader.
pub fn parse_reader<R: Read>(reader: R) -> Result<Document> {
    let parser = PdfParser::from_reader(reader)?;
    parser.parse()
}
