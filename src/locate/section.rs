//! Section cropping within a page range.

use super::outline::page_matches;
use super::TitlePattern;
use crate::layout::{main_text_bbox, ColumnSplitter, SectionAssembler};
use crate::model::{BBox, Document, Page, PageRange, Region};
use crate::options::ExtractOptions;

/// Finds the regions that belong to sections with a matching title.
#[derive(Debug, Clone, Default)]
pub struct SectionLocator {
    assembler: SectionAssembler,
    splitter: ColumnSplitter,
}

impl SectionLocator {
    /// Create a locator for the variant configured in `options`.
    pub fn new(options: &ExtractOptions) -> Self {
        Self {
            assembler: SectionAssembler::for_options(options),
            splitter: ColumnSplitter::for_options(options),
        }
    }

    /// Matching sections over every page of `range` that the document has.
    pub fn locate<'a>(
        &self,
        document: &'a Document,
        range: PageRange,
        pattern: &TitlePattern,
    ) -> Vec<Region<'a>> {
        document
            .pages_in(range)
            .flat_map(|page| self.locate_in_page(page, pattern))
            .collect()
    }

    /// Matching sections of one page.
    ///
    /// Each region spans `[section.top, section.next_top)` vertically and the
    /// main-text extent horizontally, narrowed to the column holding the
    /// section title when the page has two columns. Malformed pages yield
    /// nothing.
    pub fn locate_in_page<'a>(&self, page: &'a Page, pattern: &TitlePattern) -> Vec<Region<'a>> {
        let region = page.region();
        let Some(bbox) = main_text_bbox(&region) else {
            log::debug!("Skipping page {}: no main text", page.number);
            return Vec::new();
        };

        let matching: Vec<_> = self
            .assembler
            .sections(&region)
            .into_iter()
            .filter(|s| pattern.is_match(&s.text))
            .collect();
        if matching.is_empty() {
            return Vec::new();
        }

        let columns = self.splitter.split(&region);
        matching
            .into_iter()
            .filter_map(|section| {
                let (x0, x1) = match &columns {
                    Some(columns) => {
                        let column = columns.column_at(section.x0).bbox();
                        (column.x0, column.x1)
                    }
                    None => (bbox.x0, bbox.x1),
                };
                match region.crop(BBox::new(x0, section.top, x1, section.next_top)) {
                    Ok(crop) => Some(crop.with_title(section.text)),
                    Err(e) => {
                        log::debug!("Dropping section on page {}: {}", page.number, e);
                        None
                    }
                }
            })
            .collect()
    }
}

/// Contiguous block of pages from the first to the last page whose feature
/// text matches `pattern`.
pub fn pages_with_section<'a>(
    pages: impl IntoIterator<Item = &'a Page>,
    pattern: &TitlePattern,
) -> Option<PageRange> {
    let matched: Vec<u32> = pages
        .into_iter()
        .filter(|page| page_matches(page, pattern))
        .map(|page| page.number)
        .collect();
    let first = matched.iter().min()?;
    let last = matched.iter().max()?;
    Some(PageRange::new(*first, *last))
}
