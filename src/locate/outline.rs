//! Page range resolution: bookmarks first, full-text scan as fallback.

use super::TitlePattern;
use crate::layout::{runs, LanguageFilter, TextView};
use crate::model::{Document, Page, PageRange};
use crate::options::ExtractOptions;
use rayon::prelude::*;
use serde::Serialize;

/// Which path produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlineSource {
    /// Matching bookmark entries
    Bookmarks,
    /// Feature-text scan of every page
    TextScan,
    /// Neither path matched
    NotFound,
}

/// Maps a title pattern to page ranges.
#[derive(Debug, Clone, Default)]
pub struct OutlineResolver {
    parallel: bool,
}

impl OutlineResolver {
    /// Create a sequential resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver honouring `options.parallel`.
    pub fn for_options(options: &ExtractOptions) -> Self {
        Self {
            parallel: options.parallel,
        }
    }

    /// Scan pages in parallel during the fallback.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disjoint, ascending page ranges for `pattern`.
    pub fn resolve(&self, document: &Document, pattern: &TitlePattern) -> Vec<PageRange> {
        self.resolve_with_source(document, pattern).0
    }

    /// Like [`resolve`](Self::resolve), also reporting the path taken.
    ///
    /// The page scan only runs when no bookmark entry matches.
    pub fn resolve_with_source(
        &self,
        document: &Document,
        pattern: &TitlePattern,
    ) -> (Vec<PageRange>, OutlineSource) {
        let ranges = search_bookmarks(document, pattern);
        if !ranges.is_empty() {
            log::info!("Resolved {} from bookmarks: {:?}", pattern, ranges);
            return (ranges, OutlineSource::Bookmarks);
        }

        match self.scan_pages(document, pattern) {
            Some(range) => {
                log::info!("Resolved {} by page scan: {}", pattern, range);
                (vec![range], OutlineSource::TextScan)
            }
            None => {
                log::info!("No page matches {}", pattern);
                (Vec::new(), OutlineSource::NotFound)
            }
        }
    }

    /// Largest block of consecutive pages whose feature text matches.
    ///
    /// Smaller disjoint blocks are discarded; on a tie the first block wins.
    pub fn scan_pages(&self, document: &Document, pattern: &TitlePattern) -> Option<PageRange> {
        let matched: Vec<u32> = if self.parallel {
            document
                .pages
                .par_iter()
                .filter(|page| page_matches(page, pattern))
                .map(|page| page.number)
                .collect()
        } else {
            document
                .pages
                .iter()
                .filter(|page| page_matches(page, pattern))
                .map(|page| page.number)
                .collect()
        };

        consecutive_runs(matched)
            .into_iter()
            .fold(None, |best: Option<PageRange>, run| match best {
                Some(b) if b.len() >= run.len() => Some(b),
                _ => Some(run),
            })
    }
}

/// Page ranges of the outline entries whose title matches, collapsed into
/// runs of consecutive pages.
pub fn search_bookmarks(document: &Document, pattern: &TitlePattern) -> Vec<PageRange> {
    let pages = document
        .outline()
        .into_iter()
        .filter(|entry| pattern.is_match(&entry.title))
        .flat_map(|entry| entry.range.pages());
    consecutive_runs(pages)
}

/// Collapse page numbers into maximal runs of consecutive integers.
pub fn consecutive_runs(pages: impl IntoIterator<Item = u32>) -> Vec<PageRange> {
    let mut pages: Vec<u32> = pages.into_iter().collect();
    pages.sort_unstable();
    pages.dedup();

    let mut runs: Vec<PageRange> = Vec::new();
    for page in pages {
        match runs.last_mut() {
            Some(run) if run.to + 1 == page => run.to = page,
            _ => runs.push(PageRange::single(page)),
        }
    }
    runs
}

/// Whether any feature run of the page's ASCII text matches.
pub(crate) fn page_matches(page: &Page, pattern: &TitlePattern) -> bool {
    let region = page.region();
    let Some(view) = TextView::of(&region, LanguageFilter::Ascii) else {
        log::debug!("Skipping page {}: no glyph data", page.number);
        return false;
    };
    if view.main.is_empty() {
        log::debug!("Skipping page {}: no main text", page.number);
        return false;
    }
    runs(&view.feature).iter().any(|run| pattern.is_match(&run.text))
}
