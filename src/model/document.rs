//! Document-level types.

use super::Page;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An in-memory document: pages of positioned glyphs plus an optional,
/// flattened bookmark list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Pages in the document, indexed by their 0-based number
    pub pages: Vec<Page>,

    /// Flattened bookmark tree (depth-first, document order)
    pub bookmarks: Option<Vec<Bookmark>>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document from its pages.
    pub fn with_pages(pages: Vec<Page>) -> Self {
        Self {
            pages,
            bookmarks: None,
        }
    }

    /// Attach a bookmark list.
    pub fn with_bookmarks(mut self, bookmarks: Vec<Bookmark>) -> Self {
        self.bookmarks = Some(bookmarks);
        self
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Get a page by number (0-indexed).
    pub fn get_page(&self, page_num: u32) -> Option<&Page> {
        self.pages.get(page_num as usize)
    }

    /// Add a page to the document.
    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Pages of an inclusive range that exist in this document.
    pub fn pages_in(&self, range: PageRange) -> impl Iterator<Item = &Page> {
        range.pages().filter_map(move |p| self.get_page(p))
    }

    /// Outline entries inferred from the bookmark list.
    ///
    /// Bookmarks without a resolvable page are dropped first. Each remaining
    /// entry spans from its page to the next entry's page minus one; the last
    /// entry ends at the largest start page. Returns an empty list when the
    /// document has no bookmarks.
    pub fn outline(&self) -> Vec<OutlineEntry> {
        let Some(bookmarks) = &self.bookmarks else {
            return Vec::new();
        };

        let resolved: Vec<(&str, u32)> = bookmarks
            .iter()
            .filter_map(|b| b.page.map(|p| (b.title.as_str(), p)))
            .collect();
        let last_start = resolved.iter().map(|(_, p)| *p).max().unwrap_or(0);

        resolved
            .iter()
            .enumerate()
            .map(|(i, (title, start))| {
                let end = match resolved.get(i + 1) {
                    // the next entry may sit on the same page (or before it)
                    Some((_, next)) => next.saturating_sub(1),
                    None => last_start,
                };
                OutlineEntry {
                    title: normalize_title(title),
                    range: PageRange::new(*start, end),
                }
            })
            .collect()
    }
}

/// One flattened bookmark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    /// Bookmark title as stored in the PDF
    pub title: String,

    /// Target page (0-indexed), `None` when the destination is unresolvable
    pub page: Option<u32>,
}

impl Bookmark {
    /// Create a new bookmark.
    pub fn new(title: impl Into<String>, page: Option<u32>) -> Self {
        Self {
            title: title.into(),
            page,
        }
    }
}

/// An inclusive, never-empty page interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PageRange {
    /// First page (0-indexed)
    pub from: u32,
    /// Last page (inclusive)
    pub to: u32,
}

impl PageRange {
    /// Create a range, ordering the two ends.
    pub fn new(a: u32, b: u32) -> Self {
        Self {
            from: a.min(b),
            to: a.max(b),
        }
    }

    /// Single-page range.
    pub fn single(page: u32) -> Self {
        Self::new(page, page)
    }

    /// Number of pages covered.
    pub fn len(&self) -> u32 {
        self.to - self.from + 1
    }

    /// Always false: a range holds at least one page.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether `page` lies inside the range.
    pub fn contains(&self, page: u32) -> bool {
        (self.from..=self.to).contains(&page)
    }

    /// Iterate the page numbers.
    pub fn pages(&self) -> std::ops::RangeInclusive<u32> {
        self.from..=self.to
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

/// A titled page range inferred from the bookmarks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    /// Normalized title
    pub title: String,

    /// Pages covered by the entry
    pub range: PageRange,
}

/// Remove line breaks and byte-order marks from a bookmark title.
fn normalize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| !matches!(c, '\r' | '\n' | '\u{feff}'))
        .collect()
}
