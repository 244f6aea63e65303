//! PDF document loader using lopdf.

use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{Document, Page};

use super::backend::{LopdfBackend, PageId, PdfBackend};
use super::interpreter::GlyphInterpreter;
use super::options::{ErrorMode, ParseOptions};

/// Letter size, used when a page has no usable media box.
const DEFAULT_PAGE_SIZE: (f32, f32) = (612.0, 792.0);

/// PDF document loader.
pub struct PdfParser {
    backend: LopdfBackend,
    options: ParseOptions,
}

impl PdfParser {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a PDF file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let backend = LopdfBackend::load_file(path)?;
        Ok(Self::with_backend(backend, options))
    }

    /// Load a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    /// Load a PDF from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Self> {
        let backend = LopdfBackend::load_bytes(data)?;
        Ok(Self::with_backend(backend, options))
    }

    /// Load a PDF from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, ParseOptions::default())
    }

    /// Load a PDF from a reader with custom options.
    pub fn from_reader_with_options<R: Read>(mut reader: R, options: ParseOptions) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes_with_options(&data, options)
    }

    fn with_backend(backend: LopdfBackend, options: ParseOptions) -> Self {
        // lopdf 0.34 only opens documents encrypted with an empty user password
        if options.password.is_some() && backend.is_encrypted() {
            log::warn!("Password was provided but lopdf 0.34 doesn't support decryption");
        }
        Self { backend, options }
    }

    /// Extract every page's glyphs and the bookmark list.
    ///
    /// Pages are numbered from 0. In lenient mode a page that cannot be
    /// read is kept without glyphs; in strict mode the first such page
    /// aborts the load, as does a page selection reaching past the last
    /// page.
    pub fn parse(&self) -> Result<Document> {
        let page_count = self.page_count();
        if let Some(last) = self.options.pages.last_page() {
            if last > page_count {
                if self.options.error_mode == ErrorMode::Strict {
                    return Err(Error::PageOutOfRange(last, page_count));
                }
                log::warn!("Page {} is out of range (document has {} pages)", last, page_count);
            }
        }

        let mut document = Document::new();

        for (page_num, page_id) in self.backend.pages() {
            let number = page_num.saturating_sub(1);
            let (width, height) = self.backend.page_size(page_id).unwrap_or(DEFAULT_PAGE_SIZE);
            let mut page = Page::new(number, width, height);

            if self.options.pages.includes(page_num) {
                match self.extract_glyphs(page_id, height) {
                    Ok(glyphs) => page = page.with_glyphs(glyphs),
                    Err(e) => {
                        if self.options.error_mode == ErrorMode::Strict {
                            return Err(e);
                        }
                        log::warn!("Failed to extract glyphs from page {}: {}", page_num, e);
                    }
                }
            }

            log::debug!("Page {}: {} glyphs", number, page.glyphs().len());
            document.add_page(page);
        }

        let bookmarks = self.backend.bookmarks();
        if !bookmarks.is_empty() {
            log::debug!("Found {} bookmarks", bookmarks.len());
            document = document.with_bookmarks(bookmarks);
        }

        Ok(document)
    }

    fn extract_glyphs(&self, page_id: PageId, height: f32) -> Result<Vec<crate::model::Glyph>> {
        let content = self.backend.page_content(page_id)?;
        let ops = self.backend.decode_content(&content)?;
        Ok(GlyphInterpreter::new(&self.backend, page_id, height).run(&ops))
    }

    /// Get the number of pages.
    pub fn page_count(&self) -> u32 {
        self.backend.pages().len() as u32
    }

    /// Check if the document is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.backend.is_encrypted()
    }

    /// Get PDF version.
    pub fn version(&self) -> String {
        self.backend.version()
    }
}
