//! Page-level types.

use super::{BBox, Glyph};
use crate::error::{Error, Result};
use crate::layout::{self, LanguageFilter};
use serde::{Deserialize, Serialize};

/// A single page in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page number (0-indexed)
    pub number: u32,

    /// Page width in points (1 point = 1/72 inch)
    pub width: f32,

    /// Page height in points
    pub height: f32,

    /// Glyphs in content-stream order
    glyphs: Vec<Glyph>,
}

impl Page {
    /// Create a new page with the given dimensions.
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            glyphs: Vec::new(),
        }
    }

    /// Create a new page with standard A4 size (210 x 297 mm).
    pub fn a4(number: u32) -> Self {
        Self::new(number, 595.0, 842.0) // 210mm * 2.834, 297mm * 2.834
    }

    /// Replace the page's glyphs.
    pub fn with_glyphs(mut self, glyphs: Vec<Glyph>) -> Self {
        self.glyphs = glyphs;
        self
    }

    /// Add a glyph to the page.
    pub fn add_glyph(&mut self, glyph: Glyph) {
        self.glyphs.push(glyph);
    }

    /// All glyphs, including those outside the normal box.
    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    /// Check if the page carries no glyphs.
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Full page box.
    pub fn bbox(&self) -> BBox {
        BBox::new(0.0, 0.0, self.width, self.height)
    }

    /// The page as a region covering its full extent.
    pub fn region(&self) -> Region<'_> {
        Region {
            page: self,
            bbox: self.bbox(),
            title: None,
        }
    }

    /// Crop the page to `bbox` (absolute page coordinates).
    pub fn crop(&self, bbox: BBox) -> Result<Region<'_>> {
        Region::new(self, bbox)
    }

    /// Check if the page is in landscape orientation.
    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }
}

/// A rectangular view of a page.
///
/// A region owns no glyphs: it filters its page's glyphs by bounding box
/// every time they are requested, so derived views always reflect the
/// current box.
#[derive(Debug, Clone)]
pub struct Region<'a> {
    page: &'a Page,
    bbox: BBox,
    title: Option<String>,
}

impl<'a> Region<'a> {
    /// Create a region of `page` clipped to the page box.
    ///
    /// Fails when `bbox` is empty, inverted, or does not overlap the page.
    pub fn new(page: &'a Page, bbox: BBox) -> Result<Self> {
        let clipped = if bbox.is_empty() {
            None
        } else {
            bbox.intersect(&page.bbox())
        };
        let bbox = clipped.ok_or_else(|| Error::InvalidRegion {
            page: page.number,
            bbox: bbox.to_string(),
        })?;
        Ok(Self {
            page,
            bbox,
            title: None,
        })
    }

    /// Attach a title label.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// The page this region views.
    pub fn page(&self) -> &'a Page {
        self.page
    }

    /// 0-based page number.
    pub fn page_number(&self) -> u32 {
        self.page.number
    }

    /// Region box in page coordinates.
    pub fn bbox(&self) -> BBox {
        self.bbox
    }

    /// Title label, if any.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Glyphs whose centre lies inside the region (normal-box glyphs only).
    pub fn glyphs(&self) -> impl Iterator<Item = &'a Glyph> + '_ {
        let bbox = self.bbox;
        self.page
            .glyphs
            .iter()
            .filter(move |g| g.in_normal_box() && bbox.contains_point(g.center_x(), g.center_y()))
    }

    /// Crop further; the result never extends past this region.
    pub fn crop(&self, bbox: BBox) -> Result<Region<'a>> {
        let clipped = self.bbox.intersect(&bbox).ok_or_else(|| Error::InvalidRegion {
            page: self.page.number,
            bbox: bbox.to_string(),
        })?;
        Ok(Region {
            page: self.page,
            bbox: clipped,
            title: self.title.clone(),
        })
    }

    /// Reconstructed text, one line per visual line.
    pub fn text(&self) -> String {
        layout::region_text(self, LanguageFilter::All)
    }

    /// Reconstructed text of the ASCII glyphs only.
    pub fn ascii_text(&self) -> String {
        layout::region_text(self, LanguageFilter::Ascii)
    }
}

impl<'a> From<&'a Page> for Region<'a> {
    fn from(page: &'a Page) -> Self {
        page.region()
    }
}
