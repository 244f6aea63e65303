//! Positioned glyphs and bounding boxes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One positioned character.
///
/// Coordinates are in points with the origin at the top-left corner of the
/// page: `top < bottom` and `x0 < x1` for any well-formed glyph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Glyph {
    /// The character (occasionally a ligature or multi-char cluster)
    pub text: String,
    /// Left edge
    pub x0: f32,
    /// Right edge
    pub x1: f32,
    /// Top edge, measured from the top of the page
    pub top: f32,
    /// Bottom edge, measured from the top of the page
    pub bottom: f32,
    /// Font name (e.g., "Helvetica-Bold")
    pub fontname: String,
    /// Font size in points
    pub size: f32,
    /// Whether the glyph is drawn upright (not rotated)
    pub upright: bool,
}

impl Glyph {
    /// Create an upright glyph.
    pub fn new(
        text: impl Into<String>,
        x0: f32,
        top: f32,
        x1: f32,
        bottom: f32,
        fontname: impl Into<String>,
        size: f32,
    ) -> Self {
        Self {
            text: text.into(),
            x0,
            x1,
            top,
            bottom,
            fontname: fontname.into(),
            size,
            upright: true,
        }
    }

    /// Mark the glyph as rotated.
    pub fn rotated(mut self) -> Self {
        self.upright = false;
        self
    }

    /// Glyph bounding box.
    pub fn bbox(&self) -> BBox {
        BBox::new(self.x0, self.top, self.x1, self.bottom)
    }

    /// Horizontal centre.
    pub fn center_x(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }

    /// Vertical centre.
    pub fn center_y(&self) -> f32 {
        (self.top + self.bottom) / 2.0
    }

    /// Whether every character of the glyph is ASCII.
    pub fn is_ascii(&self) -> bool {
        self.text.is_ascii()
    }

    /// Whether all coordinates are strictly positive.
    ///
    /// Glyphs failing this check sit outside the page's normal box (bleed,
    /// off-page artefacts) and are ignored by every layout view.
    pub fn in_normal_box(&self) -> bool {
        self.x0 > 0.0 && self.top > 0.0 && self.x1 > 0.0 && self.bottom > 0.0
    }
}

/// An axis-aligned rectangle `(x0, top, x1, bottom)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub top: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub bottom: f32,
}

impl BBox {
    /// Create a box from its four edges.
    pub fn new(x0: f32, top: f32, x1: f32, bottom: f32) -> Self {
        Self {
            x0,
            top,
            x1,
            bottom,
        }
    }

    /// Box width.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Box height.
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Whether the box encloses no area (or is inverted, or not finite).
    pub fn is_empty(&self) -> bool {
        let finite = self.x0.is_finite()
            && self.x1.is_finite()
            && self.top.is_finite()
            && self.bottom.is_finite();
        !finite || self.x0 >= self.x1 || self.top >= self.bottom
    }

    /// Half-open containment: `[x0, x1) x [top, bottom)`.
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.top && y < self.bottom
    }

    /// Overlap of two boxes, `None` when they do not share any area.
    pub fn intersect(&self, other: &BBox) -> Option<BBox> {
        let bbox = BBox::new(
            self.x0.max(other.x0),
            self.top.max(other.top),
            self.x1.min(other.x1),
            self.bottom.min(other.bottom),
        );
        (!bbox.is_empty()).then_some(bbox)
    }

    /// Smallest box enclosing both.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox::new(
            self.x0.min(other.x0),
            self.top.min(other.top),
            self.x1.max(other.x1),
            self.bottom.max(other.bottom),
        )
    }
}

impl fmt::Display for BBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.1}, {:.1}, {:.1}, {:.1})",
            self.x0, self.top, self.x1, self.bottom
        )
    }
}
