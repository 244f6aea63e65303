//! Main text / feature text classification.
//!
//! Body text is whatever uses the page's most frequent font at its most
//! frequent size. Everything else that is upright (headings, bold lines,
//! table captions) is feature text and drives section and column detection.

use super::sections::runs;
use crate::model::{BBox, Glyph, Region};
use std::collections::HashMap;
use std::hash::Hash;

/// Glyph subset selected before any statistics are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LanguageFilter {
    /// Every glyph
    #[default]
    All,
    /// Glyphs whose text is pure ASCII
    Ascii,
    /// Glyphs with at least one non-ASCII character
    NonAscii,
}

impl LanguageFilter {
    /// Whether the glyph belongs to this partition.
    pub fn accepts(&self, glyph: &Glyph) -> bool {
        match self {
            LanguageFilter::All => true,
            LanguageFilter::Ascii => glyph.is_ascii(),
            LanguageFilter::NonAscii => !glyph.is_ascii(),
        }
    }

    /// The two language partitions of a bilingual page.
    pub fn partitions() -> [LanguageFilter; 2] {
        [LanguageFilter::Ascii, LanguageFilter::NonAscii]
    }
}

/// Sizes are compared on a 0.01pt grid.
pub(crate) fn size_key(size: f32) -> i32 {
    (size * 100.0).round() as i32
}

/// Most frequent value; ties go to the value seen first.
fn mode<K: Eq + Hash, I: IntoIterator<Item = K>>(values: I) -> Option<K> {
    let mut counts: HashMap<K, (usize, usize)> = HashMap::new();
    for (order, value) in values.into_iter().enumerate() {
        counts.entry(value).or_insert((0, order)).0 += 1;
    }
    counts
        .into_iter()
        .max_by(|(_, (ca, oa)), (_, (cb, ob))| ca.cmp(cb).then(ob.cmp(oa)))
        .map(|(value, _)| value)
}

/// Dominant font of a glyph set.
#[derive(Debug, Clone, PartialEq)]
pub struct FontProfile {
    /// Most frequent font name
    pub main_font: String,
    /// Most frequent size among glyphs in `main_font`
    pub main_size: f32,
}

impl FontProfile {
    /// Compute the profile, `None` for an empty glyph set.
    pub fn of<'a>(glyphs: impl IntoIterator<Item = &'a Glyph>) -> Option<Self> {
        let glyphs: Vec<&Glyph> = glyphs.into_iter().collect();
        let main_font = mode(glyphs.iter().map(|g| g.fontname.as_str()))?;
        let key = mode(
            glyphs
                .iter()
                .filter(|g| g.fontname == main_font)
                .map(|g| size_key(g.size)),
        )?;

        Some(Self {
            main_font: main_font.to_string(),
            main_size: key as f32 / 100.0,
        })
    }

    /// Whether the glyph is set in the main font at the main size.
    pub fn is_main(&self, glyph: &Glyph) -> bool {
        glyph.fontname == self.main_font && size_key(glyph.size) == size_key(self.main_size)
    }
}

/// A classified view of one language partition of a region.
#[derive(Debug, Clone)]
pub struct TextView<'a> {
    /// Statistics of the partition
    pub profile: FontProfile,
    /// Upright glyphs in the main font and size
    pub main: Vec<&'a Glyph>,
    /// Every other upright glyph
    pub feature: Vec<&'a Glyph>,
}

impl<'a> TextView<'a> {
    /// Classify the glyphs of `region` selected by `filter`.
    ///
    /// Returns `None` when the partition is empty.
    pub fn of(region: &Region<'a>, filter: LanguageFilter) -> Option<Self> {
        let glyphs: Vec<&'a Glyph> = region.glyphs().filter(|g| filter.accepts(g)).collect();
        let profile = FontProfile::of(glyphs.iter().copied())?;

        let (main, feature) = glyphs
            .into_iter()
            .filter(|g| g.upright)
            .partition(|g| profile.is_main(g));

        Some(Self {
            profile,
            main,
            feature,
        })
    }

    /// Bounding box of the main text, extended up to the topmost and right
    /// to the rightmost feature run.
    pub fn bbox(&self) -> Option<BBox> {
        let first = self.main.first()?;
        let mut bbox = first.bbox();
        for glyph in &self.main[1..] {
            bbox = bbox.union(&glyph.bbox());
        }

        let feature_runs = runs(&self.feature);
        if let Some(top) = feature_runs.iter().map(|r| r.top).reduce(f32::min) {
            bbox.top = bbox.top.min(top);
        }
        if let Some(x1) = feature_runs.iter().map(|r| r.x1).reduce(f32::max) {
            bbox.x1 = bbox.x1.max(x1);
        }
        Some(bbox)
    }
}

/// Main-text glyphs of a region's partition.
pub fn main_text<'a>(region: &Region<'a>, filter: LanguageFilter) -> Vec<&'a Glyph> {
    TextView::of(region, filter).map(|v| v.main).unwrap_or_default()
}

/// Feature-text glyphs of a region's partition.
pub fn feature_text<'a>(region: &Region<'a>, filter: LanguageFilter) -> Vec<&'a Glyph> {
    TextView::of(region, filter).map(|v| v.feature).unwrap_or_default()
}

/// Main-text bounding box of a region, union of both language partitions.
///
/// `None` marks a malformed page: neither partition has main text.
pub fn main_text_bbox(region: &Region<'_>) -> Option<BBox> {
    LanguageFilter::partitions()
        .into_iter()
        .filter_map(|filter| TextView::of(region, filter)?.bbox())
        .reduce(|a, b| a.union(&b))
}
