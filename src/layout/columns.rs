//! Two-column detection.

use super::classify::{main_text_bbox, size_key, LanguageFilter, TextView};
use super::sections::{runs, title_runs, SectionAssembler};
use crate::model::{BBox, Region};
use crate::options::ExtractOptions;

/// Left and right halves of a two-column region.
#[derive(Debug, Clone)]
pub struct Columns<'a> {
    /// X position of the division
    pub division: f32,
    /// Column left of the division
    pub left: Region<'a>,
    /// Column right of the division, absent when the division reaches the
    /// page edge
    pub right: Option<Region<'a>>,
}

impl<'a> Columns<'a> {
    /// The column holding x-position `x`.
    pub fn column_at(&self, x: f32) -> &Region<'a> {
        match &self.right {
            Some(right) if x >= self.division => right,
            _ => &self.left,
        }
    }

    /// Both columns, left first.
    pub fn regions(&self) -> impl Iterator<Item = &Region<'a>> {
        std::iter::once(&self.left).chain(self.right.as_ref())
    }
}

/// Column split detection from title-level x-origins.
#[derive(Debug, Clone)]
pub struct ColumnSplitter {
    bilingual: bool,
    header_band: f32,
}

impl Default for ColumnSplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnSplitter {
    /// Title runs of the ASCII partition, division at their maximum x-origin.
    pub fn new() -> Self {
        Self {
            bilingual: false,
            header_band: 0.2,
        }
    }

    /// Bilingual sections below the header band, division pulled left by
    /// the smallest body size.
    pub fn bilingual(header_band: f32) -> Self {
        Self {
            bilingual: true,
            header_band,
        }
    }

    /// Pick the variant configured in `options`.
    pub fn for_options(options: &ExtractOptions) -> Self {
        if options.bilingual {
            Self::bilingual(options.header_band)
        } else {
            Self::new()
        }
    }

    /// X position of the column division, if the region has two columns.
    pub fn division(&self, region: &Region<'_>) -> Option<f32> {
        let bbox = main_text_bbox(region)?;
        let division = if self.bilingual {
            self.bilingual_division(region, bbox)
        } else {
            default_division(region, bbox)
        };
        if let Some(x) = division {
            log::info!("Page {} has another column divided at {:.1}", region.page_number(), x);
        }
        division
    }

    /// Split `region` at its column division.
    ///
    /// Returns `None` for single-column and malformed regions.
    pub fn split<'a>(&self, region: &Region<'a>) -> Option<Columns<'a>> {
        let bbox = main_text_bbox(region)?;
        let division = self.division(region)?;
        let page_width = region.page().width;

        let left = region
            .crop(BBox::new(bbox.x0, bbox.top, division, bbox.bottom))
            .ok()?
            .with_title("Left Column");

        let right = if division >= page_width {
            None
        } else {
            let x1 = if division >= bbox.x1 { page_width } else { bbox.x1 };
            region
                .crop(BBox::new(division, bbox.top, x1, bbox.bottom))
                .ok()
                .map(|r| r.with_title("Right Column"))
        };

        Some(Columns {
            division,
            left,
            right,
        })
    }

    fn bilingual_division(&self, region: &Region<'_>, bbox: BBox) -> Option<f32> {
        let sections = SectionAssembler::bilingual().clustered_sections(region);
        if sections.is_empty() {
            return None;
        }

        let band_limit = region.page().height * self.header_band;
        let header_bottom = sections
            .iter()
            .filter(|s| s.top < band_limit)
            .map(|s| s.top)
            .reduce(f32::max);
        let below: Vec<f32> = sections
            .iter()
            .filter(|s| header_bottom.map_or(true, |h| s.top > h))
            .map(|s| s.x0)
            .collect();
        let origins = if below.is_empty() {
            sections.iter().map(|s| s.x0).collect()
        } else {
            below
        };

        let (min_x0, max_x0) = spread(&origins)?;
        if size_key(min_x0) == size_key(max_x0) {
            return None;
        }

        let buffer = LanguageFilter::partitions()
            .into_iter()
            .filter_map(|f| TextView::of(region, f).map(|v| v.profile.main_size))
            .reduce(f32::min)
            .unwrap_or(0.0);
        let division = max_x0 - buffer;
        log::debug!(
            "Bilingual division candidate {:.1} on page {}",
            division,
            region.page_number()
        );
        (division > bbox.x0).then_some(division)
    }
}

fn default_division(region: &Region<'_>, bbox: BBox) -> Option<f32> {
    let view = TextView::of(region, LanguageFilter::Ascii)?;
    let titles = title_runs(runs(&view.feature), &view.profile);
    let origins: Vec<f32> = titles.iter().map(|r| r.x0).collect();

    let (min_x0, max_x0) = spread(&origins)?;
    (size_key(min_x0) != size_key(max_x0) && max_x0 > bbox.x0).then_some(max_x0)
}

fn spread(values: &[f32]) -> Option<(f32, f32)> {
    let min = values.iter().copied().reduce(f32::min)?;
    let max = values.iter().copied().reduce(f32::max)?;
    Some((min, max))
}
