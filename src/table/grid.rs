//! Text grid reconstruction (stream-style table extraction).
//!
//! Tables in financial statements rarely carry ruling lines, so cells are
//! recovered from text alignment alone: glyphs become lines, lines split
//! into chunks at wide gaps, and chunk extents that overlap across lines
//! form the column bands.

use crate::layout::{group_lines, join_glyphs};
use crate::model::{Glyph, RawTable, Region};

/// Grid reconstruction settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridOptions {
    /// Y tolerance for grouping glyphs into rows (fraction of font size)
    pub row_tolerance: f32,
    /// Minimum horizontal gap between cells (fraction of font size)
    pub chunk_gap: f32,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            row_tolerance: 0.4,
            chunk_gap: 1.0,
        }
    }
}

impl GridOptions {
    /// Set the row tolerance.
    pub fn with_row_tolerance(mut self, tolerance: f32) -> Self {
        self.row_tolerance = tolerance;
        self
    }

    /// Set the chunk gap.
    pub fn with_chunk_gap(mut self, gap: f32) -> Self {
        self.chunk_gap = gap;
        self
    }
}

/// A horizontal piece of a line, candidate cell content.
#[derive(Debug, Clone)]
struct Chunk<'a> {
    glyphs: Vec<&'a Glyph>,
    x0: f32,
    x1: f32,
}

impl<'a> Chunk<'a> {
    fn new(glyph: &'a Glyph) -> Self {
        Self {
            glyphs: vec![glyph],
            x0: glyph.x0,
            x1: glyph.x1,
        }
    }

    fn push(&mut self, glyph: &'a Glyph) {
        self.x1 = self.x1.max(glyph.x1);
        self.glyphs.push(glyph);
    }

    fn text(&self) -> String {
        join_glyphs(&self.glyphs).trim().to_string()
    }
}

/// Column band: merged x-extent of aligned chunks.
#[derive(Debug, Clone, Copy)]
struct Band {
    x0: f32,
    x1: f32,
}

impl Band {
    fn contains(&self, x: f32) -> bool {
        x >= self.x0 && x <= self.x1
    }

    fn distance(&self, x: f32) -> f32 {
        if self.contains(x) {
            0.0
        } else {
            (self.x0 - x).abs().min((x - self.x1).abs())
        }
    }
}

/// Builds a [`RawTable`] from the glyphs of a region.
#[derive(Debug, Clone, Default)]
pub struct TextGrid {
    options: GridOptions,
}

impl TextGrid {
    /// Create an extractor with the given options.
    pub fn new(options: GridOptions) -> Self {
        Self { options }
    }

    /// Extract the grid of `region`.
    pub fn extract(&self, region: &Region<'_>) -> RawTable {
        let glyphs = region
            .glyphs()
            .filter(|g| g.upright && !g.text.trim().is_empty());
        let lines: Vec<Vec<Chunk>> = group_lines(glyphs, self.options.row_tolerance)
            .iter()
            .map(|line| self.split_line(&line.glyphs))
            .filter(|chunks| !chunks.is_empty())
            .collect();

        let bands = column_bands(&lines);
        log::debug!(
            "TextGrid: {} rows, {} column bands on page {}",
            lines.len(),
            bands.len(),
            region.page_number()
        );

        let rows = lines
            .iter()
            .map(|chunks| {
                let mut cells = vec![String::new(); bands.len()];
                for chunk in chunks {
                    let Some(col) = nearest_band(&bands, chunk.x0) else {
                        continue;
                    };
                    let text = chunk.text();
                    if !cells[col].is_empty() {
                        cells[col].push(' ');
                    }
                    cells[col].push_str(&text);
                }
                cells
            })
            .collect();

        RawTable::new(rows)
    }

    /// Split a line (sorted left to right) at gaps wider than `chunk_gap`.
    fn split_line<'a>(&self, glyphs: &[&'a Glyph]) -> Vec<Chunk<'a>> {
        let mut chunks: Vec<Chunk<'a>> = Vec::new();
        for &glyph in glyphs {
            match chunks.last_mut() {
                Some(chunk) if glyph.x0 - chunk.x1 <= glyph.size.max(1.0) * self.options.chunk_gap => {
                    chunk.push(glyph)
                }
                _ => chunks.push(Chunk::new(glyph)),
            }
        }
        chunks
    }
}

/// Merge the x-extents of chunks on lines with two or more chunks; when no
/// line has several chunks, every line contributes.
fn column_bands(lines: &[Vec<Chunk>]) -> Vec<Band> {
    let multi: Vec<&Vec<Chunk>> = lines.iter().filter(|l| l.len() >= 2).collect();
    let source: Vec<&Vec<Chunk>> = if multi.is_empty() {
        lines.iter().collect()
    } else {
        multi
    };

    let mut extents: Vec<Band> = source
        .iter()
        .flat_map(|line| line.iter().map(|c| Band { x0: c.x0, x1: c.x1 }))
        .collect();
    extents.sort_by(|a, b| a.x0.total_cmp(&b.x0));

    let mut bands: Vec<Band> = Vec::new();
    for extent in extents {
        match bands.last_mut() {
            Some(band) if extent.x0 <= band.x1 => band.x1 = band.x1.max(extent.x1),
            _ => bands.push(extent),
        }
    }
    bands
}

fn nearest_band(bands: &[Band], x: f32) -> Option<usize> {
    bands
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.distance(x).total_cmp(&b.distance(x)))
        .map(|(i, _)| i)
}
