//! Extraction options and configuration.

use chrono::Datelike;

use crate::table::GridOptions;

/// Options steering layout inference and disclosure extraction.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Latest fiscal year a table may report. Year cells are accepted in
    /// `reference_year - 2 ..= reference_year`.
    pub reference_year: i32,

    /// Minimum token-set similarity (0-100) for an entity match
    pub min_similarity: u8,

    /// Relaxed similarity applied to short names
    pub short_name_similarity: u8,

    /// Names up to this many characters use `short_name_similarity`
    pub short_name_len: usize,

    /// Fraction of the page height treated as running-header band
    pub header_band: f32,

    /// Run section and column detection per language partition
    pub bilingual: bool,

    /// Scan pages in parallel during the full-text outline fallback
    pub parallel: bool,

    /// Text grid reconstruction settings
    pub grid: GridOptions,
}

impl ExtractOptions {
    /// Create new extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reference year for year-cell classification.
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = year;
        self
    }

    /// Set the entity match threshold.
    pub fn with_min_similarity(mut self, similarity: u8) -> Self {
        self.min_similarity = similarity.min(100);
        self
    }

    /// Set the relaxed threshold and the length below which it applies.
    pub fn with_short_names(mut self, max_len: usize, similarity: u8) -> Self {
        self.short_name_len = max_len;
        self.short_name_similarity = similarity.min(100);
        self
    }

    /// Set the running-header band as a fraction of the page height.
    pub fn with_header_band(mut self, fraction: f32) -> Self {
        self.header_band = fraction.clamp(0.0, 1.0);
        self
    }

    /// Enable or disable bilingual section detection.
    pub fn with_bilingual(mut self, bilingual: bool) -> Self {
        self.bilingual = bilingual;
        self
    }

    /// Enable bilingual section detection.
    pub fn bilingual(self) -> Self {
        self.with_bilingual(true)
    }

    /// Enable or disable the parallel page scan.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set text grid options.
    pub fn with_grid(mut self, grid: GridOptions) -> Self {
        self.grid = grid;
        self
    }

    /// Years accepted as year cells, oldest first.
    pub fn year_window(&self) -> std::ops::RangeInclusive<i32> {
        (self.reference_year - 2)..=self.reference_year
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            reference_year: chrono::Local::now().year(),
            min_similarity: 90,
            short_name_similarity: 80,
            short_name_len: 4,
            header_band: 0.2,
            bilingual: false,
            parallel: false,
            grid: GridOptions::default(),
        }
    }
}
