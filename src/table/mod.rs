//! Disclosure tables: grid extraction, cell roles, validation and units.
//!
//! A region's glyphs are first rebuilt into a [`RawTable`](crate::model::RawTable)
//! by [`TextGrid`], then [`TableStructurer`] classifies the cells, picks
//! the core columns, removes subtotals and scales the amounts.

mod cells;
mod grid;
mod structure;
mod units;

pub use cells::{CellClassifier, CellRole, CellRoles, CurrencyUnit};
pub use grid::{GridOptions, TextGrid};
pub use structure::{
    remove_subtotals, AmountSeries, CoreIndices, TableExtraction, TableStructurer, TableSummary,
};
pub use units::unit_multiplier;

use crate::model::Region;
use crate::options::ExtractOptions;

/// Extract the grid of `region` and validate it as a disclosure table.
///
/// Holds no state between calls: the same region always yields the same
/// extraction.
pub fn extract_table(region: &Region<'_>, options: &ExtractOptions) -> TableExtraction {
    let raw = TextGrid::new(options.grid).extract(region);
    TableStructurer::new(options).extract(raw)
}
