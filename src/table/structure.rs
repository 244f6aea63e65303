//! Table validation and amount normalization.

use super::cells::{CellClassifier, CellRole, CellRoles};
use super::units::unit_multiplier;
use crate::model::RawTable;
use crate::options::ExtractOptions;
use serde::Serialize;
use std::collections::BTreeSet;

/// Amounts of one core column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AmountSeries {
    /// Column index in the filtered grid
    pub column: usize,
    /// Currency of the column's first currency cell
    pub currency: Option<String>,
    /// Unit marker of the column's first currency cell
    pub unit: Option<String>,
    /// Multiplier applied to `raw`
    pub multiplier: i64,
    /// Amounts as printed, subtotals removed
    pub raw: Vec<i64>,
    /// Filtered-grid row of each entry of `raw`
    pub rows: Vec<usize>,
    /// Amounts scaled by `multiplier`
    pub scaled: Vec<i64>,
}

/// A validated disclosure table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    /// Year cells of the core columns
    pub years: BTreeSet<String>,
    /// Currency codes of the core columns
    pub currencies: BTreeSet<String>,
    /// Unit markers of the core columns
    pub currency_units: BTreeSet<String>,
    /// Distinct multipliers (`{1}` when no unit is declared)
    pub unit_multipliers: BTreeSet<i64>,
    /// Per-column series, ascending by column
    pub columns: Vec<AmountSeries>,
    /// Row-major raw amounts, one row per grid row holding a kept amount;
    /// a column with nothing kept on that row reads 0
    pub raw_amounts: Vec<Vec<i64>>,
    /// Row-major scaled amounts, aligned like `raw_amounts`
    pub scaled_amounts: Vec<Vec<i64>>,
    /// Sum of each column's scaled amounts
    pub totals: Vec<i64>,
    /// Core row indices of the filtered grid
    pub core_rows: BTreeSet<usize>,
    /// Core column indices of the filtered grid
    pub core_columns: BTreeSet<usize>,
}

/// Raw grid plus its summary, when the grid validates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableExtraction {
    /// The grid as extracted
    pub raw: RawTable,
    /// `None` when the grid is not a valid disclosure table
    pub summary: Option<TableSummary>,
}

impl TableExtraction {
    /// Whether the grid validated.
    pub fn is_valid(&self) -> bool {
        self.summary.is_some()
    }
}

/// Row and column facts of one pass over a grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoreIndices {
    /// Rows kept by the row filter
    pub rows: Vec<Vec<String>>,
    /// Core row indices (into `rows`)
    pub core_rows: BTreeSet<usize>,
    /// Core column indices
    pub core_columns: BTreeSet<usize>,
}

/// Turns raw grids into validated summaries.
#[derive(Debug, Clone)]
pub struct TableStructurer {
    cells: CellClassifier,
}

impl TableStructurer {
    /// Create a structurer using the year window of `options`.
    pub fn new(options: &ExtractOptions) -> Self {
        Self {
            cells: CellClassifier::new(options.year_window()),
        }
    }

    /// Create a structurer around an existing classifier.
    pub fn with_classifier(cells: CellClassifier) -> Self {
        Self { cells }
    }

    /// The cell classifier in use.
    pub fn classifier(&self) -> &CellClassifier {
        &self.cells
    }

    /// Keep the year/currency/amount rows and compute the core indices.
    ///
    /// Rows whose only numeric content sits next to a "total" label are
    /// dropped so totals are never counted twice.
    pub fn core_indices(&self, raw: &RawTable) -> CoreIndices {
        let cells = &self.cells;
        let rows: Vec<Vec<String>> = raw
            .rows
            .iter()
            .filter(|row| {
                let roles: Vec<CellRoles> = row.iter().map(|c| cells.classify(c)).collect();
                let has = |role: CellRole| roles.iter().any(|r| r.contains(role));
                has(CellRole::Year)
                    || has(CellRole::CurrencyUnit)
                    || (has(CellRole::Amount) && !has(CellRole::Total))
            })
            .cloned()
            .collect();

        let mut year = (BTreeSet::new(), BTreeSet::new());
        let mut currency = (BTreeSet::new(), BTreeSet::new());
        let mut amount = (BTreeSet::new(), BTreeSet::new());
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if cells.is_year(cell) {
                    year.0.insert(r);
                    year.1.insert(c);
                }
                if cells.is_currency_unit(cell) {
                    currency.0.insert(r);
                    currency.1.insert(c);
                }
                if cells.is_amount(cell) {
                    amount.0.insert(r);
                    amount.1.insert(c);
                }
            }
        }

        CoreIndices {
            core_rows: core_set(&year.0, &amount.0, &currency.0),
            core_columns: core_set(&year.1, &amount.1, &currency.1),
            rows,
        }
    }

    /// Validate `raw` and summarize its core columns.
    ///
    /// Returns `None` when the filtered grid is empty, no core column lies in
    /// the last two columns, or a core column fails its shape check.
    pub fn structure(&self, raw: &RawTable) -> Option<TableSummary> {
        let indices = self.core_indices(raw);
        let rows = &indices.rows;
        let width = rows.first().map(Vec::len)?;
        if indices.core_columns.is_empty() {
            log::debug!("Rejecting table: no core column");
            return None;
        }

        let last_two = width.saturating_sub(2)..width;
        if !indices.core_columns.iter().any(|c| last_two.contains(c)) {
            log::debug!("Rejecting table: core columns {:?} not right-most", indices.core_columns);
            return None;
        }

        let columns: Vec<(usize, Vec<&str>)> = indices
            .core_columns
            .iter()
            .map(|&c| (c, rows.iter().map(|row| row[c].as_str()).collect()))
            .collect();

        if let Some((c, _)) = columns.iter().find(|(_, col)| !self.in_format(col)) {
            log::debug!("Rejecting table: column {} fails the shape check", c);
            return None;
        }

        Some(self.summarize(&indices, &columns))
    }

    /// Raw grid with its summary.
    pub fn extract(&self, raw: RawTable) -> TableExtraction {
        let summary = self.structure(&raw);
        TableExtraction { raw, summary }
    }

    /// Currency head: every following cell is an amount. Year head: the
    /// second cell is a currency unit, or every cell from the third on is an
    /// amount.
    fn in_format(&self, column: &[&str]) -> bool {
        let Some(head) = column.first() else {
            return false;
        };
        let cells = &self.cells;
        if cells.is_currency_unit(head) && !column[1..].iter().all(|c| cells.is_amount(c)) {
            return false;
        }
        if cells.is_year(head) {
            let second_is_unit = column.get(1).is_some_and(|c| cells.is_currency_unit(c));
            let rest_are_amounts = column.iter().skip(2).all(|c| cells.is_amount(c));
            if !second_is_unit && !rest_are_amounts {
                return false;
            }
        }
        true
    }

    fn summarize(&self, indices: &CoreIndices, columns: &[(usize, Vec<&str>)]) -> TableSummary {
        let cells = &self.cells;
        let mut years = BTreeSet::new();
        let mut currencies = BTreeSet::new();
        let mut currency_units = BTreeSet::new();

        let mut series: Vec<AmountSeries> = Vec::with_capacity(columns.len());
        for (column, col) in columns {
            let mut first_unit = None;
            for cell in col {
                if cells.is_year(cell) {
                    years.insert(cell.trim().to_string());
                }
                if let Some(cu) = cells.currency_unit(cell) {
                    currencies.insert(cu.currency.clone());
                    currency_units.insert(cu.unit.clone());
                    first_unit.get_or_insert(cu);
                }
            }

            let located: Vec<(usize, i64)> = col
                .iter()
                .enumerate()
                .filter_map(|(row, c)| cells.amount(c).map(|a| (row, a)))
                .collect();
            let amounts: Vec<i64> = located.iter().map(|&(_, a)| a).collect();
            let (rows, raw): (Vec<usize>, Vec<i64>) = located
                .into_iter()
                .zip(subtotal_mask(&amounts))
                .filter_map(|(entry, keep)| keep.then_some(entry))
                .unzip();
            series.push(AmountSeries {
                column: *column,
                multiplier: first_unit.as_ref().map_or(1, |cu| unit_multiplier(&cu.unit)),
                currency: first_unit.as_ref().map(|cu| cu.currency.clone()),
                unit: first_unit.map(|cu| cu.unit),
                raw,
                rows,
                scaled: Vec::new(),
            });
        }

        let declared: BTreeSet<i64> = series
            .iter()
            .filter(|s| s.unit.is_some())
            .map(|s| s.multiplier)
            .collect();
        let uniform = match declared.len() {
            0 => Some(1),
            1 => declared.iter().next().copied(),
            _ => None,
        };
        for s in &mut series {
            if let Some(m) = uniform {
                s.multiplier = m;
            }
            s.scaled = s.raw.iter().map(|a| a.saturating_mul(s.multiplier)).collect();
        }

        let unit_multipliers = if declared.is_empty() {
            BTreeSet::from([1])
        } else {
            declared
        };

        TableSummary {
            years,
            currencies,
            currency_units,
            unit_multipliers,
            raw_amounts: row_major(&series, |s| &s.raw),
            scaled_amounts: row_major(&series, |s| &s.scaled),
            totals: series.iter().map(|s| s.scaled.iter().sum()).collect(),
            columns: series,
            core_rows: indices.core_rows.clone(),
            core_columns: indices.core_columns.clone(),
        }
    }
}

/// Union of the pairwise intersections when years exist, otherwise
/// currency ∩ amount.
fn core_set(
    year: &BTreeSet<usize>,
    amount: &BTreeSet<usize>,
    currency: &BTreeSet<usize>,
) -> BTreeSet<usize> {
    if year.is_empty() {
        return currency.intersection(amount).copied().collect();
    }
    let pairs = [(year, amount), (year, currency), (amount, currency)];
    pairs
        .iter()
        .flat_map(|(a, b)| a.intersection(b).copied())
        .collect()
}

/// Drop subtotal lines from a column of amounts.
///
/// Candidates are visited from the last amount backwards; a candidate is
/// removed as soon as the running sum of the amounts immediately before it
/// (also walking backwards) equals it. Removal is by position, so equal
/// amounts elsewhere in the column are kept.
pub fn remove_subtotals(amounts: &[i64]) -> Vec<i64> {
    amounts
        .iter()
        .zip(subtotal_mask(amounts))
        .filter_map(|(&a, keep)| keep.then_some(a))
        .collect()
}

/// `false` at every position [`remove_subtotals`] drops.
fn subtotal_mask(amounts: &[i64]) -> Vec<bool> {
    let mut keep = vec![true; amounts.len()];
    for k in (0..amounts.len()).rev() {
        let mut sum = 0i64;
        for &prev in amounts[..k].iter().rev() {
            sum = sum.saturating_add(prev);
            if sum == amounts[k] {
                keep[k] = false;
                break;
            }
        }
    }
    keep
}

/// Align the series by grid row. Every kept amount appears exactly once.
fn row_major(series: &[AmountSeries], values: impl Fn(&AmountSeries) -> &Vec<i64>) -> Vec<Vec<i64>> {
    let rows: BTreeSet<usize> = series.iter().flat_map(|s| s.rows.iter().copied()).collect();
    rows.into_iter()
        .map(|row| {
            series
                .iter()
                .map(|s| {
                    s.rows
                        .iter()
                        .position(|&r| r == row)
                        .map_or(0, |i| values(s)[i])
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn structurer() -> TableStructurer {
        TableStructurer::new(&ExtractOptions::new().with_reference_year(2023))
    }

    fn fee_table() -> RawTable {
        RawTable::from_rows(&[
            vec!["", "2023", "2022"],
            vec!["", "HKD'000", "HKD'000"],
            vec!["Audit services", "1,000", "1,200"],
            vec!["Non-audit services", "200", "150"],
            vec!["", "1,200", "1,350"],
        ])
    }

    #[test]
    fn test_remove_subtotals() {
        assert_eq!(remove_subtotals(&[1000, 200, 1200]), vec![1000, 200]);
        assert_eq!(remove_subtotals(&[300, 200, 100, 300, 600]), vec![300, 200, 100]);
        assert_eq!(remove_subtotals(&[100, 250]), vec![100, 250]);
        assert!(remove_subtotals(&[]).is_empty());
    }

    #[test]
    fn test_removal_is_positional() {
        // the leading 500 equals the later subtotal but is not one itself
        assert_eq!(remove_subtotals(&[500, 400, 100, 500]), vec![500, 400, 100]);
    }

    #[test]
    fn test_fee_table_summary() {
        let summary = structurer().structure(&fee_table()).unwrap();

        assert_eq!(summary.core_columns, BTreeSet::from([1, 2]));
        assert_eq!(summary.years, BTreeSet::from(["2022".to_string(), "2023".to_string()]));
        assert_eq!(summary.currencies, BTreeSet::from(["HKD".to_string()]));
        assert_eq!(summary.unit_multipliers, BTreeSet::from([1000]));
        assert_eq!(summary.raw_amounts, vec![vec![1000, 1200], vec![200, 150]]);
        assert_eq!(
            summary.scaled_amounts,
            vec![vec![1_000_000, 1_200_000], vec![200_000, 150_000]]
        );
        assert_eq!(summary.totals, vec![1_200_000, 1_350_000]);
    }

    #[test]
    fn test_row_view_keeps_amounts_of_uneven_columns() {
        let raw = RawTable::from_rows(&[
            vec!["", "2023", "2022"],
            vec!["", "HKD'000", "HKD'000"],
            vec!["Audit services", "1,000", "1,200"],
            vec!["Non-audit services", "200", "150"],
            vec!["", "1,200", "1,351"],
        ]);
        let summary = structurer().structure(&raw).unwrap();

        assert_eq!(summary.columns[0].raw, vec![1000, 200]);
        assert_eq!(summary.columns[1].raw, vec![1200, 150, 1351]);
        assert_eq!(summary.columns[1].rows, vec![2, 3, 4]);
        assert_eq!(summary.raw_amounts, vec![vec![1000, 1200], vec![200, 150], vec![0, 1351]]);
        assert_eq!(summary.totals, vec![1_200_000, 2_701_000]);

        let column_sums: Vec<i64> = (0..2)
            .map(|c| summary.scaled_amounts.iter().map(|row| row[c]).sum())
            .collect();
        assert_eq!(column_sums, summary.totals);
    }

    #[test]
    fn test_total_rows_are_filtered() {
        let raw = RawTable::from_rows(&[
            vec!["", "HK$'000"],
            vec!["Audit", "800"],
            vec!["Total", "800"],
        ]);
        let indices = structurer().core_indices(&raw);
        assert_eq!(indices.rows.len(), 2);
        assert_eq!(indices.core_columns, BTreeSet::from([1]));
    }

    #[test]
    fn test_per_column_units() {
        let raw = RawTable::from_rows(&[
            vec!["", "HK$'000", "RMB million"],
            vec!["Audit", "1,500", "2"],
            vec!["Other", "300", "1"],
        ]);
        let summary = structurer().structure(&raw).unwrap();
        assert_eq!(summary.unit_multipliers, BTreeSet::from([1000, 1_000_000]));
        assert_eq!(summary.columns[0].scaled, vec![1_500_000, 300_000]);
        assert_eq!(summary.columns[1].scaled, vec![2_000_000, 1_000_000]);
    }

    #[test]
    fn test_core_column_must_be_right_most() {
        let raw = RawTable::from_rows(&[
            vec!["HKD'000", "", "", "note"],
            vec!["1,000", "", "", "a"],
            vec!["200", "", "", "b"],
        ]);
        assert!(structurer().structure(&raw).is_none());
    }

    #[test]
    fn test_shape_check() {
        let raw = RawTable::from_rows(&[
            vec!["", "HKD'000"],
            vec!["Audit", "1,000"],
            vec!["Other", "n/a"],
        ]);
        // the "Other" row is dropped by the row filter, so the column is clean
        assert!(structurer().structure(&raw).is_some());

        let raw = RawTable::from_rows(&[
            vec!["", "HKD'000", "2023"],
            vec!["Audit", "1,000", "RMB"],
            vec!["Other", "HKD", "300"],
        ]);
        assert!(structurer().structure(&raw).is_none());
    }

    #[test]
    fn test_rejects_empty() {
        assert!(structurer().structure(&RawTable::default()).is_none());
        let extraction = structurer().extract(RawTable::from_rows(&[vec!["text only"]]));
        assert!(!extraction.is_valid());
        assert_eq!(extraction.raw.row_count(), 1);
    }

    #[test]
    fn test_structure_is_idempotent() {
        let structurer = structurer();
        let table = fee_table();
        assert_eq!(structurer.structure(&table), structurer.structure(&table));
    }
}
