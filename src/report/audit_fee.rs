//! Corporate governance report: auditor's remuneration tables.

use crate::error::Result;
use crate::locate::{pages_with_section, SectionLocator, TitlePattern};
use crate::model::{BBox, Document, PageRange};
use crate::options::ExtractOptions;
use crate::table::{extract_table, TableExtraction};
use serde::Serialize;

/// Table found under an auditor's remuneration heading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditFeeTable {
    /// 0-based page of the section
    pub page: u32,
    /// Section heading
    pub title: String,
    /// Region the grid was extracted from
    pub bbox: BBox,
    /// Grid and, when it validates, its summary
    pub table: TableExtraction,
}

/// One resolved corporate governance report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorporateGovernanceReport {
    /// Pages of the report
    pub range: PageRange,
    /// Pages carrying an auditor's remuneration section
    pub fee_pages: Option<PageRange>,
    /// One entry per matching section
    pub audit_fees: Vec<AuditFeeTable>,
}

impl CorporateGovernanceReport {
    /// Outline title of a corporate governance report.
    pub fn title_pattern() -> Result<TitlePattern> {
        TitlePattern::new("corporate governance")?.with_any_of("report")
    }

    /// Section heading of the auditor's remuneration disclosure.
    pub fn audit_fee_pattern() -> Result<TitlePattern> {
        TitlePattern::new("audit")?
            .with_any_of("remuneration|independent|external|accountability")?
            .with_none_of("nomination|report")
    }

    /// Analyse the report spanning `range`.
    pub fn analyse(document: &Document, range: PageRange, options: &ExtractOptions) -> Result<Self> {
        let pattern = Self::audit_fee_pattern()?;
        let fee_pages = pages_with_section(document.pages_in(range), &pattern);

        let audit_fees = match fee_pages {
            Some(pages) => SectionLocator::new(options)
                .locate(document, pages, &pattern)
                .iter()
                .map(|region| AuditFeeTable {
                    page: region.page_number(),
                    title: region.title().unwrap_or_default().to_string(),
                    bbox: region.bbox(),
                    table: extract_table(region, options),
                })
                .collect(),
            None => Vec::new(),
        };

        log::debug!(
            "Corporate governance report {}: {} audit fee section(s), {} valid",
            range,
            audit_fees.len(),
            audit_fees.iter().filter(|t| t.table.is_valid()).count()
        );

        Ok(Self {
            range,
            fee_pages,
            audit_fees,
        })
    }

    /// Fee tables that validated.
    pub fn valid_tables(&self) -> impl Iterator<Item = &AuditFeeTable> {
        self.audit_fees.iter().filter(|t| t.table.is_valid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_fee_pattern() {
        let pattern = CorporateGovernanceReport::audit_fee_pattern().unwrap();
        assert!(pattern.is_match("AUDITOR'S REMUNERATION"));
        assert!(pattern.is_match("External Auditor"));
        assert!(!pattern.is_match("Audit Committee Report"));
        assert!(!pattern.is_match("Nomination and Audit Committee"));
        assert!(!pattern.is_match("Audit Committee"));
    }

    #[test]
    fn test_title_pattern() {
        let pattern = CorporateGovernanceReport::title_pattern().unwrap();
        assert!(pattern.is_match("Corporate Governance Report"));
        assert!(!pattern.is_match("Corporate Governance Code"));
    }

    #[test]
    fn test_no_fee_section() {
        let document = Document::with_pages(vec![crate::model::Page::a4(0)]);
        let report =
            CorporateGovernanceReport::analyse(&document, PageRange::single(0), &ExtractOptions::default())
                .unwrap();
        assert!(report.fee_pages.is_none());
        assert!(report.audit_fees.is_empty());
    }
}
