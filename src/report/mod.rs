//! Annual report pipelines.
//!
//! Each pipeline resolves its report through the outline, then composes
//! the layout, section and table modules:
//!
//! - [`AuditorReport`]: signing firms and key audit matters
//! - [`CorporateGovernanceReport`]: auditor's remuneration tables
//!
//! [`AnnualReport::analyse`] runs both and folds the results into one
//! serialisable [`AnnualReportSummary`].

mod audit_fee;
mod auditor;

pub use audit_fee::{AuditFeeTable, CorporateGovernanceReport};
pub use auditor::{find_auditors, AuditorReport, KeyAuditMatter};

use crate::entity::{EntityValidator, Fallback};
use crate::error::{Error, Result};
use crate::locate::{OutlineResolver, OutlineSource};
use crate::model::Document;
use crate::options::ExtractOptions;
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::collections::BTreeSet;

/// Case-insensitive keyword patterns used to tag key audit matters.
#[derive(Debug, Clone, Default)]
pub struct KeywordSet {
    keywords: Vec<(String, Regex)>,
}

impl KeywordSet {
    /// Compile `keywords`; each one is a regular expression.
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Result<Self> {
        let keywords = keywords
            .iter()
            .map(|k| {
                let k = k.as_ref();
                RegexBuilder::new(k)
                    .case_insensitive(true)
                    .build()
                    .map(|re| (k.to_string(), re))
                    .map_err(|source| Error::InvalidPattern {
                        pattern: k.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { keywords })
    }

    /// Keywords found in `text`, sorted and deduplicated.
    pub fn tags(&self, text: &str) -> Vec<String> {
        self.keywords
            .iter()
            .filter(|(_, re)| re.is_match(text))
            .map(|(k, _)| k.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Number of keywords.
    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

/// Everything extracted from one annual report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualReportSummary {
    /// Number of pages in the document
    pub page_count: u32,
    /// How the auditor's reports were located
    pub auditor_report_source: OutlineSource,
    /// How the corporate governance reports were located
    pub governance_report_source: OutlineSource,
    /// Auditor names validated against the registry
    pub auditors: BTreeSet<String>,
    /// Per-report findings
    pub auditor_reports: Vec<AuditorReport>,
    /// Per-report findings
    pub governance_reports: Vec<CorporateGovernanceReport>,
}

impl AnnualReportSummary {
    /// All key audit matter tags, sorted and deduplicated.
    pub fn kam_tags(&self) -> BTreeSet<String> {
        self.auditor_reports.iter().flat_map(|r| r.tags()).collect()
    }

    /// Render as JSON, indented unless `compact`.
    pub fn to_json(&self, compact: bool) -> Result<String> {
        let json = if compact {
            serde_json::to_string(self)?
        } else {
            serde_json::to_string_pretty(self)?
        };
        Ok(json)
    }
}

/// Entry point for the annual report pipelines.
#[derive(Debug, Clone)]
pub struct AnnualReport {
    validator: EntityValidator,
    keywords: KeywordSet,
    options: ExtractOptions,
}

impl AnnualReport {
    /// Create a pipeline with a firm registry and KAM keywords.
    pub fn new<S: AsRef<str>>(registry: Vec<String>, keywords: &[S], options: ExtractOptions) -> Result<Self> {
        Ok(Self {
            validator: EntityValidator::from_options(registry, &options),
            keywords: KeywordSet::new(keywords)?,
            options,
        })
    }

    /// Run both pipelines over `document`.
    pub fn analyse<S: AsRef<str>>(
        document: &Document,
        registry: Vec<String>,
        keywords: &[S],
        options: &ExtractOptions,
    ) -> Result<AnnualReportSummary> {
        Self::new(registry, keywords, options.clone())?.run(document)
    }

    /// Run both pipelines over `document`.
    pub fn run(&self, document: &Document) -> Result<AnnualReportSummary> {
        let resolver = OutlineResolver::for_options(&self.options);

        log::info!("Processing independent auditor's reports");
        let (ranges, auditor_report_source) =
            resolver.resolve_with_source(document, &AuditorReport::title_pattern()?);
        let auditor_reports = ranges
            .into_iter()
            .map(|range| AuditorReport::analyse(document, range, &self.keywords, &self.options))
            .collect::<Result<Vec<_>>>()?;

        let auditors = auditor_reports
            .iter()
            .flat_map(|r| r.auditors.iter())
            .map(|raw| self.validator.validate(raw, &Fallback::PassThrough))
            .filter(|name| !name.is_empty())
            .collect();

        log::info!("Processing corporate governance reports");
        let (ranges, governance_report_source) =
            resolver.resolve_with_source(document, &CorporateGovernanceReport::title_pattern()?);
        let governance_reports = ranges
            .into_iter()
            .map(|range| CorporateGovernanceReport::analyse(document, range, &self.options))
            .collect::<Result<Vec<_>>>()?;

        Ok(AnnualReportSummary {
            page_count: document.page_count(),
            auditor_report_source,
            governance_report_source,
            auditors,
            auditor_reports,
            governance_reports,
        })
    }
}
