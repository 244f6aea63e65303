//! Independent auditor's report: signing firms and key audit matters.

use super::KeywordSet;
use crate::error::Result;
use crate::layout::{ColumnSplitter, SectionAssembler};
use crate::locate::{pages_with_section, TitlePattern};
use crate::model::{Document, Page, PageRange};
use crate::options::ExtractOptions;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;

const AUDITOR_PATTERN: &str = r"(?m)^(?P<auditor>.{4,}?\S|[A-Z]{4})\s*(?:LLP\s*)?(?:(?:PRC|Chinese)\s*)?(?:Certified\s*Public|Chartered)\s*Accountants?";

static AUDITOR_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(AUDITOR_PATTERN).expect("valid auditor regex"));

/// A key audit matter heading with the keywords it mentions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyAuditMatter {
    /// 0-based page holding the heading
    pub page: u32,
    /// Heading text
    pub text: String,
    /// Matching keywords, sorted
    pub tags: Vec<String>,
}

/// One resolved auditor's report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditorReport {
    /// Pages of the report
    pub range: PageRange,
    /// Firm names as printed above the designation, trimmed
    pub auditors: BTreeSet<String>,
    /// Pages carrying key audit matters
    pub kam_pages: Option<PageRange>,
    /// Key audit matters in page order
    pub key_audit_matters: Vec<KeyAuditMatter>,
}

impl AuditorReport {
    /// Outline title of an independent auditor's report.
    pub fn title_pattern() -> Result<TitlePattern> {
        TitlePattern::new("auditor")?
            .with_any_of("report|responsibilities")?
            .with_none_of("internal")
    }

    /// Heading of the key audit matters section.
    pub fn kam_pattern() -> Result<TitlePattern> {
        TitlePattern::new(r"key audit matters?")
    }

    /// Analyse the report spanning `range`.
    pub fn analyse(
        document: &Document,
        range: PageRange,
        keywords: &KeywordSet,
        options: &ExtractOptions,
    ) -> Result<Self> {
        let auditors = document
            .get_page(range.to)
            .map(|page| find_auditors(page, options))
            .unwrap_or_default();

        let kam_pages = pages_with_section(document.pages_in(range), &Self::kam_pattern()?);
        let key_audit_matters = match kam_pages {
            Some(pages) => key_audit_matters(document, pages, keywords, options),
            None => Vec::new(),
        };

        log::debug!(
            "Auditor's report {}: {} auditor(s), {} key audit matter(s)",
            range,
            auditors.len(),
            key_audit_matters.len()
        );

        Ok(Self {
            range,
            auditors,
            kam_pages,
            key_audit_matters,
        })
    }

    /// Tags of all key audit matters, sorted and deduplicated.
    pub fn tags(&self) -> BTreeSet<String> {
        self.key_audit_matters
            .iter()
            .flat_map(|kam| kam.tags.iter().cloned())
            .collect()
    }
}

/// Firm names signing `page`.
///
/// The page is split as a bilingual page; the columns are searched first
/// and the whole page only when no column yields a name.
pub fn find_auditors(page: &Page, options: &ExtractOptions) -> BTreeSet<String> {
    let re = &*AUDITOR_REGEX;
    let region = page.region();

    let mut names = BTreeSet::new();
    if let Some(columns) = ColumnSplitter::bilingual(options.header_band).split(&region) {
        for column in columns.regions() {
            names.extend(first_auditor(re, &column.ascii_text()));
        }
    }
    if names.is_empty() {
        names.extend(first_auditor(re, &region.ascii_text()));
    }
    names
}

/// First name followed by an accountancy designation, skipping lines that
/// cite the professional body or the responsibilities paragraph.
fn first_auditor(re: &Regex, text: &str) -> Option<String> {
    re.captures_iter(text).find_map(|caps| {
        let name = caps.name("auditor")?;
        let line_end = text[name.start()..]
            .find('\n')
            .map_or(text.len(), |i| name.start() + i);
        let line = &text[name.start()..line_end];
        if line.contains("Institute") || line.contains("Responsibilities") {
            return None;
        }
        let name = name.as_str().trim();
        (!name.is_empty()).then(|| name.to_string())
    })
}

/// Key audit matters on `pages`: blocks of feature text at any size that
/// mention a keyword.
fn key_audit_matters(
    document: &Document,
    pages: PageRange,
    keywords: &KeywordSet,
    options: &ExtractOptions,
) -> Vec<KeyAuditMatter> {
    let assembler = SectionAssembler::for_options(options);
    document
        .pages_in(pages)
        .flat_map(|page| {
            assembler
                .feature_blocks(&page.region())
                .into_iter()
                .filter_map(move |section| {
                    let tags = keywords.tags(&section.text);
                    (!tags.is_empty()).then(|| KeyAuditMatter {
                        page: page.number,
                        text: section.text,
                        tags,
                    })
                })
        })
        .collect()
}
