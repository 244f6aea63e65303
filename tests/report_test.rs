//! End-to-end annual report analysis over a synthetic document.
//!
//! Run with: cargo test --test report_test

mod common;

use common::{body, body_page, fee_table, line, BODY_FONT, TITLE_FONT};
use disclose::{
    AnnualReport, AuditorReport, Bookmark, Document, ExtractOptions, Glyph, OutlineSource, Page, PageRange,
};

const RUNNING_HEADER: &str = "Independent Auditor's Report";

fn header(glyphs: &mut Vec<Glyph>) {
    line(glyphs, RUNNING_HEADER, 50.0, 30.0, TITLE_FONT, 12.0);
}

/// Pages 0-2: auditor's report with a running header and no bookmark.
/// Pages 3-4: corporate governance report, bookmarked, with the fee table
/// on page 4. Page 5: financial statements.
fn annual_report() -> Document {
    let mut p0 = Vec::new();
    header(&mut p0);
    body(&mut p0, 50.0, 80.0, 10);

    let mut p1 = Vec::new();
    header(&mut p1);
    line(&mut p1, "Key Audit Matters", 50.0, 60.0, TITLE_FONT, 12.0);
    body(&mut p1, 50.0, 90.0, 6);
    line(&mut p1, "Revenue recognition", 50.0, 200.0, TITLE_FONT, 12.0);
    body(&mut p1, 50.0, 230.0, 6);

    let mut p2 = Vec::new();
    header(&mut p2);
    body(&mut p2, 50.0, 80.0, 8);
    line(&mut p2, "Deloitte Touche Tohmatsu", 50.0, 300.0, BODY_FONT, 10.0);
    line(&mut p2, "Certified Public Accountants", 50.0, 315.0, BODY_FONT, 10.0);

    let mut p3 = Vec::new();
    line(&mut p3, "Corporate Governance Report", 50.0, 60.0, TITLE_FONT, 14.0);
    body(&mut p3, 50.0, 100.0, 10);

    let mut p4 = Vec::new();
    line(&mut p4, "Auditor's Remuneration", 50.0, 60.0, TITLE_FONT, 14.0);
    fee_table(&mut p4, 100.0);
    line(&mut p4, "Company Secretary", 50.0, 400.0, TITLE_FONT, 14.0);
    body(&mut p4, 50.0, 430.0, 5);

    Document::with_pages(vec![
        Page::a4(0).with_glyphs(p0),
        Page::a4(1).with_glyphs(p1),
        Page::a4(2).with_glyphs(p2),
        Page::a4(3).with_glyphs(p3),
        Page::a4(4).with_glyphs(p4),
        body_page(5),
    ])
    .with_bookmarks(vec![
        Bookmark::new("Corporate Governance Report", Some(3)),
        Bookmark::new("Financial Statements", Some(5)),
        Bookmark::new("Notes", None),
    ])
}

fn registry() -> Vec<String> {
    vec!["KPMG".to_string(), "Deloitte Touche Tohmatsu".to_string()]
}

fn options() -> ExtractOptions {
    ExtractOptions::new().with_reference_year(2023)
}

#[test]
fn test_auditor_report_by_page_scan() {
    let summary = AnnualReport::analyse(&annual_report(), registry(), &["goodwill", "revenue"], &options()).unwrap();

    assert_eq!(summary.page_count, 6);
    assert_eq!(summary.auditor_report_source, OutlineSource::TextScan);
    assert_eq!(summary.auditor_reports.len(), 1);

    let report = &summary.auditor_reports[0];
    assert_eq!(report.range, PageRange::new(0, 2));
    assert_eq!(report.kam_pages, Some(PageRange::single(1)));
    assert_eq!(report.key_audit_matters.len(), 1);
    assert_eq!(report.key_audit_matters[0].text, "Revenue recognition");
    assert_eq!(report.key_audit_matters[0].page, 1);

    assert_eq!(report.auditors.iter().collect::<Vec<_>>(), vec!["Deloitte Touche Tohmatsu"]);
    assert_eq!(summary.auditors.into_iter().collect::<Vec<_>>(), vec!["DELOITTE TOUCHE TOHMATSU"]);
}

#[test]
fn test_audit_fees_from_governance_report() {
    let summary = AnnualReport::analyse(&annual_report(), registry(), &["revenue"], &options()).unwrap();

    assert_eq!(summary.governance_report_source, OutlineSource::Bookmarks);
    let report = &summary.governance_reports[0];
    assert_eq!(report.range, PageRange::new(3, 4));
    assert_eq!(report.fee_pages, Some(PageRange::single(4)));
    assert_eq!(report.audit_fees.len(), 1);

    let fees = &report.audit_fees[0];
    assert_eq!(fees.page, 4);
    assert_eq!(fees.title, "Auditor's Remuneration");
    assert_eq!(fees.bbox.top, 60.0);
    assert_eq!(fees.bbox.bottom, 400.0);

    let valid: Vec<_> = report.valid_tables().collect();
    assert_eq!(valid.len(), 1);
    let summary = valid[0].table.summary.as_ref().unwrap();
    assert_eq!(summary.scaled_amounts, vec![vec![1_000_000, 1_200_000], vec![200_000, 150_000]]);
}

#[test]
fn test_kam_tags_and_json() {
    let summary = AnnualReport::analyse(&annual_report(), registry(), &["goodwill", "revenue"], &options()).unwrap();
    assert_eq!(summary.kam_tags().into_iter().collect::<Vec<_>>(), vec!["revenue"]);

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["auditor_report_source"], "text_scan");
    assert_eq!(json["governance_report_source"], "bookmarks");
    assert_eq!(json["auditors"][0], "DELOITTE TOUCHE TOHMATSU");

    let compact = summary.to_json(true).unwrap();
    assert!(!compact.contains('\n'));
    let pretty = summary.to_json(false).unwrap();
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&compact).unwrap(),
        serde_json::from_str::<serde_json::Value>(&pretty).unwrap()
    );
}

#[test]
fn test_pipeline_is_repeatable() {
    let doc = annual_report();
    let pipeline = AnnualReport::new(registry(), &["revenue"], options()).unwrap();
    assert_eq!(pipeline.run(&doc).unwrap(), pipeline.run(&doc).unwrap());
}

#[test]
fn test_unknown_firm_passes_through() {
    let summary = AnnualReport::analyse(&annual_report(), vec!["KPMG".to_string()], &["revenue"], &options()).unwrap();
    assert_eq!(summary.auditors.into_iter().collect::<Vec<_>>(), vec!["Deloitte"]);
}

#[test]
fn test_empty_document() {
    let summary = AnnualReport::analyse(&Document::new(), registry(), &["revenue"], &options()).unwrap();

    assert_eq!(summary.page_count, 0);
    assert_eq!(summary.auditor_report_source, OutlineSource::NotFound);
    assert_eq!(summary.governance_report_source, OutlineSource::NotFound);
    assert!(summary.auditors.is_empty());
    assert!(summary.governance_reports.is_empty());
}

#[test]
fn test_invalid_keyword() {
    assert!(AnnualReport::new(registry(), &["[unclosed"], options()).is_err());
}

#[test]
fn test_auditor_pattern_excludes_internal_control() {
    let pattern = AuditorReport::title_pattern().unwrap();
    assert!(pattern.is_match(RUNNING_HEADER));
    assert!(pattern.is_match("Auditor's Responsibilities"));
    assert!(!pattern.is_match("Auditor's Report on Internal Control"));
}
