//! Layout inference over synthetic pages.
//!
//! Run with: cargo test --test layout_test

mod common;

use common::{body, heading, line, BODY_FONT, TITLE_FONT};
use disclose::layout::{runs, TextRun};
use disclose::{
    ColumnSplitter, Document, ExtractOptions, Glyph, LanguageFilter, Page, PageRange, SectionAssembler,
    SectionLocator, TextView, TitlePattern,
};

fn run(text: &str, top: f32, size: f32) -> TextRun {
    TextRun {
        text: text.to_string(),
        x0: 50.0,
        x1: 250.0,
        top,
        bottom: top + size,
        fontname: TITLE_FONT.to_string(),
        size,
    }
}

/// Page with an English heading and body plus a line of CJK body text.
fn mixed_page() -> Page {
    let mut g = Vec::new();
    heading(&mut g, "Independent Auditor's Report", 50.0, 60.0);
    body(&mut g, 50.0, 100.0, 6);
    line(&mut g, "獨立核數師報告", 50.0, 300.0, "MingLiU", 12.0);
    line(&mut g, "我們已審計列載於第頁的綜合財務報表", 50.0, 330.0, "MingLiU", 10.0);
    line(&mut g, "我們已審計列載於第頁的綜合財務報表", 50.0, 345.0, "MingLiU", 10.0);
    g.push(Glyph::new("X", 500.0, 500.0, 505.0, 510.0, BODY_FONT, 10.0).rotated());
    Page::a4(0).with_glyphs(g)
}

#[test]
fn test_partition_covers_upright_glyphs() {
    let page = mixed_page();
    let region = page.region();

    for filter in [LanguageFilter::All, LanguageFilter::Ascii, LanguageFilter::NonAscii] {
        let view = TextView::of(&region, filter).unwrap();
        let upright = page
            .glyphs()
            .iter()
            .filter(|g| g.upright && filter.accepts(g))
            .count();
        assert_eq!(view.main.len() + view.feature.len(), upright, "{:?}", filter);
        assert!(view.main.iter().all(|g| view.profile.is_main(g)));
        assert!(view.feature.iter().all(|g| !view.profile.is_main(g)));
    }
}

#[test]
fn test_partitions_have_own_profiles() {
    let page = mixed_page();
    let region = page.region();

    let ascii = TextView::of(&region, LanguageFilter::Ascii).unwrap();
    assert_eq!(ascii.profile.main_font, BODY_FONT);
    assert_eq!(ascii.profile.main_size, 10.0);

    let cjk = TextView::of(&region, LanguageFilter::NonAscii).unwrap();
    assert_eq!(cjk.profile.main_font, "MingLiU");
    // the 12pt CJK title is feature text of its own partition
    assert_eq!(cjk.feature.len(), "獨立核數師報告".chars().count());
}

#[test]
fn test_empty_partition() {
    let mut g = Vec::new();
    body(&mut g, 50.0, 100.0, 2);
    let page = Page::a4(0).with_glyphs(g);
    assert!(TextView::of(&page.region(), LanguageFilter::NonAscii).is_none());
}

#[test]
fn test_gap_rule() {
    let runs = vec![run("Key Audit", 100.0, 12.0), run("Matters", 120.0, 12.0), run("Goodwill", 150.0, 12.0)];
    let sections = SectionAssembler::new().group(&runs, 800.0);

    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].text, "Key Audit Matters");
    assert_eq!(sections[0].top, 100.0);
    assert_eq!(sections[0].bottom, 132.0);
    assert_eq!(sections[0].next_top, 150.0);
    assert_eq!(sections[1].text, "Goodwill");
    assert_eq!(sections[1].next_top, 800.0);
}

#[test]
fn test_bilingual_slack() {
    // gap of 12.5 against a 12pt predecessor
    let runs = vec![run("Opinion", 100.0, 12.0), run("Basis", 124.5, 12.0)];

    assert_eq!(SectionAssembler::new().group(&runs, 800.0).len(), 2);
    let merged = SectionAssembler::bilingual().group(&runs, 800.0);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].text, "Opinion Basis");
}

#[test]
fn test_sections_are_ordered_and_linked() {
    let mut g = Vec::new();
    heading(&mut g, "Opinion", 50.0, 60.0);
    body(&mut g, 50.0, 90.0, 5);
    heading(&mut g, "Basis for Opinion", 50.0, 200.0);
    body(&mut g, 50.0, 230.0, 5);
    let page = Page::a4(0).with_glyphs(g);

    let sections = SectionAssembler::new().sections(&page.region());
    let titles: Vec<&str> = sections.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(titles, vec!["Opinion", "Basis for Opinion"]);
    assert_eq!(sections[0].next_top, 200.0);
    assert_eq!(sections[1].next_top, page.height);
    assert!(sections.windows(2).all(|w| w[0].top < w[1].top));
}

#[test]
fn test_runs_skip_punctuation() {
    let mut g = Vec::new();
    line(&mut g, "..........", 50.0, 100.0, TITLE_FONT, 14.0);
    line(&mut g, "Notes", 50.0, 130.0, TITLE_FONT, 14.0);
    let glyphs: Vec<&Glyph> = g.iter().collect();

    let runs = runs(&glyphs);
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].text, "Notes");
}

/// Two columns: "Opinion" at x0 50, "Key Audit Matters" at x0 320 further
/// down the right column.
fn two_column_page() -> Page {
    let mut g = Vec::new();
    heading(&mut g, "Opinion", 50.0, 60.0);
    heading(&mut g, "Key Audit Matters", 320.0, 150.0);
    for row in 0..12 {
        line(&mut g, "left column body text here", 50.0, 90.0 + row as f32 * 15.0, BODY_FONT, 10.0);
    }
    for row in 0..6 {
        line(&mut g, "right column body text", 320.0, 180.0 + row as f32 * 15.0, BODY_FONT, 10.0);
    }
    Page::a4(0).with_glyphs(g)
}

#[test]
fn test_column_split() {
    let page = two_column_page();
    let columns = ColumnSplitter::new().split(&page.region()).unwrap();

    assert_eq!(columns.division, 320.0);
    assert_eq!(columns.left.bbox().x0, 50.0);
    assert_eq!(columns.left.bbox().x1, 320.0);
    let right = columns.right.as_ref().unwrap();
    assert_eq!(right.bbox().x0, 320.0);
    assert!(right.text().contains("Key Audit Matters"));
    assert!(!columns.left.text().contains("Key Audit Matters"));
}

#[test]
fn test_single_column_has_no_division() {
    let mut g = Vec::new();
    heading(&mut g, "Opinion", 50.0, 60.0);
    body(&mut g, 50.0, 90.0, 5);
    heading(&mut g, "Basis for Opinion", 50.0, 200.0);
    body(&mut g, 50.0, 230.0, 5);
    let page = Page::a4(0).with_glyphs(g);

    assert!(ColumnSplitter::new().division(&page.region()).is_none());
}

#[test]
fn test_section_in_right_column() {
    let doc = Document::with_pages(vec![two_column_page()]);
    let pattern = TitlePattern::new("key audit matters?").unwrap();

    let regions = SectionLocator::new(&ExtractOptions::default()).locate(&doc, PageRange::single(0), &pattern);
    assert_eq!(regions.len(), 1);
    let region = &regions[0];
    assert_eq!(region.page_number(), 0);
    assert_eq!(region.title(), Some("Key Audit Matters"));
    assert_eq!(region.bbox().x0, 320.0);
    assert_eq!(region.bbox().top, 150.0);
    assert!(region.text().contains("right column body text"));
    assert!(!region.text().contains("left column"));
}

#[test]
fn test_layout_is_deterministic() {
    let page = two_column_page();
    let a = SectionAssembler::new().sections(&page.region());
    let b = SectionAssembler::new().sections(&page.region());
    assert_eq!(a, b);
}
