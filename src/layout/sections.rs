//! Feature runs and section assembly.

use super::classify::{size_key, FontProfile, LanguageFilter, TextView};
use super::text::join_glyphs;
use crate::model::{Glyph, Region};
use crate::options::ExtractOptions;
use serde::Serialize;
use std::collections::HashMap;

/// Feature glyphs sharing `(top, bottom, fontname, size)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    /// Text in reading order
    pub text: String,
    /// Leftmost X position
    pub x0: f32,
    /// Rightmost X position
    pub x1: f32,
    /// Top edge
    pub top: f32,
    /// Bottom edge
    pub bottom: f32,
    /// Font name
    pub fontname: String,
    /// Font size
    pub size: f32,
}

type RunKey<'a> = (i32, i32, &'a str, i32);

/// Group glyphs into runs, ordered by `top` then `x0`.
///
/// Runs without a word character (rules, dot leaders, bullets) are dropped.
pub fn runs(glyphs: &[&Glyph]) -> Vec<TextRun> {
    let mut order: Vec<RunKey> = Vec::new();
    let mut groups: HashMap<RunKey, Vec<&Glyph>> = HashMap::new();

    for &glyph in glyphs {
        let key = (
            size_key(glyph.top),
            size_key(glyph.bottom),
            glyph.fontname.as_str(),
            size_key(glyph.size),
        );
        groups
            .entry(key)
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(glyph);
    }

    let mut runs: Vec<TextRun> = order
        .into_iter()
        .filter_map(|key| {
            let mut members = groups.remove(&key)?;
            members.sort_by(|a, b| a.x0.total_cmp(&b.x0));
            let text = join_glyphs(&members);
            if !text.chars().any(|c| c.is_alphanumeric() || c == '_') {
                return None;
            }
            let first = members[0];
            Some(TextRun {
                text,
                x0: first.x0,
                x1: members.iter().map(|g| g.x1).fold(f32::MIN, f32::max),
                top: first.top,
                bottom: first.bottom,
                fontname: first.fontname.clone(),
                size: first.size,
            })
        })
        .collect();

    runs.sort_by(|a, b| a.top.total_cmp(&b.top).then(a.x0.total_cmp(&b.x0)));
    runs
}

/// Runs that can open a section: larger than body text, or, when the page
/// has none, emphasised runs at body size.
pub fn title_runs(runs: Vec<TextRun>, profile: &FontProfile) -> Vec<TextRun> {
    let main = size_key(profile.main_size);
    let (larger, rest): (Vec<_>, Vec<_>) = runs.into_iter().partition(|r| size_key(r.size) > main);
    if !larger.is_empty() {
        return larger;
    }
    rest.into_iter().filter(|r| size_key(r.size) == main).collect()
}

/// A vertically contiguous block opened by one or more title runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    /// Concatenated text of its runs
    pub text: String,
    /// Top of the first run
    pub top: f32,
    /// Bottom of the last run
    pub bottom: f32,
    /// Left edge of the first run
    pub x0: f32,
    /// Right edge of the first run
    pub x1: f32,
    /// Font of the first run
    pub fontname: String,
    /// Size of the first run
    pub size: f32,
    /// Where the content of this section ends
    pub next_top: f32,
}

impl Section {
    fn open(run: &TextRun) -> Self {
        Self {
            text: run.text.clone(),
            top: run.top,
            bottom: run.bottom,
            x0: run.x0,
            x1: run.x1,
            fontname: run.fontname.clone(),
            size: run.size,
            next_top: run.bottom,
        }
    }

    /// Height of the crop `[top, next_top)`.
    pub fn span(&self) -> f32 {
        self.next_top - self.top
    }
}

/// Gap-clustering of title runs into sections.
#[derive(Debug, Clone)]
pub struct SectionAssembler {
    slack: f32,
    filters: Vec<LanguageFilter>,
}

impl Default for SectionAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionAssembler {
    /// Single pass over the ASCII partition, no slack.
    pub fn new() -> Self {
        Self {
            slack: 0.0,
            filters: vec![LanguageFilter::Ascii],
        }
    }

    /// One pass per language partition, 1pt of slack.
    pub fn bilingual() -> Self {
        Self {
            slack: 1.0,
            filters: LanguageFilter::partitions().to_vec(),
        }
    }

    /// Pick the variant configured in `options`.
    pub fn for_options(options: &ExtractOptions) -> Self {
        if options.bilingual {
            Self::bilingual()
        } else {
            Self::new()
        }
    }

    /// Override the slack added to the gap threshold.
    pub fn with_slack(mut self, slack: f32) -> Self {
        self.slack = slack;
        self
    }

    /// Gap threshold slack in points.
    pub fn slack(&self) -> f32 {
        self.slack
    }

    /// Cluster runs (ordered by `top`) into sections.
    ///
    /// A run stays with its predecessor while
    /// `|prev.bottom - run.top| <= prev.size + slack`. `next_top` is set to
    /// the following section's top, or `limit` for the last one; sections
    /// with no height left are dropped.
    pub fn group(&self, runs: &[TextRun], limit: f32) -> Vec<Section> {
        link(self.cluster(runs), limit)
    }

    fn cluster(&self, runs: &[TextRun]) -> Vec<Section> {
        let mut sections: Vec<Section> = Vec::new();
        let mut prev: Option<&TextRun> = None;

        for run in runs {
            match (prev, sections.last_mut()) {
                (Some(p), Some(section)) if (p.bottom - run.top).abs() <= p.size + self.slack => {
                    section.text.push(' ');
                    section.text.push_str(&run.text);
                    section.bottom = run.bottom;
                }
                _ => sections.push(Section::open(run)),
            }
            prev = Some(run);
        }

        sections
    }

    /// Sections of a region, bounded below by the region's bottom edge.
    ///
    /// Partitions are clustered independently, then merged by `top` before
    /// `next_top` is assigned.
    pub fn sections(&self, region: &Region<'_>) -> Vec<Section> {
        link(self.clustered_sections(region), region.bbox().bottom)
    }

    /// Clustered sections of every partition, merged by `top`.
    ///
    /// `next_top` is not assigned yet, so headings sharing a line with a
    /// heading of the other partition are kept.
    pub fn clustered_sections(&self, region: &Region<'_>) -> Vec<Section> {
        let mut sections = Vec::new();
        for filter in &self.filters {
            let Some(view) = TextView::of(region, *filter) else {
                continue;
            };
            let title = title_runs(runs(&view.feature), &view.profile);
            sections.extend(self.cluster(&title));
        }
        sections.sort_by(|a, b| a.top.total_cmp(&b.top));
        sections
    }

    /// Every feature run of the region clustered into blocks, whatever its
    /// size.
    pub fn feature_blocks(&self, region: &Region<'_>) -> Vec<Section> {
        let mut blocks = Vec::new();
        for filter in &self.filters {
            let Some(view) = TextView::of(region, *filter) else {
                continue;
            };
            blocks.extend(self.cluster(&runs(&view.feature)));
        }
        blocks.sort_by(|a, b| a.top.total_cmp(&b.top));
        link(blocks, region.bbox().bottom)
    }
}

fn link(mut sections: Vec<Section>, limit: f32) -> Vec<Section> {
    let tops: Vec<f32> = sections.iter().skip(1).map(|s| s.top).collect();
    for (i, section) in sections.iter_mut().enumerate() {
        section.next_top = tops.get(i).copied().unwrap_or(limit);
    }
    sections.retain(|s| s.span() > 0.0);
    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Page;

    fn run(text: &str, top: f32, size: f32) -> TextRun {
        TextRun {
            text: text.to_string(),
            x0: 50.0,
            x1: 200.0,
            top,
            bottom: top + size,
            fontname: "Arial-Bold".to_string(),
            size,
        }
    }

    fn glyphs(text: &str, x0: f32, top: f32, font: &str, size: f32) -> Vec<Glyph> {
        text.chars()
            .enumerate()
            .map(|(i, c)| {
                let x = x0 + i as f32 * size * 0.5;
                Glyph::new(c.to_string(), x, top, x + size * 0.5, top + size, font, size)
            })
            .collect()
    }

    #[test]
    fn test_runs_group_and_filter() {
        let mut all = glyphs("Audit", 50.0, 100.0, "Arial-Bold", 12.0);
        all.extend(glyphs("....", 200.0, 100.0, "Arial", 12.0));
        all.extend(glyphs("Fee", 50.0, 80.0, "Arial-Bold", 12.0));
        let refs: Vec<&Glyph> = all.iter().collect();
        let runs = runs(&refs);

        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].text, "Fee");
        assert_eq!(runs[1].text, "Audit");
        assert_eq!(runs[1].x1, 50.0 + 5.0 * 6.0);
    }

    #[test]
    fn test_gap_rule() {
        let runs = vec![
            run("Independent Auditor's Report", 100.0, 12.0),
            // gap 12 == size: same section
            run("To the shareholders", 124.0, 12.0),
            // gap 12.5 > size: new section
            run("Opinion", 148.5, 12.0),
        ];
        let sections = SectionAssembler::new().group(&runs, 842.0);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].text, "Independent Auditor's Report To the shareholders");
        assert_eq!(sections[0].bottom, 136.0);
        assert_eq!(sections[0].next_top, 148.5);
        assert_eq!(sections[1].next_top, 842.0);
    }

    #[test]
    fn test_bilingual_slack() {
        let runs = vec![run("Opinion", 100.0, 12.0), run("Basis", 124.5, 12.0)];
        assert_eq!(SectionAssembler::new().group(&runs, 842.0).len(), 2);
        assert_eq!(SectionAssembler::bilingual().group(&runs, 842.0).len(), 1);
    }

    #[test]
    fn test_zero_height_sections_are_dropped() {
        let runs = vec![run("A", 900.0, 12.0)];
        assert!(SectionAssembler::new().group(&runs, 842.0).is_empty());
    }

    #[test]
    fn test_assembly_is_idempotent() {
        let runs = vec![
            run("One", 100.0, 12.0),
            run("Two", 140.0, 12.0),
            run("Three", 152.0, 12.0),
        ];
        let assembler = SectionAssembler::new();
        assert_eq!(assembler.group(&runs, 842.0), assembler.group(&runs, 842.0));
    }

    #[test]
    fn test_title_runs_fall_back_to_body_size() {
        let profile = FontProfile {
            main_font: "Arial".to_string(),
            main_size: 10.0,
        };
        let bold = vec![run("Bold", 100.0, 10.0), run("Small", 120.0, 8.0)];
        let titles = title_runs(bold, &profile);
        assert_eq!(titles.len(), 1);
        assert_eq!(titles[0].text, "Bold");

        let mixed = vec![run("Big", 50.0, 14.0), run("Bold", 100.0, 10.0)];
        assert_eq!(title_runs(mixed, &profile)[0].text, "Big");
    }

    #[test]
    fn test_clustered_sections_keep_same_line_headings() {
        let mut all = glyphs("Opinion", 50.0, 200.0, "Arial-Bold", 12.0);
        all.extend(glyphs("意見", 320.0, 200.0, "MingLiU-Bold", 12.0));
        for row in 0..5 {
            let top = 220.0 + row as f32 * 12.0;
            all.extend(glyphs("body text here", 50.0, top, "Arial", 10.0));
            all.extend(glyphs("正文內容", 320.0, top, "MingLiU", 10.0));
        }
        let page = Page::a4(0).with_glyphs(all);
        let assembler = SectionAssembler::bilingual();

        let clustered = assembler.clustered_sections(&page.region());
        assert_eq!(clustered.len(), 2);
        let mut origins: Vec<f32> = clustered.iter().map(|s| s.x0).collect();
        origins.sort_by(f32::total_cmp);
        assert_eq!(origins, vec![50.0, 320.0]);

        // linking leaves one of the two same-line headings with no height
        assert_eq!(assembler.sections(&page.region()).len(), 1);
    }

    #[test]
    fn test_feature_blocks_include_body_size_emphasis() {
        let mut all = glyphs("Key Audit Matters", 50.0, 60.0, "Arial-Bold", 14.0);
        all.extend(glyphs("Impairment of goodwill", 50.0, 200.0, "Arial-Bold", 10.0));
        for row in 0..8 {
            all.extend(glyphs("body text here", 50.0, 90.0 + row as f32 * 12.0, "Arial", 10.0));
        }
        let page = Page::a4(0).with_glyphs(all);
        let assembler = SectionAssembler::new();

        let titles: Vec<String> = assembler.sections(&page.region()).into_iter().map(|s| s.text).collect();
        assert_eq!(titles, vec!["Key Audit Matters"]);

        let blocks = assembler.feature_blocks(&page.region());
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].text, "Impairment of goodwill");
        assert_eq!(blocks[1].next_top, 842.0);
    }

    #[test]
    fn test_sections_of_region() {
        let mut all = glyphs("Opinion", 50.0, 100.0, "Arial-Bold", 12.0);
        for row in 0..5 {
            all.extend(glyphs("body text here", 50.0, 120.0 + row as f32 * 12.0, "Arial", 10.0));
        }
        all.extend(glyphs("Key Audit Matters", 50.0, 300.0, "Arial-Bold", 12.0));
        let page = Page::a4(0).with_glyphs(all);
        let sections = SectionAssembler::new().sections(&page.region());

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].text, "Opinion");
        assert_eq!(sections[0].next_top, 300.0);
        assert_eq!(sections[1].text, "Key Audit Matters");
        assert_eq!(sections[1].next_top, 842.0);
    }
}
