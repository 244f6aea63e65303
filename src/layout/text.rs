//! Line reconstruction from loose glyphs.

use super::LanguageFilter;
use crate::model::{Glyph, Region};
use unicode_normalization::UnicodeNormalization;

/// Default vertical tolerance, as a fraction of the glyph size, when
/// grouping glyphs into lines.
pub const LINE_TOLERANCE: f32 = 0.3;

/// A visual line: glyphs sharing a baseline, sorted left to right.
#[derive(Debug, Clone)]
pub struct TextLine<'a> {
    /// The glyphs in this line, sorted by X position
    pub glyphs: Vec<&'a Glyph>,
    /// Top edge of the first glyph that opened the line
    pub top: f32,
}

impl<'a> TextLine<'a> {
    fn from_glyphs(mut glyphs: Vec<&'a Glyph>) -> Self {
        glyphs.sort_by(|a, b| a.x0.total_cmp(&b.x0));
        let top = glyphs.iter().map(|g| g.top).fold(f32::INFINITY, f32::min);
        Self { glyphs, top }
    }

    /// Leftmost X position.
    pub fn x0(&self) -> f32 {
        self.glyphs.first().map(|g| g.x0).unwrap_or(0.0)
    }

    /// Rightmost X position.
    pub fn x1(&self) -> f32 {
        self.glyphs.iter().map(|g| g.x1).fold(0.0, f32::max)
    }

    /// Largest glyph size in the line.
    pub fn size(&self) -> f32 {
        self.glyphs.iter().map(|g| g.size).fold(0.0, f32::max)
    }

    /// Get the combined text with spaces inferred from horizontal gaps.
    pub fn text(&self) -> String {
        join_glyphs(&self.glyphs)
    }
}

/// Group glyphs into lines, top to bottom.
///
/// A glyph joins the current line when its top lies within
/// `tolerance * size` of the line's top.
pub fn group_lines<'a>(glyphs: impl IntoIterator<Item = &'a Glyph>, tolerance: f32) -> Vec<TextLine<'a>> {
    let mut glyphs: Vec<&Glyph> = glyphs.into_iter().collect();
    if glyphs.is_empty() {
        return vec![];
    }

    glyphs.sort_by(|a, b| a.top.total_cmp(&b.top).then(a.x0.total_cmp(&b.x0)));

    let mut lines = Vec::new();
    let mut current: Vec<&Glyph> = Vec::new();
    let mut current_top: Option<f32> = None;

    for glyph in glyphs {
        let y_tolerance = glyph.size.max(1.0) * tolerance;
        match current_top {
            Some(top) if (glyph.top - top).abs() <= y_tolerance => current.push(glyph),
            _ => {
                if !current.is_empty() {
                    lines.push(TextLine::from_glyphs(std::mem::take(&mut current)));
                }
                current_top = Some(glyph.top);
                current.push(glyph);
            }
        }
    }

    if !current.is_empty() {
        lines.push(TextLine::from_glyphs(current));
    }

    lines
}

/// Concatenate glyphs already in reading order.
///
/// A space is inserted where the horizontal gap exceeds a fifth of the
/// previous glyph's width, except between two spaceless-script characters
/// or next to existing whitespace. The result is NFKC-normalized so that
/// ligature glyphs (`ﬁ`, `ﬂ`) read as plain letters.
pub fn join_glyphs(glyphs: &[&Glyph]) -> String {
    let mut result = String::new();

    for (i, glyph) in glyphs.iter().enumerate() {
        if i > 0 {
            let prev = glyphs[i - 1];
            let gap = glyph.x0 - prev.x1;

            let char_width = if prev.x1 > prev.x0 {
                (prev.x1 - prev.x0) / prev.text.chars().count().max(1) as f32
            } else {
                prev.size * 0.5
            };

            let prev_is_cjk = prev.text.chars().last().is_some_and(is_spaceless_script_char);
            let curr_is_cjk = glyph.text.chars().next().is_some_and(is_spaceless_script_char);
            let has_space = prev.text.ends_with(char::is_whitespace)
                || glyph.text.starts_with(char::is_whitespace);

            if gap > char_width * 0.2 && !(prev_is_cjk && curr_is_cjk) && !has_space {
                result.push(' ');
            }
        }
        result.push_str(&glyph.text);
    }

    result.nfkc().collect()
}

/// Reconstructed text of a region: one line per visual line.
pub(crate) fn region_text(region: &Region<'_>, filter: LanguageFilter) -> String {
    group_lines(region.glyphs().filter(|g| filter.accepts(g)), LINE_TOLERANCE)
        .iter()
        .map(|line| line.text().trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check if character is from a script that doesn't use word spaces.
/// Chinese and Japanese don't use spaces between words, but Korean does.
pub(crate) fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs
    (0x4E00..=0x9FFF).contains(&code)
    // Extension A
    || (0x3400..=0x4DBF).contains(&code)
    // Extensions B-F
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana, Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
    // Fullwidth forms
    || (0xFF00..=0xFFEF).contains(&code)
}
