//! Synthetic page builders shared by the integration tests.
#![allow(dead_code)]

use disclose::{Glyph, Page};

pub const BODY_FONT: &str = "Arial";
pub const TITLE_FONT: &str = "Arial-Bold";
pub const BODY: &str = "The quick brown fox jumps over the lazy dog";

/// One glyph per character, each `size / 2` wide, spaces included.
pub fn line(glyphs: &mut Vec<Glyph>, text: &str, x0: f32, top: f32, font: &str, size: f32) {
    for (i, c) in text.chars().enumerate() {
        let x = x0 + i as f32 * size * 0.5;
        glyphs.push(Glyph::new(c.to_string(), x, top, x + size * 0.5, top + size, font, size));
    }
}

/// Right-aligned body text ending at `x1`.
pub fn right(glyphs: &mut Vec<Glyph>, text: &str, x1: f32, top: f32) {
    let x0 = x1 - text.chars().count() as f32 * 5.0;
    line(glyphs, text, x0, top, BODY_FONT, 10.0);
}

/// `rows` lines of body text, 15pt apart.
pub fn body(glyphs: &mut Vec<Glyph>, x0: f32, from: f32, rows: usize) {
    for i in 0..rows {
        line(glyphs, BODY, x0, from + i as f32 * 15.0, BODY_FONT, 10.0);
    }
}

/// 14pt bold heading.
pub fn heading(glyphs: &mut Vec<Glyph>, text: &str, x0: f32, top: f32) {
    line(glyphs, text, x0, top, TITLE_FONT, 14.0);
}

/// A4 page with a heading at the top followed by body text.
pub fn titled_page(number: u32, title: &str) -> Page {
    let mut g = Vec::new();
    heading(&mut g, title, 50.0, 60.0);
    body(&mut g, 50.0, 100.0, 10);
    Page::a4(number).with_glyphs(g)
}

/// A4 page with body text only.
pub fn body_page(number: u32) -> Page {
    let mut g = Vec::new();
    body(&mut g, 50.0, 100.0, 10);
    Page::a4(number).with_glyphs(g)
}

/// Auditor's remuneration table rows starting at `top`: years, units, two
/// fee lines and an unlabelled subtotal.
pub fn fee_table(glyphs: &mut Vec<Glyph>, top: f32) {
    right(glyphs, "2023", 330.0, top);
    right(glyphs, "2022", 430.0, top);
    right(glyphs, "HKD'000", 330.0, top + 15.0);
    right(glyphs, "HKD'000", 430.0, top + 15.0);
    line(glyphs, "Audit services", 50.0, top + 30.0, BODY_FONT, 10.0);
    right(glyphs, "1,000", 330.0, top + 30.0);
    right(glyphs, "1,200", 430.0, top + 30.0);
    line(glyphs, "Non-audit services", 50.0, top + 45.0, BODY_FONT, 10.0);
    right(glyphs, "200", 330.0, top + 45.0);
    right(glyphs, "150", 430.0, top + 45.0);
    right(glyphs, "1,200", 330.0, top + 60.0);
    right(glyphs, "1,350", 430.0, top + 60.0);
}
