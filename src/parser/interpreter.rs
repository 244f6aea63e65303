//! Content stream interpretation into positioned glyphs.
//!
//! Only the text operators are tracked. Glyph advances are estimated at
//! half an em because font metrics are not read; positions along a line
//! are therefore approximate, but lines, baselines, font names and sizes
//! are exact.

use std::collections::HashMap;

use super::backend::{ContentOp, PageId, PdfBackend, PdfValue};
use crate::model::Glyph;

/// Advance of one glyph, as a fraction of the font size.
const ADVANCE_EM: f32 = 0.5;

/// Baseline offset of a glyph's top edge, as a fraction of the font size.
const ASCENT_EM: f32 = 0.8;

/// Affine matrix `[a b c d e f]` as in the PDF text operators.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32, // X translation
    f: f32, // Y translation
}

impl Default for Matrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }
}

impl Matrix {
    fn from_operands(op: &ContentOp) -> Option<Self> {
        Some(Self {
            a: op.number(0)?,
            b: op.number(1)?,
            c: op.number(2)?,
            d: op.number(3)?,
            e: op.number(4)?,
            f: op.number(5)?,
        })
    }

    /// Translation by `(tx, ty)` in this matrix's space.
    fn translate(&self, tx: f32, ty: f32) -> Self {
        Self {
            e: self.e + tx * self.a + ty * self.c,
            f: self.f + tx * self.b + ty * self.d,
            ..*self
        }
    }

    fn scale(&self) -> f32 {
        (self.a * self.a + self.c * self.c).sqrt()
    }

    fn is_upright(&self) -> bool {
        self.b.abs() < f32::EPSILON && self.c.abs() < f32::EPSILON
    }
}

/// Text state between `BT` and `ET`.
#[derive(Debug, Clone)]
struct TextState {
    font_key: Vec<u8>,
    font_name: String,
    size: f32,
    char_spacing: f32,
    word_spacing: f32,
    horizontal_scale: f32,
    leading: f32,
    matrix: Matrix,
    line: Matrix,
    in_text: bool,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font_key: Vec::new(),
            font_name: String::new(),
            size: 12.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
            leading: 0.0,
            matrix: Matrix::default(),
            line: Matrix::default(),
            in_text: false,
        }
    }
}

impl TextState {
    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line = self.line.translate(tx, ty);
        self.matrix = self.line;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }
}

/// Turns the operations of one page into glyphs.
pub struct GlyphInterpreter<'a, B: PdfBackend + ?Sized> {
    backend: &'a B,
    page: PageId,
    page_height: f32,
    fonts: HashMap<Vec<u8>, String>,
}

impl<'a, B: PdfBackend + ?Sized> GlyphInterpreter<'a, B> {
    /// Create an interpreter for `page`, whose height flips the y-axis.
    pub fn new(backend: &'a B, page: PageId, page_height: f32) -> Self {
        let fonts = match backend.page_fonts(page) {
            Ok(fonts) => fonts.into_iter().map(|f| (f.name, f.base_font)).collect(),
            Err(e) => {
                log::debug!("No font dictionary for page {:?}: {}", page, e);
                HashMap::new()
            }
        };
        Self {
            backend,
            page,
            page_height,
            fonts,
        }
    }

    /// Glyphs of `ops`, in content-stream order. Spaces are emitted too.
    pub fn run(&self, ops: &[ContentOp]) -> Vec<Glyph> {
        let mut state = TextState::default();
        let mut glyphs = Vec::new();

        for op in ops {
            match op.operator.as_str() {
                "BT" => {
                    state.in_text = true;
                    state.matrix = Matrix::default();
                    state.line = Matrix::default();
                }
                "ET" => state.in_text = false,
                "Tf" => {
                    if let Some(PdfValue::Name(key)) = op.operands.first() {
                        state.font_name = self
                            .fonts
                            .get(key)
                            .cloned()
                            .unwrap_or_else(|| String::from_utf8_lossy(key).to_string());
                        state.font_key = key.clone();
                    }
                    state.size = op.number(1).unwrap_or(state.size);
                }
                "Td" => {
                    if let (Some(tx), Some(ty)) = (op.number(0), op.number(1)) {
                        state.move_line(tx, ty);
                    }
                }
                "TD" => {
                    if let (Some(tx), Some(ty)) = (op.number(0), op.number(1)) {
                        state.leading = -ty;
                        state.move_line(tx, ty);
                    }
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_operands(op) {
                        state.matrix = m;
                        state.line = m;
                    }
                }
                "T*" => state.next_line(),
                "TL" => state.leading = op.number(0).unwrap_or(state.leading),
                "Tc" => state.char_spacing = op.number(0).unwrap_or(state.char_spacing),
                "Tw" => state.word_spacing = op.number(0).unwrap_or(state.word_spacing),
                "Tz" => {
                    state.horizontal_scale = op.number(0).map_or(state.horizontal_scale, |s| s / 100.0)
                }
                "Tj" => {
                    if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                        self.show(&mut state, bytes, &mut glyphs);
                    }
                }
                "TJ" => {
                    if let Some(PdfValue::Array(items)) = op.operands.first() {
                        for item in items {
                            match item {
                                PdfValue::Str(bytes) => self.show(&mut state, bytes, &mut glyphs),
                                other => {
                                    if let Some(n) = other.as_number() {
                                        let tx = -n / 1000.0 * state.size * state.horizontal_scale;
                                        state.matrix = state.matrix.translate(tx, 0.0);
                                    }
                                }
                            }
                        }
                    }
                }
                "'" => {
                    state.next_line();
                    if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                        self.show(&mut state, bytes, &mut glyphs);
                    }
                }
                "\"" => {
                    state.word_spacing = op.number(0).unwrap_or(state.word_spacing);
                    state.char_spacing = op.number(1).unwrap_or(state.char_spacing);
                    state.next_line();
                    if let Some(PdfValue::Str(bytes)) = op.operands.get(2) {
                        self.show(&mut state, bytes, &mut glyphs);
                    }
                }
                _ => {}
            }
        }

        glyphs
    }

    fn show(&self, state: &mut TextState, bytes: &[u8], glyphs: &mut Vec<Glyph>) {
        if !state.in_text {
            return;
        }
        let text = self.backend.decode_text(self.page, &state.font_key, bytes);

        for c in text.chars() {
            let size = state.size * state.matrix.scale();
            let width = ADVANCE_EM * size * state.horizontal_scale;
            let (x, y) = (state.matrix.e, state.matrix.f);
            let top = self.page_height - (y + ASCENT_EM * size);

            let glyph = Glyph::new(c.to_string(), x, top, x + width, top + size, state.font_name.clone(), size);
            glyphs.push(if state.matrix.is_upright() {
                glyph
            } else {
                glyph.rotated()
            });

            let spacing = if c == ' ' {
                state.char_spacing + state.word_spacing
            } else {
                state.char_spacing
            };
            let advance = (ADVANCE_EM * state.size + spacing) * state.horizontal_scale;
            state.matrix = state.matrix.translate(advance, 0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::model::Bookmark;
    use crate::parser::backend::{decode_text_simple, BackendFontInfo};
    use std::collections::BTreeMap;

    /// Backend with one page and a single font `F1` = Helvetica-Bold.
    struct FakeBackend;

    impl PdfBackend for FakeBackend {
        fn pages(&self) -> BTreeMap<u32, PageId> {
            BTreeMap::from([(1, (1, 0))])
        }

        fn page_size(&self, _page: PageId) -> Option<(f32, f32)> {
            Some((600.0, 800.0))
        }

        fn page_fonts(&self, _page: PageId) -> Result<Vec<BackendFontInfo>> {
            Ok(vec![BackendFontInfo {
                name: b"F1".to_vec(),
                base_font: "Helvetica-Bold".to_string(),
            }])
        }

        fn page_content(&self, _page: PageId) -> Result<Vec<u8>> {
            Ok(Vec::new())
        }

        fn decode_content(&self, _data: &[u8]) -> Result<Vec<ContentOp>> {
            Ok(Vec::new())
        }

        fn decode_text(&self, _page: PageId, _font: &[u8], bytes: &[u8]) -> String {
            decode_text_simple(bytes)
        }

        fn bookmarks(&self) -> Vec<Bookmark> {
            Vec::new()
        }
    }

    fn num(n: f32) -> PdfValue {
        PdfValue::Real(n)
    }

    fn text(s: &str) -> PdfValue {
        PdfValue::Str(s.as_bytes().to_vec())
    }

    fn op(operator: &str, operands: Vec<PdfValue>) -> ContentOp {
        ContentOp::new(operator, operands)
    }

    #[test]
    fn test_glyph_geometry() {
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![PdfValue::Name(b"F1".to_vec()), num(10.0)]),
            op("Td", vec![num(72.0), num(700.0)]),
            op("Tj", vec![text("Hi")]),
            op("ET", vec![]),
        ];
        let glyphs = GlyphInterpreter::new(&FakeBackend, (1, 0), 800.0).run(&ops);

        assert_eq!(glyphs.len(), 2);
        let h = &glyphs[0];
        assert_eq!(h.text, "H");
        assert_eq!(h.fontname, "Helvetica-Bold");
        assert_eq!(h.x0, 72.0);
        assert_eq!(h.x1, 77.0);
        assert_eq!(h.top, 92.0);
        assert_eq!(h.bottom, 102.0);
        assert!(h.upright);
        assert_eq!(glyphs[1].x0, 77.0);
    }

    #[test]
    fn test_leading_and_next_line() {
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![PdfValue::Name(b"F1".to_vec()), num(10.0)]),
            op("TL", vec![num(14.0)]),
            op("Td", vec![num(50.0), num(700.0)]),
            op("Tj", vec![text("A")]),
            op("'", vec![text("B")]),
            op("ET", vec![]),
        ];
        let glyphs = GlyphInterpreter::new(&FakeBackend, (1, 0), 800.0).run(&ops);

        assert_eq!(glyphs[1].x0, 50.0);
        assert_eq!(glyphs[1].top - glyphs[0].top, 14.0);
    }

    #[test]
    fn test_tj_adjustment_and_rotation() {
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![PdfValue::Name(b"F9".to_vec()), num(10.0)]),
            op("Tm", vec![num(0.0), num(1.0), num(-1.0), num(0.0), num(100.0), num(100.0)]),
            op("TJ", vec![PdfValue::Array(vec![text("A"), PdfValue::Integer(-1000), text("B")])]),
            op("ET", vec![]),
        ];
        let glyphs = GlyphInterpreter::new(&FakeBackend, (1, 0), 800.0).run(&ops);

        assert_eq!(glyphs.len(), 2);
        assert!(!glyphs[0].upright);
        assert_eq!(glyphs[0].fontname, "F9");
    }

    #[test]
    fn test_text_outside_block_ignored() {
        let ops = vec![op("Tj", vec![text("lost")])];
        assert!(GlyphInterpreter::new(&FakeBackend, (1, 0), 800.0).run(&ops).is_empty());
    }
}
