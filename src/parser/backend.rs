//! PDF backend abstraction layer.
//!
//! Provides a trait-based interface for PDF operations, isolating
//! the concrete PDF library (lopdf) from glyph interpretation.

use std::collections::{BTreeMap, HashSet};

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};
use crate::model::Bookmark;

/// Page identifier: (object number, generation number).
pub type PageId = (u32, u16);

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Upper bound on outline items visited, guards against cyclic trees.
const MAX_OUTLINE_ITEMS: usize = 10_000;

/// Font information returned by the backend.
#[derive(Debug, Clone)]
pub struct BackendFontInfo {
    /// Font resource name (key in the page's font dictionary).
    pub name: Vec<u8>,
    /// Base font name (e.g., "Helvetica-Bold").
    pub base_font: String,
}

/// A value from a PDF content stream operand.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Other,
}

impl PdfValue {
    /// Numeric value of an integer or real operand.
    pub fn as_number(&self) -> Option<f32> {
        match self {
            PdfValue::Integer(i) => Some(*i as f32),
            PdfValue::Real(r) => Some(*r),
            _ => None,
        }
    }
}

/// A single operation from a PDF content stream.
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl ContentOp {
    /// Create an operation.
    pub fn new(operator: impl Into<String>, operands: Vec<PdfValue>) -> Self {
        Self {
            operator: operator.into(),
            operands,
        }
    }

    /// Numeric operand at `index`.
    pub fn number(&self, index: usize) -> Option<f32> {
        self.operands.get(index).and_then(PdfValue::as_number)
    }
}

/// Abstract interface for PDF document access.
///
/// Implementations provide page enumeration, page geometry, font info,
/// content stream decoding, text decoding and the bookmark tree, without
/// exposing any concrete PDF library types.
pub trait PdfBackend {
    /// Return all pages as (1-based page number → PageId).
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// Width and height of a page's media box.
    fn page_size(&self, page: PageId) -> Option<(f32, f32)>;

    /// Return font info for a given page.
    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>>;

    /// Return the raw (decompressed) content stream bytes for a page.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>>;

    /// Parse raw content stream bytes into a sequence of operations.
    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>>;

    /// Decode a text byte sequence using the font's encoding on the given page.
    /// Falls back to simple decoding if the font or encoding is unavailable.
    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String;

    /// Bookmark tree flattened depth-first, with 0-based target pages.
    fn bookmarks(&self) -> Vec<Bookmark>;
}

/// Check that `data` starts with a PDF header.
pub fn check_header(data: &[u8]) -> Result<()> {
    if data.starts_with(PDF_MAGIC) {
        Ok(())
    } else {
        Err(Error::UnknownFormat)
    }
}

/// Simple text decoding fallback when no encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks(2)
            .filter_map(|c| {
                if c.len() == 2 {
                    Some(u16::from_be_bytes([c[0], c[1]]))
                } else {
                    None
                }
            })
            .collect();
        return String::from_utf16(&utf16).unwrap_or_default();
    }

    if let Ok(s) = String::from_utf8(bytes.to_vec()) {
        return s;
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

// ---------------------------------------------------------------------------
// LopdfBackend: the lopdf implementation
// ---------------------------------------------------------------------------

/// Concrete [`PdfBackend`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
}

impl LopdfBackend {
    /// Load from a file path.
    pub fn load_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::load_bytes(&data)
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        check_header(data)?;
        let doc = LopdfDocument::load_mem(data)?;
        Ok(Self { doc })
    }

    /// Direct access to the underlying `lopdf::Document`.
    pub fn raw_doc(&self) -> &LopdfDocument {
        &self.doc
    }

    /// Check if the document is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.doc.is_encrypted()
    }

    /// Get PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    /// Follow a reference, or return the object itself.
    fn resolve<'a>(&'a self, obj: &'a Object) -> Option<&'a Object> {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).ok(),
            other => Some(other),
        }
    }

    fn dictionary<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        self.resolve(obj)?.as_dict().ok()
    }

    /// Media box of a page, inherited from the page tree when absent.
    fn media_box(&self, page: PageId) -> Option<Vec<f32>> {
        let mut dict = self.doc.get_dictionary(page).ok()?;
        for _ in 0..32 {
            if let Some(array) = dict
                .get(b"MediaBox")
                .ok()
                .and_then(|o| self.resolve(o))
                .and_then(|o| o.as_array().ok())
            {
                return Some(array.iter().filter_map(|o| o.as_float().ok()).collect());
            }
            dict = self.dictionary(dict.get(b"Parent").ok()?)?;
        }
        None
    }

    /// Target page of an outline item, 0-based.
    fn destination(&self, item: &Dictionary, pages: &BTreeMap<PageId, u32>) -> Option<u32> {
        let dest = match item.get(b"Dest") {
            Ok(dest) => dest,
            Err(_) => {
                let action = self.dictionary(item.get(b"A").ok()?)?;
                action.get(b"D").ok()?
            }
        };
        self.resolve_destination(dest, pages)
    }

    fn resolve_destination(&self, dest: &Object, pages: &BTreeMap<PageId, u32>) -> Option<u32> {
        let dest = self.resolve(dest)?;
        let array = match dest {
            Object::Array(array) => array,
            // Named destination through the catalog's /Dests dictionary
            Object::Name(name) | Object::String(name, _) => {
                let dests = self.dictionary(self.doc.catalog().ok()?.get(b"Dests").ok()?)?;
                let target = self.resolve(dests.get(name).ok()?)?;
                match target {
                    Object::Array(array) => array,
                    Object::Dictionary(d) => self.resolve(d.get(b"D").ok()?)?.as_array().ok()?,
                    _ => return None,
                }
            }
            _ => return None,
        };
        let page_ref = array.first()?.as_reference().ok()?;
        pages.get(&page_ref).map(|n| n.saturating_sub(1))
    }

    fn collect_outline(&self, first: ObjectId, pages: &BTreeMap<PageId, u32>, out: &mut Vec<Bookmark>) {
        let mut visited = HashSet::new();
        let mut stack = vec![first];

        while let Some(id) = stack.pop() {
            if !visited.insert(id) || visited.len() > MAX_OUTLINE_ITEMS {
                continue;
            }
            let Ok(item) = self.doc.get_dictionary(id) else {
                continue;
            };

            let title = item
                .get(b"Title")
                .ok()
                .and_then(|o| self.resolve(o))
                .and_then(|o| match o {
                    Object::String(bytes, _) => Some(decode_text_simple(bytes)),
                    _ => None,
                })
                .unwrap_or_default();
            out.push(Bookmark::new(title, self.destination(item, pages)));

            // Sibling below the first child so children come first.
            if let Ok(next) = item.get(b"Next").and_then(Object::as_reference) {
                stack.push(next);
            }
            if let Ok(child) = item.get(b"First").and_then(Object::as_reference) {
                stack.push(child);
            }
        }
    }
}

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_size(&self, page: PageId) -> Option<(f32, f32)> {
        match self.media_box(page)?.as_slice() {
            [x0, y0, x1, y1, ..] => Some(((x1 - x0).abs(), (y1 - y0).abs())),
            _ => None,
        }
    }

    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>> {
        let lopdf_fonts = self
            .doc
            .get_page_fonts(page)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let mut result = Vec::with_capacity(lopdf_fonts.len());
        for (name, font_dict) in &lopdf_fonts {
            let base_font = font_dict
                .get(b"BaseFont")
                .ok()
                .and_then(|o| o.as_name().ok())
                .map(|n| String::from_utf8_lossy(n).to_string())
                .unwrap_or_else(|| "Unknown".to_string());
            result.push(BackendFontInfo {
                name: name.clone(),
                base_font,
            });
        }
        Ok(result)
    }

    fn page_content(&self, page_id: PageId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        // Blank pages carry no content stream.
        let Ok(contents) = page_dict.get(b"Contents") else {
            return Ok(Vec::new());
        };

        match contents {
            Object::Reference(r) => match self.doc.get_object(*r) {
                Ok(Object::Stream(s)) => Ok(s.decompressed_content().unwrap_or_else(|_| s.content.clone())),
                _ => Err(Error::PdfParse("Invalid content stream".to_string())),
            },
            Object::Array(arr) => {
                let mut content = Vec::new();
                for obj in arr {
                    if let Object::Reference(r) = obj {
                        if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                            let data = s.decompressed_content().unwrap_or_else(|_| s.content.clone());
                            content.extend_from_slice(&data);
                            content.push(b' ');
                        }
                    }
                }
                Ok(content)
            }
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>> {
        let content =
            lopdf::content::Content::decode(data).map_err(|e| Error::GlyphExtract(e.to_string()))?;

        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operator: op.operator,
                operands: op.operands.iter().map(convert_object).collect(),
            })
            .collect())
    }

    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String {
        if let Ok(lopdf_fonts) = self.doc.get_page_fonts(page) {
            if let Some(font_dict) = lopdf_fonts.get(font_name) {
                if let Ok(enc) = font_dict.get_font_encoding(&self.doc) {
                    if let Ok(text) = LopdfDocument::decode_text(&enc, bytes) {
                        return text;
                    }
                }
            }
        }
        decode_text_simple(bytes)
    }

    fn bookmarks(&self) -> Vec<Bookmark> {
        let first = self
            .doc
            .catalog()
            .ok()
            .and_then(|catalog| catalog.get(b"Outlines").ok())
            .and_then(|o| self.dictionary(o))
            .and_then(|outlines| outlines.get(b"First").ok())
            .and_then(|o| o.as_reference().ok());
        let Some(first) = first else {
            return Vec::new();
        };

        let pages: BTreeMap<PageId, u32> = self.doc.get_pages().into_iter().map(|(n, id)| (id, n)).collect();
        let mut bookmarks = Vec::new();
        self.collect_outline(first, &pages, &mut bookmarks);
        bookmarks
    }
}

/// Convert a `lopdf::Object` to [`PdfValue`].
fn convert_object(obj: &Object) -> PdfValue {
    match obj {
        Object::Integer(i) => PdfValue::Integer(*i),
        Object::Real(r) => PdfValue::Real(*r),
        Object::Name(n) => PdfValue::Name(n.clone()),
        Object::String(b, _) => PdfValue::Str(b.clone()),
        Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        _ => PdfValue::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_text_simple_utf8() {
        assert_eq!(decode_text_simple(b"Hello"), "Hello");
    }

    #[test]
    fn test_decode_text_simple_latin1() {
        // 0xE9 = 'é' in Latin-1
        let bytes = vec![0x48, 0x65, 0x6C, 0x6C, 0xE9];
        assert_eq!(decode_text_simple(&bytes), "Hellé");
    }

    #[test]
    fn test_decode_text_simple_utf16be() {
        let bytes = vec![0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69];
        assert_eq!(decode_text_simple(&bytes), "Hi");
    }

    #[test]
    fn test_operand_numbers() {
        let op = ContentOp::new("Td", vec![PdfValue::Integer(42), PdfValue::Real(3.5), PdfValue::Other]);
        assert_eq!(op.number(0), Some(42.0));
        assert_eq!(op.number(1), Some(3.5));
        assert_eq!(op.number(2), None);
        assert_eq!(op.number(3), None);
    }

    #[test]
    fn test_check_header() {
        assert!(check_header(b"%PDF-1.7\n").is_ok());
        assert!(matches!(check_header(b"PK\x03\x04"), Err(Error::UnknownFormat)));
    }
}
