//! Label text font
//!
//! A TrueType font is embedded as a Type0 font with Identity-H encoding (two byte glyph ids),
//! which is what Cyrillic text needs. Without a usable font file the built-in Helvetica is
//! used instead, and characters outside WinAnsi print as `?`.
//!
//! The font program is embedded whole in every article PDF, so each PDF carries the full
//! size of `FONT_PATH` (several hundred KB for Arial) and an archive grows by that much per
//! article. A compact font keeps large supplies under the upload limit checked in
//! [`crate::labels::package::archive_within_limit`].

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use thiserror::Error;
use ttf_parser::{name_id, Face, GlyphId};

/// Average Helvetica advance, in 1/1000 em
const HELVETICA_ADVANCE: f32 = 556.0;

/// bfchar entries allowed per CMap block
const CMAP_CHUNK: usize = 100;

#[derive(Error, Debug)]
pub enum FontLoadError {
    #[error("cannot read font file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse font file: {0}")]
    Parse(String),
}

/// TrueType font data along with the metrics the PDF font descriptor needs.
#[derive(Debug, Clone)]
pub struct EmbeddedFont {
    data: Vec<u8>,
    name: String,
    units_per_em: f32,
    ascent: i64,
    descent: i64,
    bbox: [i64; 4],
}

#[derive(Debug, Clone)]
pub enum LabelFont {
    Embedded(EmbeddedFont),
    Helvetica,
}

impl LabelFont {
    pub fn load(path: &Path) -> Result<Self, FontLoadError> {
        let data = fs::read(path)?;
        let face = Face::parse(&data, 0).map_err(|e| FontLoadError::Parse(e.to_string()))?;

        let bbox = face.global_bounding_box();
        let units_per_em = f32::from(face.units_per_em());
        let scale = |v: i16| (f32::from(v) * 1000.0 / units_per_em).round() as i64;
        let name = postscript_name(&face).unwrap_or_else(|| "LabelFont".to_string());

        let font = EmbeddedFont {
            ascent: scale(face.ascender()),
            descent: scale(face.descender()),
            bbox: [scale(bbox.x_min), scale(bbox.y_min), scale(bbox.x_max), scale(bbox.y_max)],
            units_per_em,
            name,
            data,
        };
        Ok(LabelFont::Embedded(font))
    }

    /// Loads `path`, falling back to Helvetica with a warning.
    pub fn load_or_builtin(path: &Path) -> Self {
        match Self::load(path) {
            Ok(font) => {
                log::debug!("Using label font {}", path.display());
                font
            }
            Err(e) => {
                log::warn!("Label font {} unavailable ({}), falling back to Helvetica", path.display(), e);
                LabelFont::Helvetica
            }
        }
    }

    /// Text as a PDF string operand for `Tj`.
    pub fn encode(&self, text: &str) -> Object {
        match self {
            LabelFont::Embedded(font) => {
                let face = font.face();
                let bytes = text
                    .chars()
                    .flat_map(|c| glyph_id(face.as_ref(), c).to_be_bytes())
                    .collect();
                Object::String(bytes, StringFormat::Hexadecimal)
            }
            LabelFont::Helvetica => Object::String(text.chars().map(win_ansi_byte).collect(), StringFormat::Literal),
        }
    }

    /// Rendered width of `text` at `size` points.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let units: f32 = match self {
            LabelFont::Embedded(font) => {
                let face = font.face();
                text.chars().map(|c| font.advance(face.as_ref(), c)).sum()
            }
            LabelFont::Helvetica => text.chars().count() as f32 * HELVETICA_ADVANCE,
        };
        units * size / 1000.0
    }

    /// Adds the font dictionary (and for embedded fonts the font program) to `doc`.
    ///
    /// `used_text` is every string the document will show; it determines the width table
    /// and the ToUnicode map.
    pub fn add_to_document(&self, doc: &mut Document, used_text: &str) -> ObjectId {
        match self {
            LabelFont::Embedded(font) => font.add_to_document(doc, used_text),
            LabelFont::Helvetica => doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Helvetica",
                "Encoding" => "WinAnsiEncoding",
            }),
        }
    }
}

impl EmbeddedFont {
    fn face(&self) -> Option<Face<'_>> {
        Face::parse(&self.data, 0).ok()
    }

    /// Advance of `c` in 1/1000 em
    fn advance(&self, face: Option<&Face<'_>>, c: char) -> f32 {
        face.and_then(|face| face.glyph_index(c).and_then(|g| face.glyph_hor_advance(g)))
            .map(|advance| f32::from(advance) * 1000.0 / self.units_per_em)
            .unwrap_or(0.0)
    }

    fn add_to_document(&self, doc: &mut Document, used_text: &str) -> ObjectId {
        let face = self.face();

        let mut glyphs: BTreeMap<u16, (i64, char)> = BTreeMap::new();
        for c in used_text.chars() {
            let gid = glyph_id(face.as_ref(), c);
            glyphs
                .entry(gid)
                .or_insert_with(|| (self.advance(face.as_ref(), c).round() as i64, c));
        }

        let widths: Vec<Object> = glyphs
            .iter()
            .flat_map(|(&gid, &(width, _))| [Object::Integer(i64::from(gid)), Object::Array(vec![width.into()])])
            .collect();

        let font_name = Object::Name(self.name.clone().into_bytes());
        let font_file = doc.add_object(Stream::new(
            dictionary! { "Length1" => self.data.len() as i64 },
            self.data.clone(),
        ));
        let descriptor = doc.add_object(dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => font_name.clone(),
            "Flags" => 32,
            "FontBBox" => self.bbox.iter().map(|&v| Object::Integer(v)).collect::<Vec<_>>(),
            "ItalicAngle" => 0,
            "Ascent" => self.ascent,
            "Descent" => self.descent,
            "CapHeight" => self.ascent,
            "StemV" => 80,
            "FontFile2" => font_file,
        });
        let cid_font = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType2",
            "BaseFont" => font_name.clone(),
            "CIDSystemInfo" => dictionary! {
                "Registry" => Object::string_literal("Adobe"),
                "Ordering" => Object::string_literal("Identity"),
                "Supplement" => 0,
            },
            "FontDescriptor" => descriptor,
            "DW" => 1000,
            "W" => widths,
            "CIDToGIDMap" => "Identity",
        });
        let to_unicode = doc.add_object(Stream::new(dictionary! {}, to_unicode_cmap(&glyphs).into_bytes()));

        doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => font_name,
            "Encoding" => "Identity-H",
            "DescendantFonts" => vec![Object::Reference(cid_font)],
            "ToUnicode" => to_unicode,
        })
    }
}

fn postscript_name(face: &Face<'_>) -> Option<String> {
    face.names()
        .into_iter()
        .filter(|name| name.name_id == name_id::POST_SCRIPT_NAME)
        .find_map(|name| name.to_string())
        .map(|name| name.chars().filter(char::is_ascii_alphanumeric).collect::<String>())
        .filter(|name| !name.is_empty())
}

/// Glyph id for `c`, `.notdef` (0) when the font lacks it
fn glyph_id(face: Option<&Face<'_>>, c: char) -> u16 {
    face.and_then(|face| face.glyph_index(c))
        .map(|GlyphId(id)| id)
        .unwrap_or(0)
}

fn win_ansi_byte(c: char) -> u8 {
    match u32::from(c) {
        code @ (0x20..=0x7E | 0xA0..=0xFF) => code as u8,
        _ => b'?',
    }
}

fn to_unicode_cmap(glyphs: &BTreeMap<u16, (i64, char)>) -> String {
    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n12 dict begin\nbegincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n/CMapType 2 def\n\
         1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n",
    );

    let entries: Vec<(u16, char)> = glyphs.iter().map(|(&gid, &(_, c))| (gid, c)).collect();
    for chunk in entries.chunks(CMAP_CHUNK) {
        let _ = writeln!(cmap, "{} beginbfchar", chunk.len());
        for (gid, c) in chunk {
            let mut units = [0u16; 2];
            let utf16: String = c.encode_utf16(&mut units).iter().map(|u| format!("{:04X}", u)).collect();
            let _ = writeln!(cmap, "<{:04X}> <{}>", gid, utf16);
        }
        cmap.push_str("endbfchar\n");
    }

    cmap.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
    cmap
}
