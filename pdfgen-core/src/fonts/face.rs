use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use ttf_parser::Face;

use crate::error::{PdfError, Result};
use crate::text::StandardFont;

/// Glyph id and horizontal advance (font units) of a mapped character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub id: u16,
    pub advance: u16,
}

/// A parsed TrueType/OpenType face with its character map resolved up front.
pub struct EmbeddedFace {
    postscript_name: String,
    data: Arc<[u8]>,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
    cap_height: i16,
    bbox: [i16; 4],
    is_cff: bool,
    notdef_advance: u16,
    glyphs: HashMap<char, Glyph>,
}

impl EmbeddedFace {
    pub fn parse(data: Arc<[u8]>) -> Result<Self> {
        let face = Face::parse(&data, 0)
            .map_err(|e| PdfError::FontError(format!("Failed to parse font: {e}")))?;

        let units_per_em = face.units_per_em();
        if units_per_em == 0 {
            return Err(PdfError::FontError("Font has zero units per em".to_string()));
        }

        let mut glyphs = HashMap::new();
        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables {
                if !subtable.is_unicode() {
                    continue;
                }
                subtable.codepoints(|code_point| {
                    let Some(ch) = char::from_u32(code_point) else {
                        return;
                    };
                    if let Some(id) = subtable.glyph_index(code_point) {
                        let advance = face.glyph_hor_advance(id).unwrap_or(0);
                        glyphs.entry(ch).or_insert(Glyph { id: id.0, advance });
                    }
                });
            }
        }

        let postscript_name = face
            .names()
            .into_iter()
            .filter(|name| name.name_id == ttf_parser::name_id::POST_SCRIPT_NAME)
            .find_map(|name| name.to_string())
            .map(|name| name.chars().filter(|c| c.is_ascii_graphic()).collect::<String>())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "EmbeddedFont".to_string());

        let bbox = face.global_bounding_box();
        let ascender = face.ascender();
        let descender = face.descender();
        let cap_height = face.capital_height().unwrap_or(ascender);
        let is_cff = face.tables().cff.is_some();
        let notdef_advance = face.glyph_hor_advance(ttf_parser::GlyphId(0)).unwrap_or(0);

        Ok(Self {
            postscript_name,
            data,
            units_per_em,
            ascender,
            descender,
            cap_height,
            bbox: [bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max],
            is_cff,
            notdef_advance,
            glyphs,
        })
    }

    pub fn postscript_name(&self) -> &str {
        &self.postscript_name
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// CFF outlines (`.otf`) rather than TrueType `glyf` outlines.
    pub fn is_cff(&self) -> bool {
        self.is_cff
    }

    /// Glyph for `ch`, or `.notdef` when the face has no mapping.
    pub fn glyph(&self, ch: char) -> Glyph {
        self.glyphs.get(&ch).copied().unwrap_or(Glyph {
            id: 0,
            advance: self.notdef_advance,
        })
    }

    pub fn has_glyph(&self, ch: char) -> bool {
        self.glyphs.contains_key(&ch)
    }

    /// Converts font units into 1/1000 text space units.
    pub fn to_pdf_units(&self, value: f64) -> f64 {
        value * 1000.0 / f64::from(self.units_per_em)
    }

    pub fn ascent(&self) -> f64 {
        self.to_pdf_units(f64::from(self.ascender))
    }

    pub fn descent(&self) -> f64 {
        self.to_pdf_units(f64::from(self.descender))
    }

    pub fn cap_height(&self) -> f64 {
        self.to_pdf_units(f64::from(self.cap_height))
    }

    pub fn bbox(&self) -> [f64; 4] {
        self.bbox.map(|v| self.to_pdf_units(f64::from(v)))
    }

    pub fn measure(&self, text: &str, font_size: f64) -> f64 {
        let units: u32 = text
            .chars()
            .map(|ch| u32::from(self.glyph(ch).advance))
            .sum();
        self.to_pdf_units(f64::from(units)) / 1000.0 * font_size
    }
}

impl fmt::Debug for EmbeddedFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddedFace")
            .field("postscript_name", &self.postscript_name)
            .field("units_per_em", &self.units_per_em)
            .field("glyphs", &self.glyphs.len())
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// The face used to measure and draw a font key.
#[derive(Debug, Clone)]
pub enum FontFace {
    Embedded(Arc<EmbeddedFace>),
    Standard(StandardFont),
}

impl FontFace {
    pub fn measure(&self, text: &str, font_size: f64) -> f64 {
        match self {
            FontFace::Embedded(face) => face.measure(text, font_size),
            FontFace::Standard(font) => font.measure(text, font_size),
        }
    }

    /// Ascender in 1/1000 units, used to place the first baseline.
    pub fn ascent(&self) -> f64 {
        match self {
            FontFace::Embedded(face) => face.ascent(),
            FontFace::Standard(font) => font.ascent(),
        }
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self, FontFace::Embedded(_))
    }

    /// Same underlying face, compared by identity for embedded fonts.
    pub fn same_face(&self, other: &FontFace) -> bool {
        match (self, other) {
            (FontFace::Embedded(a), FontFace::Embedded(b)) => Arc::ptr_eq(a, b),
            (FontFace::Standard(a), FontFace::Standard(b)) => a == b,
            _ => false,
        }
    }
}
