//! Per-document font resources
//!
//! Embedded faces are written as Type0 composite fonts with `Identity-H`
//! encoding. The font program is subset to the glyphs the document uses and
//! glyph ids are renumbered densely; the content stream then shows 2-byte CIDs.
//! Standard faces are written as simple Type1 fonts with WinAnsiEncoding.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Write;
use std::sync::Arc;

use crate::error::Result;
use crate::fonts::{EmbeddedFace, FontFace};
use crate::objects::{Dictionary, Object, ObjectId, Stream};
use crate::text::{encode_win_ansi, StandardFont};

/// Text encoded for a `Tj` operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedText {
    /// Single-byte WinAnsi string, written as a literal.
    Literal(Vec<u8>),
    /// Big-endian 2-byte CIDs, written as a hex string.
    Hex(Vec<u8>),
}

/// A font as used by one document.
#[derive(Debug)]
pub enum FontResource {
    Standard(StandardFont),
    Embedded(EmbeddedFont),
}

impl FontResource {
    /// Prepares `face` for the characters in `used`.
    pub fn prepare(face: &FontFace, used: &BTreeSet<char>) -> Self {
        match face {
            FontFace::Standard(font) => FontResource::Standard(*font),
            FontFace::Embedded(face) => FontResource::Embedded(EmbeddedFont::new(face, used)),
        }
    }

    pub fn encode(&self, text: &str) -> EncodedText {
        match self {
            FontResource::Standard(_) => EncodedText::Literal(encode_win_ansi(text)),
            FontResource::Embedded(font) => EncodedText::Hex(font.encode(text)),
        }
    }

    /// Builds the font objects. `font_id` is the object referenced from page
    /// resources; further ids come from `alloc`.
    pub fn to_objects(
        &self,
        font_id: ObjectId,
        compress: bool,
        alloc: &mut dyn FnMut() -> ObjectId,
    ) -> Result<Vec<(ObjectId, Object)>> {
        match self {
            FontResource::Standard(font) => {
                let mut dict = Dictionary::typed("Font");
                dict.set("Subtype", Object::name("Type1"));
                dict.set("BaseFont", Object::name(font.base_font()));
                dict.set("Encoding", Object::name("WinAnsiEncoding"));
                Ok(vec![(font_id, dict.into())])
            }
            FontResource::Embedded(font) => font.to_objects(font_id, compress, alloc),
        }
    }
}

/// An embedded face prepared for one document.
pub struct EmbeddedFont {
    face: Arc<EmbeddedFace>,
    char_to_cid: HashMap<char, u16>,
    cid_widths: BTreeMap<u16, u16>,
    cid_to_char: BTreeMap<u16, char>,
    program: Vec<u8>,
    subset_tag: Option<String>,
}

impl std::fmt::Debug for EmbeddedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddedFont")
            .field("face", &self.face.postscript_name())
            .field("glyphs", &self.cid_widths.len())
            .field("program_bytes", &self.program.len())
            .field("subset_tag", &self.subset_tag)
            .finish()
    }
}

impl EmbeddedFont {
    fn new(face: &Arc<EmbeddedFace>, used: &BTreeSet<char>) -> Self {
        let mut remapper = subsetter::GlyphRemapper::new();
        remapper.remap(0);

        // (char, original glyph, remapped glyph)
        let glyphs: Vec<(char, u16, u16)> = used
            .iter()
            .map(|&ch| {
                let glyph = face.glyph(ch);
                (ch, glyph.id, remapper.remap(glyph.id))
            })
            .collect();

        let (program, subset) = match subsetter::subset(face.data(), 0, &remapper) {
            Ok(program) => (program, true),
            Err(e) => {
                tracing::warn!(
                    font = face.postscript_name(),
                    error = ?e,
                    "Font subsetting failed, embedding full font"
                );
                (face.data().to_vec(), false)
            }
        };

        let mut char_to_cid = HashMap::new();
        let mut cid_widths = BTreeMap::new();
        let mut cid_to_char = BTreeMap::new();
        for (ch, original, remapped) in glyphs {
            let cid = if subset { remapped } else { original };
            let advance = face.glyph(ch).advance;
            char_to_cid.insert(ch, cid);
            cid_widths.insert(cid, face.to_pdf_units(f64::from(advance)).round() as u16);
            if original != 0 {
                cid_to_char.entry(cid).or_insert(ch);
            }
        }

        let subset_tag = subset.then(|| subset_tag(face.postscript_name(), used));

        Self {
            face: Arc::clone(face),
            char_to_cid,
            cid_widths,
            cid_to_char,
            program,
            subset_tag,
        }
    }

    /// `BaseFont` name, prefixed with the subset tag when subset.
    pub fn base_font(&self) -> String {
        match &self.subset_tag {
            Some(tag) => format!("{tag}+{}", self.face.postscript_name()),
            None => self.face.postscript_name().to_string(),
        }
    }

    pub fn is_subset(&self) -> bool {
        self.subset_tag.is_some()
    }

    /// Ascender in 1/1000 units.
    pub fn ascent(&self) -> f64 {
        self.face.ascent()
    }

    pub fn program(&self) -> &[u8] {
        &self.program
    }

    /// 2-byte big-endian CIDs for `text`. Characters outside the prepared set
    /// map to CID 0 (`.notdef`).
    pub fn encode(&self, text: &str) -> Vec<u8> {
        text.chars()
            .flat_map(|ch| {
                self.char_to_cid
                    .get(&ch)
                    .copied()
                    .unwrap_or(0)
                    .to_be_bytes()
            })
            .collect()
    }

    fn widths_array(&self) -> Vec<Object> {
        let mut array = Vec::with_capacity(self.cid_widths.len() * 2);
        for (&cid, &width) in &self.cid_widths {
            array.push(Object::from(u32::from(cid)));
            array.push(Object::Array(vec![Object::from(u32::from(width))]));
        }
        array
    }

    /// ToUnicode CMap mapping each CID back to its character.
    pub fn to_unicode_cmap(&self) -> Vec<u8> {
        let mut cmap = String::new();
        cmap.push_str("/CIDInit /ProcSet findresource begin\n");
        cmap.push_str("12 dict begin\n");
        cmap.push_str("begincmap\n");
        cmap.push_str("/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
        cmap.push_str("/CMapName /Adobe-Identity-UCS def\n");
        cmap.push_str("/CMapType 2 def\n");
        cmap.push_str("1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n");

        let entries: Vec<(&u16, &char)> = self.cid_to_char.iter().collect();
        // At most 100 entries per bfchar block.
        for chunk in entries.chunks(100) {
            let _ = writeln!(cmap, "{} beginbfchar", chunk.len());
            for (cid, ch) in chunk {
                let mut units = [0u16; 2];
                let utf16: String = ch
                    .encode_utf16(&mut units)
                    .iter()
                    .map(|unit| format!("{unit:04X}"))
                    .collect();
                let _ = writeln!(cmap, "<{cid:04X}> <{utf16}>");
            }
            cmap.push_str("endbfchar\n");
        }

        cmap.push_str("endcmap\n");
        cmap.push_str("CMapName currentdict /CMap defineresource pop\n");
        cmap.push_str("end\nend\n");
        cmap.into_bytes()
    }

    fn to_objects(
        &self,
        font_id: ObjectId,
        compress: bool,
        alloc: &mut dyn FnMut() -> ObjectId,
    ) -> Result<Vec<(ObjectId, Object)>> {
        let cid_font_id = alloc();
        let descriptor_id = alloc();
        let program_id = alloc();
        let to_unicode_id = alloc();
        let base_font = self.base_font();

        let mut type0 = Dictionary::typed("Font");
        type0.set("Subtype", Object::name("Type0"));
        type0.set("BaseFont", Object::name(base_font.as_str()));
        type0.set("Encoding", Object::name("Identity-H"));
        type0.set("DescendantFonts", vec![Object::Reference(cid_font_id)]);
        type0.set("ToUnicode", to_unicode_id);

        let mut system_info = Dictionary::new();
        system_info.set("Registry", Object::text("Adobe"));
        system_info.set("Ordering", Object::text("Identity"));
        system_info.set("Supplement", 0);

        let mut cid_font = Dictionary::typed("Font");
        if self.face.is_cff() {
            cid_font.set("Subtype", Object::name("CIDFontType0"));
        } else {
            cid_font.set("Subtype", Object::name("CIDFontType2"));
        }
        cid_font.set("BaseFont", Object::name(base_font.as_str()));
        cid_font.set("CIDSystemInfo", system_info);
        cid_font.set("FontDescriptor", descriptor_id);
        cid_font.set("DW", 1000);
        cid_font.set("W", self.widths_array());
        if !self.face.is_cff() {
            cid_font.set("CIDToGIDMap", Object::name("Identity"));
        }

        let [x_min, y_min, x_max, y_max] = self.face.bbox();
        let mut descriptor = Dictionary::typed("FontDescriptor");
        descriptor.set("FontName", Object::name(base_font.as_str()));
        descriptor.set("Flags", 32);
        descriptor.set(
            "FontBBox",
            vec![
                Object::from(x_min.round()),
                Object::from(y_min.round()),
                Object::from(x_max.round()),
                Object::from(y_max.round()),
            ],
        );
        descriptor.set("ItalicAngle", 0);
        descriptor.set("Ascent", self.face.ascent().round());
        descriptor.set("Descent", self.face.descent().round());
        descriptor.set("CapHeight", self.face.cap_height().round());
        descriptor.set("StemV", 80);

        let mut program = Stream::new(self.program.clone());
        if self.face.is_cff() {
            program.dictionary_mut().set("Subtype", Object::name("OpenType"));
            descriptor.set("FontFile3", program_id);
        } else {
            program.dictionary_mut().set("Length1", self.program.len());
            descriptor.set("FontFile2", program_id);
        }

        let mut to_unicode = Stream::new(self.to_unicode_cmap());
        if compress {
            program.compress_flate()?;
            to_unicode.compress_flate()?;
        }

        Ok(vec![
            (font_id, type0.into()),
            (cid_font_id, cid_font.into()),
            (descriptor_id, descriptor.into()),
            (program_id, program.into()),
            (to_unicode_id, to_unicode.into()),
        ])
    }
}

/// Six uppercase letters derived from the face and the glyph set.
fn subset_tag(postscript_name: &str, used: &BTreeSet<char>) -> String {
    let mut seed = postscript_name.as_bytes().to_vec();
    for ch in used {
        seed.extend_from_slice(&u32::from(*ch).to_le_bytes());
    }
    let digest = md5::compute(&seed);
    digest[..6].iter().map(|b| char::from(b'A' + b % 26)).collect()
}
