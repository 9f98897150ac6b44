//! PDF serialization
//!
//! The writer turns a laid-out [`Document`] into a complete PDF 1.7 file.
//! All objects are built in memory first so fonts can be subset to exactly
//! the characters the pages use and, for protected documents, every string
//! and stream can be encrypted with its own object key before anything is
//! written.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

use chrono::NaiveDateTime;

use crate::encryption::SecurityState;
use crate::error::Result;
use crate::fonts::{EncodedText, FontKey, FontResource, FontTable};
use crate::graphics::{escape_literal, ContentBuilder};
use crate::layout::{Document, DrawOp, Page, TextRun};
use crate::objects::{Dictionary, Object, ObjectId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterOptions {
    /// Flate-compress content and font streams.
    pub compress: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            compress: cfg!(feature = "compression"),
        }
    }
}

/// Serializes `document` into PDF bytes.
pub fn serialize(document: &Document, fonts: &FontTable, options: &WriterOptions) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    PdfWriter::new_with_writer(&mut buffer).write_document(document, fonts, options)?;
    Ok(buffer)
}

/// A font used by the document, under its resource name.
struct FontSlot {
    name: String,
    id: ObjectId,
    resource: FontResource,
}

/// Objects collected before writing, with sequential ids.
struct ObjectTable {
    next: u32,
    objects: BTreeMap<ObjectId, Object>,
}

impl ObjectTable {
    fn new(first: u32) -> Self {
        Self {
            next: first,
            objects: BTreeMap::new(),
        }
    }

    fn alloc(&mut self) -> ObjectId {
        let id = ObjectId::new(self.next, 0);
        self.next += 1;
        id
    }

    fn insert(&mut self, id: ObjectId, object: impl Into<Object>) {
        self.objects.insert(id, object.into());
    }
}

pub struct PdfWriter<W: Write> {
    writer: W,
    xref_positions: BTreeMap<ObjectId, u64>,
    current_position: u64,
}

impl<W: Write> PdfWriter<W> {
    pub fn new_with_writer(writer: W) -> Self {
        Self {
            writer,
            xref_positions: BTreeMap::new(),
            current_position: 0,
        }
    }

    pub fn write_document(
        &mut self,
        document: &Document,
        fonts: &FontTable,
        options: &WriterOptions,
    ) -> Result<()> {
        let catalog_id = ObjectId::new(1, 0);
        let pages_id = ObjectId::new(2, 0);
        let mut table = ObjectTable::new(3);

        let mut catalog = Dictionary::typed("Catalog");
        catalog.set("Pages", pages_id);
        table.insert(catalog_id, catalog);

        let slots = prepare_fonts(document, fonts, options, &mut table)?;

        let mut kids = Vec::with_capacity(document.page_count());
        for page in document.pages() {
            kids.push(Object::Reference(write_page(
                page, pages_id, &slots, options, &mut table,
            )?));
        }

        let mut pages = Dictionary::typed("Pages");
        pages.set("Kids", kids);
        pages.set("Count", document.page_count());
        table.insert(pages_id, pages);

        let info_id = table.alloc();
        table.insert(info_id, info_dictionary(document));

        let file_id = file_identifier(document);
        let encrypt_id = match document.security() {
            Some(settings) => {
                let state = SecurityState::derive(settings, &file_id);
                for (id, object) in table.objects.iter_mut() {
                    encrypt_object(object, *id, &state)?;
                }
                let encrypt_id = table.alloc();
                table.insert(encrypt_id, state.encrypt_dictionary());
                tracing::debug!(strength = %settings.strength(), "Encrypted document objects");
                Some(encrypt_id)
            }
            None => None,
        };

        self.write_header()?;
        for (id, object) in &table.objects {
            self.write_object(*id, object)?;
        }

        let xref_position = self.current_position;
        self.write_xref()?;
        self.write_trailer(catalog_id, info_id, encrypt_id, &file_id, xref_position)?;
        self.writer.flush()?;
        Ok(())
    }

    fn write_header(&mut self) -> Result<()> {
        self.write_bytes(b"%PDF-1.7\n")?;
        // Binary comment to ensure file is treated as binary
        self.write_bytes(&[b'%', 0xE2, 0xE3, 0xCF, 0xD3, b'\n'])?;
        Ok(())
    }

    fn write_object(&mut self, id: ObjectId, object: &Object) -> Result<()> {
        self.xref_positions.insert(id, self.current_position);

        let header = format!("{} {} obj\n", id.number(), id.generation());
        self.write_bytes(header.as_bytes())?;
        self.write_object_value(object)?;
        self.write_bytes(b"\nendobj\n")?;
        Ok(())
    }

    fn write_object_value(&mut self, object: &Object) -> Result<()> {
        match object {
            Object::Null => self.write_bytes(b"null")?,
            Object::Boolean(b) => self.write_bytes(if *b { b"true" } else { b"false" })?,
            Object::Integer(i) => self.write_bytes(i.to_string().as_bytes())?,
            Object::Real(f) => self.write_bytes(format_real(*f).as_bytes())?,
            Object::String(s) => {
                self.write_bytes(b"(")?;
                self.write_bytes(escape_literal(s).as_bytes())?;
                self.write_bytes(b")")?;
            }
            Object::HexString(s) => {
                self.write_bytes(b"<")?;
                self.write_bytes(hex::encode_upper(s).as_bytes())?;
                self.write_bytes(b">")?;
            }
            Object::Name(n) => {
                self.write_bytes(b"/")?;
                self.write_bytes(n.as_bytes())?;
            }
            Object::Array(arr) => {
                self.write_bytes(b"[")?;
                for (i, obj) in arr.iter().enumerate() {
                    if i > 0 {
                        self.write_bytes(b" ")?;
                    }
                    self.write_object_value(obj)?;
                }
                self.write_bytes(b"]")?;
            }
            Object::Dictionary(dict) => self.write_dictionary(dict)?,
            Object::Stream(stream) => {
                self.write_dictionary(stream.dictionary())?;
                self.write_bytes(b"\nstream\n")?;
                self.write_bytes(stream.data())?;
                self.write_bytes(b"\nendstream")?;
            }
            Object::Reference(id) => self.write_bytes(id.to_string().as_bytes())?,
        }
        Ok(())
    }

    fn write_dictionary(&mut self, dict: &Dictionary) -> Result<()> {
        self.write_bytes(b"<<")?;
        for (key, value) in dict.iter() {
            self.write_bytes(b"\n/")?;
            self.write_bytes(key.as_bytes())?;
            self.write_bytes(b" ")?;
            self.write_object_value(value)?;
        }
        self.write_bytes(b"\n>>")?;
        Ok(())
    }

    fn write_xref(&mut self) -> Result<()> {
        let max_obj_num = self
            .xref_positions
            .keys()
            .map(|id| id.number())
            .max()
            .unwrap_or(0);

        self.write_bytes(format!("xref\n0 {}\n", max_obj_num + 1).as_bytes())?;
        self.write_bytes(b"0000000000 65535 f \n")?;

        // Fill gaps with free entries
        for obj_num in 1..=max_obj_num {
            match self.xref_positions.get(&ObjectId::new(obj_num, 0)).copied() {
                Some(position) => {
                    let entry = format!("{:010} {:05} n \n", position, 0);
                    self.write_bytes(entry.as_bytes())?;
                }
                None => self.write_bytes(b"0000000000 00000 f \n")?,
            }
        }
        Ok(())
    }

    fn write_trailer(
        &mut self,
        catalog_id: ObjectId,
        info_id: ObjectId,
        encrypt_id: Option<ObjectId>,
        file_id: &[u8],
        xref_position: u64,
    ) -> Result<()> {
        let max_obj_num = self
            .xref_positions
            .keys()
            .map(|id| id.number())
            .max()
            .unwrap_or(0);

        let mut trailer = Dictionary::new();
        trailer.set("Size", i64::from(max_obj_num) + 1);
        trailer.set("Root", catalog_id);
        trailer.set("Info", info_id);
        if let Some(encrypt_id) = encrypt_id {
            trailer.set("Encrypt", encrypt_id);
        }
        trailer.set(
            "ID",
            vec![
                Object::HexString(file_id.to_vec()),
                Object::HexString(file_id.to_vec()),
            ],
        );

        self.write_bytes(b"trailer\n")?;
        self.write_dictionary(&trailer)?;
        self.write_bytes(b"\nstartxref\n")?;
        self.write_bytes(xref_position.to_string().as_bytes())?;
        self.write_bytes(b"\n%%EOF\n")?;
        Ok(())
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_all(data)?;
        self.current_position += data.len() as u64;
        Ok(())
    }
}

/// Collects the characters drawn with each font and builds one font
/// resource per key.
fn prepare_fonts(
    document: &Document,
    fonts: &FontTable,
    options: &WriterOptions,
    table: &mut ObjectTable,
) -> Result<BTreeMap<FontKey, FontSlot>> {
    let mut used: BTreeMap<FontKey, BTreeSet<char>> = BTreeMap::new();
    for page in document.pages() {
        for run in page.text_runs() {
            used.entry(run.font).or_default().extend(run.text.chars());
        }
    }

    let mut slots = BTreeMap::new();
    for (index, (key, chars)) in used.into_iter().enumerate() {
        let resource = FontResource::prepare(&fonts.face(key), &chars);
        let id = table.alloc();
        let objects = resource.to_objects(id, options.compress, &mut || table.alloc())?;
        for (object_id, object) in objects {
            table.insert(object_id, object);
        }
        tracing::trace!(font = %key, glyphs = chars.len(), "Prepared font resource");

        slots.insert(
            key,
            FontSlot {
                name: format!("F{}", index + 1),
                id,
                resource,
            },
        );
    }
    Ok(slots)
}

fn write_page(
    page: &Page,
    parent: ObjectId,
    slots: &BTreeMap<FontKey, FontSlot>,
    options: &WriterOptions,
    table: &mut ObjectTable,
) -> Result<ObjectId> {
    let page_id = table.alloc();
    let content_id = table.alloc();
    let size = page.size();

    let mut font_resources = Dictionary::new();
    for slot in slots.values() {
        font_resources.set(slot.name.as_str(), slot.id);
    }
    let mut resources = Dictionary::new();
    resources.set("Font", font_resources);

    let mut page_dict = Dictionary::typed("Page");
    page_dict.set("Parent", parent);
    page_dict.set(
        "MediaBox",
        vec![
            Object::from(0),
            Object::from(0),
            Object::from(size.width),
            Object::from(size.height),
        ],
    );
    page_dict.set("Resources", resources);
    page_dict.set("Contents", content_id);
    table.insert(page_id, page_dict);

    let mut content = crate::objects::Stream::new(page_content(page, slots));
    if options.compress {
        content.compress_flate()?;
    }
    table.insert(content_id, content);
    Ok(page_id)
}

/// Content stream operators for one page, flipped to PDF user space.
fn page_content(page: &Page, slots: &BTreeMap<FontKey, FontSlot>) -> Vec<u8> {
    let height = page.size().height;
    let mut content = ContentBuilder::new();

    for op in page.ops() {
        match op {
            DrawOp::Text(run) => show_text(&mut content, run, height, slots),
            DrawOp::Line {
                from,
                to,
                color,
                width,
            } => {
                content
                    .save_state()
                    .set_stroke_color(*color)
                    .set_line_width(*width)
                    .move_to(from.x, height - from.y)
                    .line_to(to.x, height - to.y)
                    .stroke()
                    .restore_state();
            }
            DrawOp::Rect { rect, fill, stroke } => {
                let y = height - rect.bottom();
                if let Some(fill) = fill {
                    content
                        .save_state()
                        .set_fill_color(*fill)
                        .rect(rect.x, y, rect.width, rect.height)
                        .fill()
                        .restore_state();
                }
                if let Some(stroke) = stroke {
                    content
                        .save_state()
                        .set_stroke_color(stroke.color)
                        .set_line_width(stroke.width)
                        .rect(rect.x, y, rect.width, rect.height)
                        .stroke()
                        .restore_state();
                }
            }
        }
    }

    if let Some(footer) = page.footer() {
        show_text(&mut content, footer, height, slots);
    }
    content.finish()
}

fn show_text(
    content: &mut ContentBuilder,
    run: &TextRun,
    page_height: f64,
    slots: &BTreeMap<FontKey, FontSlot>,
) {
    let Some(slot) = slots.get(&run.font) else {
        return;
    };

    let ascent = match &slot.resource {
        FontResource::Standard(font) => font.ascent(),
        FontResource::Embedded(font) => font.ascent(),
    };
    let baseline = page_height - (run.y + ascent / 1000.0 * run.size);

    content
        .begin_text()
        .set_font(&slot.name, run.size)
        .set_fill_color(run.color)
        .text_position(run.x, baseline);
    match slot.resource.encode(&run.text) {
        EncodedText::Literal(bytes) => content.show_literal(&bytes),
        EncodedText::Hex(bytes) => content.show_hex(&bytes),
    };
    content.end_text();
}

fn info_dictionary(document: &Document) -> Dictionary {
    let info = document.info();
    let mut dict = Dictionary::new();
    if let Some(title) = &info.title {
        dict.set("Title", Object::text(title));
    }
    if let Some(author) = &info.author {
        dict.set("Author", Object::text(author));
    }
    if let Some(creator) = &info.creator {
        dict.set("Creator", Object::text(creator));
    }
    if let Some(producer) = &info.producer {
        dict.set("Producer", Object::text(producer));
    }
    if let Some(date) = info.creation_date {
        dict.set("CreationDate", Object::text(&format_pdf_date(date)));
        dict.set("ModDate", Object::text(&format_pdf_date(date)));
    }
    dict
}

/// First and second `/ID` element, derived from the metadata and the text
/// placed on every page. The file key is derived from it, so documents
/// that differ in content never share a key, while identical inputs still
/// give identical files.
fn file_identifier(document: &Document) -> Vec<u8> {
    let info = document.info();
    let mut seed = Vec::new();
    for part in [&info.title, &info.author, &info.producer].into_iter().flatten() {
        seed.extend_from_slice(part.as_bytes());
        seed.push(0);
    }
    if let Some(date) = info.creation_date {
        seed.extend_from_slice(format_pdf_date(date).as_bytes());
    }
    seed.extend_from_slice(&document.page_count().to_le_bytes());

    for page in document.pages() {
        seed.extend_from_slice(&page.ops().len().to_le_bytes());
        for run in page.text_runs() {
            seed.extend_from_slice(&run.x.to_le_bytes());
            seed.extend_from_slice(&run.y.to_le_bytes());
            seed.extend_from_slice(run.text.as_bytes());
            seed.push(0);
        }
    }
    md5::compute(&seed).to_vec()
}

/// Encrypts every string and stream inside `object` with the key for `id`.
fn encrypt_object(object: &mut Object, id: ObjectId, state: &SecurityState) -> Result<()> {
    match object {
        Object::String(bytes) | Object::HexString(bytes) => {
            *object = Object::HexString(state.encrypt_bytes(bytes, id)?);
        }
        Object::Array(items) => {
            for item in items {
                encrypt_object(item, id, state)?;
            }
        }
        Object::Dictionary(dict) => {
            for (_, value) in dict.iter_mut() {
                encrypt_object(value, id, state)?;
            }
        }
        Object::Stream(stream) => {
            for (_, value) in stream.dictionary_mut().iter_mut() {
                encrypt_object(value, id, state)?;
            }
            let encrypted = state.encrypt_bytes(stream.data(), id)?;
            stream.set_data(encrypted);
        }
        Object::Null
        | Object::Boolean(_)
        | Object::Integer(_)
        | Object::Real(_)
        | Object::Name(_)
        | Object::Reference(_) => {}
    }
    Ok(())
}

fn format_real(value: f64) -> String {
    let formatted = format!("{value:.6}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "" | "-" | "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

/// Format a timestamp as a PDF date string (`D:YYYYMMDDHHmmSS`).
pub fn format_pdf_date(date: NaiveDateTime) -> String {
    date.format("D:%Y%m%d%H%M%S").to_string()
}
