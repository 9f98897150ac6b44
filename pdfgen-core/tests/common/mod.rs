//! Minimal inspector for files produced by the writer.
//!
//! Only understands the layout the writer emits: a classic xref table, one
//! object per entry, `/Length` as a direct integer, `( ) Tj` WinAnsi text for
//! standard fonts and `< > Tj` CIDs resolved through `/ToUnicode` for
//! embedded fonts.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::Read;

use chrono::{NaiveDate, NaiveDateTime};
use flate2::read::ZlibDecoder;
use pdfgen::encryption::{EncryptionKey, Permissions, StandardSecurityHandler};
use pdfgen::objects::ObjectId;
use pdfgen::text::decode_win_ansi;

pub fn timestamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 17)
        .and_then(|d| d.and_hms_opt(9, 30, 15))
        .unwrap()
}

pub fn numbered_lines(count: usize) -> String {
    (1..=count)
        .map(|i| format!("Line {i}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .rposition(|window| window == needle)
}

/// Text between `key` and the next delimiter in a dictionary body.
fn value_after<'a>(dict: &'a str, key: &str) -> Option<&'a str> {
    let start = dict.find(key)? + key.len();
    dict[start..].lines().next().map(str::trim)
}

fn parse_hex(value: &str) -> Vec<u8> {
    let inner = value.trim().trim_start_matches('<').trim_end_matches('>');
    hex::decode(inner).unwrap()
}

fn parse_ref(value: &str) -> u32 {
    value.split_whitespace().next().unwrap().parse().unwrap()
}

#[derive(Debug, Clone)]
pub struct RawObject {
    pub dict: String,
    pub stream: Option<Vec<u8>>,
}

impl RawObject {
    pub fn get(&self, key: &str) -> Option<&str> {
        value_after(&self.dict, &format!("\n/{key} "))
    }
}

struct Security {
    handler: StandardSecurityHandler,
    key: EncryptionKey,
}

pub struct Inspector {
    pub objects: BTreeMap<u32, RawObject>,
    pub trailer: String,
    pub file_id: Vec<u8>,
    security: Option<Security>,
}

impl Inspector {
    /// Parses `bytes`, decrypting with `password` when the file is protected.
    pub fn open(bytes: &[u8], password: Option<&str>) -> Result<Self, String> {
        let startxref = rfind(bytes, b"startxref\n").ok_or("missing startxref")?;
        let tail = std::str::from_utf8(&bytes[startxref + 10..]).map_err(|e| e.to_string())?;
        let xref_offset: usize = tail
            .lines()
            .next()
            .and_then(|line| line.parse().ok())
            .ok_or("bad startxref")?;

        let xref = std::str::from_utf8(&bytes[xref_offset..]).map_err(|e| e.to_string())?;
        let trailer_start = xref.find("trailer\n").ok_or("missing trailer")?;
        let trailer = xref[trailer_start..].to_string();

        let mut objects = BTreeMap::new();
        for (number, line) in xref[..trailer_start].lines().skip(2).enumerate() {
            if !line.ends_with("n ") {
                continue;
            }
            let offset: usize = line[..10].parse().map_err(|_| "bad xref entry")?;
            objects.insert(number as u32, parse_object(&bytes[offset..])?);
        }

        let file_id = value_after(&trailer, "/ID [")
            .and_then(|ids| ids.split_whitespace().next())
            .map(parse_hex)
            .ok_or("missing /ID")?;

        let mut inspector = Self {
            objects,
            trailer,
            file_id,
            security: None,
        };

        if let Some(encrypt) = value_after(&inspector.trailer, "\n/Encrypt ") {
            let dict = &inspector.objects[&parse_ref(encrypt)];
            let handler = match dict.get("R") {
                Some("4") => StandardSecurityHandler::aes_128bit(),
                _ => StandardSecurityHandler::rc4_128bit(),
            };
            let owner_hash = parse_hex(dict.get("O").ok_or("missing /O")?);
            let user_hash = parse_hex(dict.get("U").ok_or("missing /U")?);
            let p: i32 = dict
                .get("P")
                .and_then(|p| p.parse().ok())
                .ok_or("missing /P")?;

            let key = handler
                .authenticate_user_password(
                    password.unwrap_or(""),
                    &user_hash,
                    &owner_hash,
                    Permissions::from_bits(p as u32),
                    &inspector.file_id,
                )
                .ok_or("wrong password")?;
            inspector.security = Some(Security { handler, key });
        }

        Ok(inspector)
    }

    pub fn is_encrypted(&self) -> bool {
        self.trailer.contains("/Encrypt")
    }

    pub fn object(&self, number: u32) -> &RawObject {
        &self.objects[&number]
    }

    /// Decrypted and inflated stream data of object `number`.
    pub fn stream_data(&self, number: u32) -> Vec<u8> {
        let object = self.object(number);
        let mut data = object.stream.clone().unwrap();
        if let Some(security) = &self.security {
            data = security
                .handler
                .decrypt_bytes(&data, &security.key, ObjectId::new(number, 0))
                .unwrap();
        }
        if object.get("Filter") == Some("/FlateDecode") {
            let mut inflated = Vec::new();
            ZlibDecoder::new(&data[..])
                .read_to_end(&mut inflated)
                .unwrap();
            data = inflated;
        }
        data
    }

    /// Decrypted bytes of a string entry in object `number`.
    pub fn string(&self, number: u32, key: &str) -> Vec<u8> {
        let value = self.object(number).get(key).unwrap();
        let bytes = if value.starts_with('<') {
            parse_hex(value)
        } else {
            unescape(value.trim_start_matches('(').trim_end_matches(')').as_bytes())
        };
        match &self.security {
            Some(security) => security
                .handler
                .decrypt_bytes(&bytes, &security.key, ObjectId::new(number, 0))
                .unwrap(),
            None => bytes,
        }
    }

    /// Object number of the Info dictionary.
    pub fn info(&self) -> u32 {
        parse_ref(value_after(&self.trailer, "\n/Info ").unwrap())
    }

    /// Page object numbers in page tree order.
    pub fn pages(&self) -> Vec<u32> {
        let kids = self.object(2).get("Kids").unwrap();
        kids.trim_start_matches('[')
            .trim_end_matches(']')
            .split(" R")
            .filter_map(|r| r.split_whitespace().next())
            .map(|n| n.parse().unwrap())
            .collect()
    }

    pub fn page_count(&self) -> usize {
        self.pages().len()
    }

    /// Shown strings of each page, in content order.
    pub fn page_texts(&self) -> Vec<Vec<String>> {
        self.pages()
            .into_iter()
            .map(|page| self.shown_strings(page))
            .collect()
    }

    /// Decoded entry `key` of the `/Encrypt` dictionary.
    pub fn encrypt_entry(&self, key: &str) -> Option<Vec<u8>> {
        let encrypt = parse_ref(value_after(&self.trailer, "\n/Encrypt ")?);
        self.object(encrypt).get(key).map(parse_hex)
    }

    /// Text shown with `Tj` on `page`, decoded for the font selected by the
    /// preceding `Tf`.
    fn shown_strings(&self, page: u32) -> Vec<String> {
        let contents = parse_ref(self.object(page).get("Contents").unwrap());
        let data = self.stream_data(contents);

        let mut cmaps: BTreeMap<String, BTreeMap<u16, String>> = BTreeMap::new();
        let mut font = String::new();
        let mut texts = Vec::new();
        for line in String::from_utf8_lossy(&data).lines() {
            if let Some(operands) = line.strip_suffix(" Tf") {
                font = operands
                    .split_whitespace()
                    .next()
                    .unwrap_or_default()
                    .trim_start_matches('/')
                    .to_string();
            } else if let Some(literal) = line.strip_suffix(") Tj").and_then(|l| l.strip_prefix('(')) {
                texts.push(decode_win_ansi(&unescape(literal.as_bytes())));
            } else if let Some(cids) = line.strip_suffix("> Tj").and_then(|l| l.strip_prefix('<')) {
                let cmap = cmaps
                    .entry(font.clone())
                    .or_insert_with(|| self.to_unicode(page, &font));
                let text = hex::decode(cids)
                    .unwrap()
                    .chunks(2)
                    .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                    .map(|cid| cmap.get(&cid).cloned().unwrap_or_else(|| "\u{FFFD}".to_string()))
                    .collect();
                texts.push(text);
            }
        }
        texts
    }

    /// CID to text mapping of the font resource `name` on `page`.
    fn to_unicode(&self, page: u32, name: &str) -> BTreeMap<u16, String> {
        let font = parse_ref(self.object(page).get(name).unwrap());
        let to_unicode = parse_ref(self.object(font).get("ToUnicode").unwrap());
        parse_bfchar(&self.stream_data(to_unicode))
    }
}

fn parse_object(bytes: &[u8]) -> Result<RawObject, String> {
    let body_start = find(bytes, b" obj\n").ok_or("missing obj")? + 5;
    let body_end = find(bytes, b"\nendobj").ok_or("missing endobj")?;
    let body = &bytes[body_start..body_end];

    match find(body, b"\nstream\n") {
        Some(stream_at) => {
            let dict = String::from_utf8_lossy(&body[..stream_at]).to_string();
            let length: usize = value_after(&dict, "\n/Length ")
                .and_then(|l| l.parse().ok())
                .ok_or("missing /Length")?;
            let data_start = stream_at + 8;
            Ok(RawObject {
                dict,
                stream: Some(body[data_start..data_start + length].to_vec()),
            })
        }
        None => Ok(RawObject {
            dict: String::from_utf8_lossy(body).to_string(),
            stream: None,
        }),
    }
}

fn unescape(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 1 < bytes.len() {
            let next = bytes[i + 1];
            if next.is_ascii_digit() {
                let digits = &bytes[i + 1..(i + 4).min(bytes.len())];
                let octal = std::str::from_utf8(digits).unwrap();
                out.push(u8::from_str_radix(octal, 8).unwrap());
                i += 4;
            } else {
                out.push(next);
                i += 2;
            }
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    out
}

/// `beginbfchar` entries of a ToUnicode CMap.
fn parse_bfchar(cmap: &[u8]) -> BTreeMap<u16, String> {
    let cmap = String::from_utf8_lossy(cmap);
    let mut map = BTreeMap::new();
    let mut in_block = false;
    for line in cmap.lines() {
        if line.ends_with("beginbfchar") {
            in_block = true;
        } else if line == "endbfchar" {
            in_block = false;
        } else if in_block {
            let mut parts = line.split_whitespace();
            let (Some(cid), Some(unicode)) = (parts.next(), parts.next()) else {
                continue;
            };
            let cid = parse_hex(cid);
            let units: Vec<u16> = parse_hex(unicode)
                .chunks(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            map.insert(
                u16::from_be_bytes([cid[0], cid[1]]),
                String::from_utf16(&units).unwrap(),
            );
        }
    }
    map
}
