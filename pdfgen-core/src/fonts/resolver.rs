use std::fmt;
use std::str::FromStr;

use crate::error::PdfError;

/// Normalized key of a loaded font face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FontKey {
    Regular,
    Bold,
    Light,
}

impl FontKey {
    pub const ALL: [FontKey; 3] = [FontKey::Regular, FontKey::Bold, FontKey::Light];

    pub fn as_str(&self) -> &'static str {
        match self {
            FontKey::Regular => "notosans",
            FontKey::Bold => "notosans-bold",
            FontKey::Light => "notosans-light",
        }
    }

    /// Font file for this key, relative to the fonts directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            FontKey::Regular => "static/NotoSansTC-Regular.ttf",
            FontKey::Bold => "static/NotoSansTC-Bold.ttf",
            FontKey::Light => "static/NotoSansTC-Light.ttf",
        }
    }
}

impl fmt::Display for FontKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FontKey {
    type Err = PdfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FontKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| PdfError::FontError(format!("Unknown font key: {s}")))
    }
}

/// Maps logical font requests onto the bundled Noto Sans TC faces.
///
/// Every family resolves to Noto Sans TC; italic has no face of its own and is
/// ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct FontResolver;

impl FontResolver {
    pub fn resolve(family: &str, bold: bool, italic: bool) -> FontKey {
        let normalized: String = family
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();

        let key = if bold { FontKey::Bold } else { FontKey::Regular };
        tracing::debug!(family, normalized = %normalized, bold, italic, key = %key, "Resolved font");
        key
    }
}
