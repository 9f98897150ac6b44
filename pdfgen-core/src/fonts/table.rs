use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::fonts::{EmbeddedFace, FontFace, FontKey};
use crate::text::StandardFont;

/// Immutable font bytes and faces, built once at startup and shared by all
/// requests.
#[derive(Debug, Clone, Default)]
pub struct FontTable {
    fonts: BTreeMap<FontKey, Arc<[u8]>>,
    faces: BTreeMap<FontKey, FontFace>,
}

impl FontTable {
    /// A table without font files; every key falls back to Helvetica.
    pub fn empty() -> Self {
        Self::from_fonts(Vec::new())
    }

    /// Loads the Noto Sans TC faces from `dir`.
    ///
    /// Missing or unreadable files are logged and skipped. A missing bold
    /// face is served from the regular bytes.
    pub fn load(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        tracing::info!(path = %dir.display(), "Loading fonts");

        let mut fonts = Vec::new();
        for key in FontKey::ALL {
            let path = dir.join(key.file_name());
            match std::fs::read(&path) {
                Ok(bytes) => {
                    tracing::info!(file = key.file_name(), key = %key, "Font loaded");
                    fonts.push((key, bytes));
                }
                Err(e) => {
                    tracing::error!(path = %path.display(), error = %e, "Font file not found");
                }
            }
        }

        let table = Self::from_fonts(fonts);
        tracing::info!(count = table.len(), "Fonts loaded");
        table
    }

    /// Builds a table from raw font bytes, applying the bold fallback.
    pub fn from_fonts(fonts: impl IntoIterator<Item = (FontKey, Vec<u8>)>) -> Self {
        let mut table: BTreeMap<FontKey, Arc<[u8]>> = fonts
            .into_iter()
            .map(|(key, bytes)| (key, Arc::from(bytes)))
            .collect();

        if !table.contains_key(&FontKey::Bold) {
            if let Some(regular) = table.get(&FontKey::Regular).cloned() {
                tracing::info!("Using regular weight as fallback for bold");
                table.insert(FontKey::Bold, regular);
            }
        }

        let faces = build_faces(&table);
        Self {
            fonts: table,
            faces,
        }
    }

    /// Raw bytes for `key`, `None` when the key was never loaded.
    pub fn font_bytes(&self, key: FontKey) -> Option<&[u8]> {
        self.fonts.get(&key).map(|bytes| &bytes[..])
    }

    /// The face used to measure and draw `key`.
    pub fn face(&self, key: FontKey) -> FontFace {
        self.faces
            .get(&key)
            .cloned()
            .unwrap_or_else(|| FontFace::Standard(standard_fallback(key)))
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = FontKey> + '_ {
        self.fonts.keys().copied()
    }
}

fn standard_fallback(key: FontKey) -> StandardFont {
    match key {
        FontKey::Bold => StandardFont::HelveticaBold,
        FontKey::Regular | FontKey::Light => StandardFont::Helvetica,
    }
}

fn build_faces(fonts: &BTreeMap<FontKey, Arc<[u8]>>) -> BTreeMap<FontKey, FontFace> {
    let mut parsed: Vec<(Arc<[u8]>, FontFace)> = Vec::new();
    let mut faces = BTreeMap::new();

    for key in FontKey::ALL {
        let face = match fonts.get(&key) {
            Some(bytes) => {
                let shared = parsed
                    .iter()
                    .find(|(data, _)| Arc::ptr_eq(data, bytes))
                    .map(|(_, face)| face.clone());

                match shared {
                    Some(face) => face,
                    None => match EmbeddedFace::parse(Arc::clone(bytes)) {
                        Ok(face) => {
                            let face = FontFace::Embedded(Arc::new(face));
                            parsed.push((Arc::clone(bytes), face.clone()));
                            face
                        }
                        Err(e) => {
                            tracing::warn!(key = %key, error = %e, "Unusable font, using standard font");
                            FontFace::Standard(standard_fallback(key))
                        }
                    },
                }
            }
            None => FontFace::Standard(standard_fallback(key)),
        };
        faces.insert(key, face);
    }

    if !faces.values().any(FontFace::is_embedded) {
        tracing::warn!("No embeddable fonts available, text is limited to WinAnsi characters");
    }
    faces
}
