//! Font lookup, measurement and embedding
//!
//! [`FontTable`] holds the font files loaded at startup. [`FontResolver`]
//! maps a family/weight request to a [`FontKey`], and [`FontTable::face`]
//! returns the [`FontFace`] used for both measuring and drawing. When no
//! usable font file is present the standard Helvetica faces are used.

mod embedder;
mod face;
mod resolver;
mod table;

pub use embedder::{EmbeddedFont, EncodedText, FontResource};
pub use face::{EmbeddedFace, FontFace, Glyph};
pub use resolver::{FontKey, FontResolver};
pub use table::FontTable;
