//! # pdfgen
//!
//! Lays out free-form text onto paginated A4 pages and writes it as a PDF,
//! optionally protected with a password.
//!
//! ## Features
//!
//! - **Layout**: centered title, word-wrapped body lines, automatic page breaks,
//!   a generation timestamp, a warning box and a `Page N` footer on every page
//! - **Fonts**: Noto Sans TC faces loaded once and shared, subset on embedding,
//!   with a built-in Helvetica fallback when no font files are present
//! - **Encryption**: standard security handler with RC4 128-bit or AES-128 and a
//!   print-only permission policy
//! - **Deterministic output**: identical input and timestamp give identical bytes
//!   for unencrypted documents
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use pdfgen::{FontTable, GeneratorOptions, PdfGenerator, PdfModel, Result};
//!
//! # fn main() -> Result<()> {
//! let generator = PdfGenerator::new(Arc::new(FontTable::empty()), GeneratorOptions::default());
//! let model = PdfModel::new(
//!     Some("Quarterly Report".to_string()),
//!     "Line1\nLine2\n\nLine3",
//!     Some("secret1".to_string()),
//! );
//!
//! let bytes = generator.generate(&model, chrono::Local::now().naive_local())?;
//! assert!(bytes.starts_with(b"%PDF-1.7"));
//! # Ok(())
//! # }
//! ```

pub mod encryption;
pub mod error;
pub mod fonts;
pub mod generator;
pub mod geometry;
pub mod graphics;
pub mod layout;
pub mod objects;
pub mod text;
pub mod writer;

pub use encryption::{encrypt, EncryptionStrength, Permissions, SecuritySettings};
pub use error::{PdfError, Result};
pub use fonts::{FontKey, FontResolver, FontTable};
pub use generator::{GeneratorOptions, PdfGenerator, PdfModel, DEFAULT_TITLE};
pub use geometry::{PageGeometry, PageSize};
pub use graphics::Color;
pub use layout::{Document, DocumentInfo, DrawOp, LayoutEngine, Page, TextRun};
pub use writer::{serialize, WriterOptions};

/// Current version of pdfgen
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
