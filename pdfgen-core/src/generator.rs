//! End-to-end generation: layout, optional encryption, serialization

use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::encryption::{self, EncryptionStrength};
use crate::error::{PdfError, Result};
use crate::fonts::FontTable;
use crate::geometry::PageGeometry;
use crate::layout::LayoutEngine;
use crate::writer::{self, WriterOptions};

pub const DEFAULT_TITLE: &str = "Confidential Document";
pub const DEFAULT_AUTHOR: &str = "PDF Generator Service";

/// Input for one generated document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfModel {
    pub title: String,
    pub content: String,
    pub password: Option<String>,
}

impl PdfModel {
    /// Builds a model, using [`DEFAULT_TITLE`] when `title` is missing or blank.
    pub fn new(title: Option<String>, content: impl Into<String>, password: Option<String>) -> Self {
        let title = title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());
        Self {
            title,
            content: content.into(),
            password,
        }
    }

    /// The password to protect the document with, if any.
    pub fn effective_password(&self) -> Option<&str> {
        self.password
            .as_deref()
            .filter(|password| !password.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorOptions {
    pub strength: EncryptionStrength,
    pub compress: bool,
    pub author: String,
    pub geometry: PageGeometry,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            strength: EncryptionStrength::default(),
            compress: WriterOptions::default().compress,
            author: DEFAULT_AUTHOR.to_string(),
            geometry: PageGeometry::default(),
        }
    }
}

/// Turns [`PdfModel`]s into PDF bytes. Cheap to clone and safe to share
/// between threads.
#[derive(Debug, Clone)]
pub struct PdfGenerator {
    fonts: Arc<FontTable>,
    options: GeneratorOptions,
}

impl PdfGenerator {
    pub fn new(fonts: Arc<FontTable>, options: GeneratorOptions) -> Self {
        Self { fonts, options }
    }

    /// Generates the document for `model`, stamped with `generated_at`.
    pub fn generate(&self, model: &PdfModel, generated_at: NaiveDateTime) -> Result<Vec<u8>> {
        if model.content.trim().is_empty() {
            return Err(PdfError::InvalidInput("content is empty".to_string()));
        }

        tracing::info!(
            title = %model.title,
            content_len = model.content.len(),
            encrypted = model.effective_password().is_some(),
            "Generating PDF"
        );

        let engine = LayoutEngine::new(&self.fonts, self.options.geometry);
        let mut document = engine.layout(&model.title, &model.content, generated_at);

        let info = document.info_mut();
        info.author = Some(self.options.author.clone());
        info.creator = Some(DEFAULT_AUTHOR.to_string());
        info.producer = Some(format!("pdfgen {}", crate::VERSION));

        if let Some(password) = model.effective_password() {
            encryption::encrypt(&mut document, password, self.options.strength)?;
        }

        let bytes = writer::serialize(
            &document,
            &self.fonts,
            &WriterOptions {
                compress: self.options.compress,
            },
        )?;

        tracing::info!(
            pages = document.page_count(),
            bytes = bytes.len(),
            "PDF generated"
        );
        Ok(bytes)
    }
}
