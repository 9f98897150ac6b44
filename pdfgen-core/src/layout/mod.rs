//! Laid-out documents
//!
//! A [`Document`] is an ordered list of [`Page`]s, each holding the draw
//! operations produced by the [`LayoutEngine`]. Coordinates are top-down
//! points; the writer converts them to PDF user space.

mod engine;

pub use engine::{LayoutEngine, WARNING_TEXT};

use chrono::NaiveDateTime;

use crate::encryption::SecuritySettings;
use crate::fonts::FontKey;
use crate::geometry::{PageSize, Point, Rect};
use crate::graphics::Color;

/// A single line of text. `y` is the top of the line box.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub font: FontKey,
    pub size: f64,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text(TextRun),
    Line {
        from: Point,
        to: Point,
        color: Color,
        width: f64,
    },
    Rect {
        rect: Rect,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    size: PageSize,
    ops: Vec<DrawOp>,
    footer: Option<TextRun>,
}

impl Page {
    pub fn new(size: PageSize) -> Self {
        Self {
            size,
            ops: Vec::new(),
            footer: None,
        }
    }

    pub fn size(&self) -> PageSize {
        self.size
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn push(&mut self, op: DrawOp) {
        self.ops.push(op);
    }

    pub fn footer(&self) -> Option<&TextRun> {
        self.footer.as_ref()
    }

    pub fn set_footer(&mut self, footer: TextRun) {
        self.footer = Some(footer);
    }

    /// Body and footer text runs in drawing order.
    pub fn text_runs(&self) -> impl Iterator<Item = &TextRun> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text(run) => Some(run),
                _ => None,
            })
            .chain(self.footer.iter())
    }
}

/// Values written to the Info dictionary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pages: Vec<Page>,
    info: DocumentInfo,
    security: Option<SecuritySettings>,
}

impl Document {
    pub fn new(info: DocumentInfo) -> Self {
        Self {
            pages: Vec::new(),
            info,
            security: None,
        }
    }

    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn info(&self) -> &DocumentInfo {
        &self.info
    }

    pub fn info_mut(&mut self) -> &mut DocumentInfo {
        &mut self.info
    }

    pub fn security(&self) -> Option<&SecuritySettings> {
        self.security.as_ref()
    }

    pub fn is_encrypted(&self) -> bool {
        self.security.is_some()
    }

    pub(crate) fn set_security(&mut self, settings: SecuritySettings) {
        self.security = Some(settings);
    }
}
