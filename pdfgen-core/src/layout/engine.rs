use chrono::NaiveDateTime;

use crate::fonts::{FontFace, FontKey, FontResolver, FontTable};
use crate::geometry::{PageGeometry, Point, Rect};
use crate::graphics::Color;
use crate::layout::{Document, DocumentInfo, DrawOp, Page, Stroke, TextRun};
use crate::text::wrap_text;

const FONT_FAMILY: &str = "Noto Sans TC";

const TITLE_SIZE: f64 = 20.0;
const BODY_SIZE: f64 = 12.0;
const SMALL_SIZE: f64 = 10.0;

/// Extra advance for every wrapped title line after the first.
const TITLE_LINE_SPACING: f64 = 24.0;
/// Cursor advance from the title to its rule.
const TITLE_GAP: f64 = 50.0;
/// Cursor advance from the title rule to the first content line.
const TITLE_RULE_GAP: f64 = 30.0;
/// Distance between wrapped continuation lines of one logical line.
const WRAP_LEADING: f64 = 15.0;

const TRAILER_GAP: f64 = 20.0;
const TIMESTAMP_GAP: f64 = 20.0;
const WARNING_GAP: f64 = 30.0;
const WARNING_HEIGHT: f64 = 45.0;
const WARNING_PADDING: f64 = 10.0;
const WARNING_TEXT_HEIGHT: f64 = 35.0;
const WARNING_LINE_SPACING: f64 = SMALL_SIZE * 1.2;
const FOOTER_OFFSET: f64 = 40.0;

pub const WARNING_TEXT: &str =
    "This document is encrypted and protected. Please keep your password secure.";

/// Pages built so far plus the page being filled and the cursor on it.
#[derive(Debug)]
struct LayoutState {
    finished: Vec<Page>,
    current: Page,
    y: f64,
}

/// Lays out a title and free-form text onto pages.
///
/// Page 1 starts with the centered title and a rule. Each logical content
/// line advances the cursor by the line height; when the cursor passes the
/// bottom reserve the page is closed with its footer and a fresh page begins
/// at the top margin. The document ends with a separator, the generation
/// timestamp and a warning box.
pub struct LayoutEngine {
    geometry: PageGeometry,
    regular: FontFace,
    bold: FontFace,
}

impl LayoutEngine {
    pub fn new(fonts: &FontTable, geometry: PageGeometry) -> Self {
        let regular_key = FontResolver::resolve(FONT_FAMILY, false, false);
        let bold_key = FontResolver::resolve(FONT_FAMILY, true, false);
        Self {
            geometry,
            regular: fonts.face(regular_key),
            bold: fonts.face(bold_key),
        }
    }

    /// Lays out `content` under `title`. Identical inputs produce identical
    /// documents.
    pub fn layout(&self, title: &str, content: &str, generated_at: NaiveDateTime) -> Document {
        let mut state = LayoutState {
            finished: Vec::new(),
            current: Page::new(self.geometry.size),
            y: self.geometry.top(),
        };

        state = self.place_title(state, title);
        state = split_lines(content).fold(state, |state, line| self.place_line(state, line));
        state = self.place_trailer(state, generated_at);

        let LayoutState {
            mut finished,
            current,
            ..
        } = state;
        finished.push(self.with_footer(current, finished.len() + 1));

        let mut document = Document::new(DocumentInfo {
            title: Some(title.to_string()),
            creation_date: Some(generated_at),
            ..Default::default()
        });
        for page in finished {
            document.add_page(page);
        }

        tracing::debug!(pages = document.page_count(), "Layout finished");
        document
    }

    fn place_title(&self, mut state: LayoutState, title: &str) -> LayoutState {
        let width = self.geometry.content_width();
        let lines = wrap_text(title, width, |s| self.bold.measure(s, TITLE_SIZE));

        for (i, line) in lines.iter().enumerate() {
            let line_width = self.bold.measure(line, TITLE_SIZE);
            state.current.push(DrawOp::Text(TextRun {
                x: self.geometry.left() + (width - line_width) / 2.0,
                y: state.y + i as f64 * TITLE_LINE_SPACING,
                text: line.clone(),
                font: FontKey::Bold,
                size: TITLE_SIZE,
                color: Color::dark_blue(),
            }));
        }

        let extra_lines = lines.len().saturating_sub(1) as f64;
        state.y += TITLE_GAP + extra_lines * TITLE_LINE_SPACING;
        state.current.push(self.rule(state.y, Color::dark_blue()));
        state.y += TITLE_RULE_GAP;
        state
    }

    fn place_line(&self, state: LayoutState, line: &str) -> LayoutState {
        let mut state = self.break_if_needed(state);

        let sub_lines = wrap_text(line, self.geometry.content_width(), |s| {
            self.regular.measure(s, BODY_SIZE)
        });
        for (i, sub_line) in sub_lines.into_iter().enumerate() {
            if i > 0 {
                state.y += WRAP_LEADING;
                state = self.break_if_needed(state);
            }
            state.current.push(DrawOp::Text(TextRun {
                x: self.geometry.left(),
                y: state.y,
                text: sub_line,
                font: FontKey::Regular,
                size: BODY_SIZE,
                color: Color::black(),
            }));
        }

        state.y += self.geometry.line_height;
        state
    }

    fn place_trailer(&self, mut state: LayoutState, generated_at: NaiveDateTime) -> LayoutState {
        state.y += TRAILER_GAP;
        state = self.break_if_needed(state);
        state.current.push(self.rule(state.y, Color::light_gray()));

        state.y += TIMESTAMP_GAP;
        state = self.break_if_needed(state);
        state.current.push(DrawOp::Text(TextRun {
            x: self.geometry.left(),
            y: state.y,
            text: format!(
                "PDF Document Generated: {}",
                generated_at.format("%Y-%m-%d %H:%M:%S")
            ),
            font: FontKey::Regular,
            size: SMALL_SIZE,
            color: Color::medium_gray(),
        }));

        state.y += WARNING_GAP;
        state = self.break_if_needed(state);
        self.place_warning(&mut state.current, state.y);
        state
    }

    fn place_warning(&self, page: &mut Page, y: f64) {
        let rect = Rect::new(
            self.geometry.left(),
            y,
            self.geometry.content_width(),
            WARNING_HEIGHT,
        );
        page.push(DrawOp::Rect {
            rect,
            fill: Some(Color::light_yellow()),
            stroke: Some(Stroke {
                color: Color::red(),
                width: 1.0,
            }),
        });

        let text_box = Rect::new(
            rect.x + WARNING_PADDING,
            rect.y + WARNING_PADDING,
            rect.width - 2.0 * WARNING_PADDING,
            WARNING_TEXT_HEIGHT,
        );
        let lines = wrap_text(WARNING_TEXT, text_box.width, |s| {
            self.regular.measure(s, SMALL_SIZE)
        });
        for (i, line) in lines.into_iter().enumerate() {
            let line_y = text_box.y + i as f64 * WARNING_LINE_SPACING;
            if line_y + SMALL_SIZE > text_box.bottom() {
                break;
            }
            let line_width = self.regular.measure(&line, SMALL_SIZE);
            page.push(DrawOp::Text(TextRun {
                x: text_box.x + (text_box.width - line_width) / 2.0,
                y: line_y,
                text: line,
                font: FontKey::Regular,
                size: SMALL_SIZE,
                color: Color::red(),
            }));
        }
    }

    /// Closes the current page and starts a new one when the cursor is past
    /// the bottom reserve.
    fn break_if_needed(&self, mut state: LayoutState) -> LayoutState {
        if state.y <= self.geometry.break_threshold() {
            return state;
        }

        let page_number = state.finished.len() + 1;
        let full = std::mem::replace(&mut state.current, Page::new(self.geometry.size));
        state.finished.push(self.with_footer(full, page_number));
        state.y = self.geometry.top();
        tracing::trace!(page_number = page_number + 1, "Started new page");
        state
    }

    fn with_footer(&self, mut page: Page, page_number: usize) -> Page {
        let text = format!("Page {page_number}");
        let width = self.regular.measure(&text, SMALL_SIZE);
        let size = page.size();
        page.set_footer(TextRun {
            x: (size.width - width) / 2.0,
            y: size.height - FOOTER_OFFSET,
            text,
            font: FontKey::Regular,
            size: SMALL_SIZE,
            color: Color::medium_gray(),
        });
        page
    }

    fn rule(&self, y: f64, color: Color) -> DrawOp {
        DrawOp::Line {
            from: Point::new(self.geometry.left(), y),
            to: Point::new(self.geometry.right(), y),
            color,
            width: 1.0,
        }
    }
}

/// Splits on `\r\n`, `\r` and `\n`, keeping empty lines.
fn split_lines(content: &str) -> impl Iterator<Item = &str> {
    let mut rest = Some(content);
    std::iter::from_fn(move || {
        let text = rest?;
        match text.find(['\r', '\n']) {
            Some(pos) => {
                let skip = if text[pos..].starts_with("\r\n") { 2 } else { 1 };
                rest = Some(&text[pos + skip..]);
                Some(&text[..pos])
            }
            None => {
                rest = None;
                Some(text)
            }
        }
    })
}
