mod color;

pub use color::Color;

use std::fmt::Write;

/// Builder for a page content stream.
///
/// Coordinates are PDF user space (origin bottom-left). Callers flip the
/// layout's top-down coordinates before emitting operators.
#[derive(Clone, Debug, Default)]
pub struct ContentBuilder {
    operations: String,
}

impl ContentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_state(&mut self) -> &mut Self {
        self.operations.push_str("q\n");
        self
    }

    pub fn restore_state(&mut self) -> &mut Self {
        self.operations.push_str("Q\n");
        self
    }

    pub fn set_fill_color(&mut self, color: Color) -> &mut Self {
        let _ = match color {
            Color::Rgb(r, g, b) => writeln!(self.operations, "{r:.3} {g:.3} {b:.3} rg"),
            Color::Gray(g) => writeln!(self.operations, "{g:.3} g"),
        };
        self
    }

    pub fn set_stroke_color(&mut self, color: Color) -> &mut Self {
        let _ = match color {
            Color::Rgb(r, g, b) => writeln!(self.operations, "{r:.3} {g:.3} {b:.3} RG"),
            Color::Gray(g) => writeln!(self.operations, "{g:.3} G"),
        };
        self
    }

    pub fn set_line_width(&mut self, width: f64) -> &mut Self {
        let _ = writeln!(self.operations, "{width:.2} w");
        self
    }

    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        let _ = writeln!(self.operations, "{x:.2} {y:.2} m");
        self
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        let _ = writeln!(self.operations, "{x:.2} {y:.2} l");
        self
    }

    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        let _ = writeln!(self.operations, "{x:.2} {y:.2} {width:.2} {height:.2} re");
        self
    }

    pub fn stroke(&mut self) -> &mut Self {
        self.operations.push_str("S\n");
        self
    }

    pub fn fill(&mut self) -> &mut Self {
        self.operations.push_str("f\n");
        self
    }

    pub fn begin_text(&mut self) -> &mut Self {
        self.operations.push_str("BT\n");
        self
    }

    pub fn end_text(&mut self) -> &mut Self {
        self.operations.push_str("ET\n");
        self
    }

    pub fn set_font(&mut self, resource: &str, size: f64) -> &mut Self {
        let _ = writeln!(self.operations, "/{resource} {size:.2} Tf");
        self
    }

    pub fn text_position(&mut self, x: f64, y: f64) -> &mut Self {
        let _ = writeln!(self.operations, "{x:.2} {y:.2} Td");
        self
    }

    /// Shows already-encoded text as a literal string, `(..) Tj`.
    pub fn show_literal(&mut self, encoded: &[u8]) -> &mut Self {
        self.operations.push('(');
        self.operations.push_str(&escape_literal(encoded));
        self.operations.push_str(") Tj\n");
        self
    }

    /// Shows already-encoded text as a hex string, `<..> Tj`.
    pub fn show_hex(&mut self, encoded: &[u8]) -> &mut Self {
        self.operations.push('<');
        for byte in encoded {
            let _ = write!(self.operations, "{byte:02X}");
        }
        self.operations.push_str("> Tj\n");
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.operations.into_bytes()
    }
}

/// Escapes bytes for a PDF literal string body.
///
/// Delimiters and backslashes are backslash-escaped; bytes outside the
/// printable ASCII range become three-digit octal escapes.
pub fn escape_literal(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &byte in bytes {
        match byte {
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            b'\\' => out.push_str("\\\\"),
            0x20..=0x7E => out.push(byte as char),
            _ => {
                let _ = write!(out, "\\{byte:03o}");
            }
        }
    }
    out
}
