//! Built-in metrics for the standard Helvetica faces
//!
//! Widths are in 1/1000 of the font size and cover printable ASCII. Other
//! characters use the face's default width.

/// Helvetica widths for 0x20..=0x7E
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

/// Helvetica-Bold widths for 0x20..=0x7E
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // '0'..'?'
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 'P'..'_'
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // '`'..'o'
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 'p'..'~'
];

/// A standard 14 font used when no TrueType face is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
}

impl StandardFont {
    /// `/BaseFont` name
    pub fn base_font(&self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
        }
    }

    fn default_width(&self) -> u16 {
        match self {
            StandardFont::Helvetica => 556,
            StandardFont::HelveticaBold => 611,
        }
    }

    pub fn char_width(&self, ch: char) -> u16 {
        let table = match self {
            StandardFont::Helvetica => &HELVETICA_WIDTHS,
            StandardFont::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        };
        match ch as u32 {
            code @ 0x20..=0x7E => table[(code - 0x20) as usize],
            _ => self.default_width(),
        }
    }

    /// Ascender in 1/1000 units.
    pub fn ascent(&self) -> f64 {
        718.0
    }

    /// Descender in 1/1000 units.
    pub fn descent(&self) -> f64 {
        -207.0
    }

    pub fn measure(&self, text: &str, font_size: f64) -> f64 {
        let units: u32 = text.chars().map(|ch| u32::from(self.char_width(ch))).sum();
        f64::from(units) / 1000.0 * font_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helvetica_widths() {
        let font = StandardFont::Helvetica;
        assert_eq!(font.char_width(' '), 278);
        assert_eq!(font.char_width('A'), 667);
        assert_eq!(font.char_width('i'), 222);
        assert_eq!(font.char_width('W'), 944);
        assert_eq!(font.char_width('~'), 584);
    }

    #[test]
    fn test_helvetica_bold_widths() {
        let font = StandardFont::HelveticaBold;
        assert_eq!(font.char_width('!'), 333);
        assert_eq!(font.char_width('b'), 611);
        assert_eq!(font.char_width('m'), 889);
    }

    #[test]
    fn test_default_width_for_non_ascii() {
        assert_eq!(StandardFont::Helvetica.char_width('機'), 556);
        assert_eq!(StandardFont::HelveticaBold.char_width('é'), 611);
    }

    #[test]
    fn test_measure_scales_with_size() {
        let font = StandardFont::Helvetica;
        // "Hi" = 722 + 222
        assert!((font.measure("Hi", 10.0) - 9.44).abs() < 1e-9);
        assert!((font.measure("Hi", 20.0) - 18.88).abs() < 1e-9);
        assert_eq!(font.measure("", 12.0), 0.0);
    }

    #[test]
    fn test_base_font_names() {
        assert_eq!(StandardFont::Helvetica.base_font(), "Helvetica");
        assert_eq!(StandardFont::HelveticaBold.base_font(), "Helvetica-Bold");
    }
}
