/// Represents a color in PDF documents.
///
/// Supports RGB and grayscale color spaces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Color {
    /// RGB color (red, green, blue) with values from 0.0 to 1.0
    Rgb(f64, f64, f64),
    /// Grayscale color with value from 0.0 (black) to 1.0 (white)
    Gray(f64),
}

impl Color {
    /// Creates an RGB color with values clamped to 0.0-1.0.
    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Color::Rgb(r.clamp(0.0, 1.0), g.clamp(0.0, 1.0), b.clamp(0.0, 1.0))
    }

    /// Creates an RGB color from 8-bit channels.
    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Color::Rgb(
            f64::from(r) / 255.0,
            f64::from(g) / 255.0,
            f64::from(b) / 255.0,
        )
    }

    /// Creates a grayscale color with value clamped to 0.0-1.0.
    pub fn gray(value: f64) -> Self {
        Color::Gray(value.clamp(0.0, 1.0))
    }

    pub fn black() -> Self {
        Color::Gray(0.0)
    }

    pub fn red() -> Self {
        Color::Rgb(1.0, 0.0, 0.0)
    }

    /// Title and title rule color.
    pub fn dark_blue() -> Self {
        Color::rgb8(0, 0, 139)
    }

    /// Footer and timestamp text.
    pub fn medium_gray() -> Self {
        Color::rgb8(128, 128, 128)
    }

    /// Separator rule above the timestamp.
    pub fn light_gray() -> Self {
        Color::rgb8(211, 211, 211)
    }

    /// Background of the warning notice.
    pub fn light_yellow() -> Self {
        Color::rgb8(255, 255, 224)
    }
}
