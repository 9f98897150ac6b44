//! Page geometry in points, top-down coordinates

/// A point with `y` measured downwards from the top edge of the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A rectangle whose origin is its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    /// ISO A4, 595 x 842 points
    pub fn a4() -> Self {
        Self {
            width: 595.0,
            height: 842.0,
        }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::a4()
    }
}

/// Page size plus the margins and spacing used by the layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub size: PageSize,
    /// Left, right and top margin
    pub margin: f64,
    /// Vertical advance per logical content line
    pub line_height: f64,
    /// Space kept free at the bottom of every page
    pub bottom_reserve: f64,
}

impl PageGeometry {
    pub fn content_width(&self) -> f64 {
        self.size.width - 2.0 * self.margin
    }

    pub fn left(&self) -> f64 {
        self.margin
    }

    pub fn right(&self) -> f64 {
        self.size.width - self.margin
    }

    pub fn top(&self) -> f64 {
        self.margin
    }

    /// A cursor below this position starts a new page.
    pub fn break_threshold(&self) -> f64 {
        self.size.height - self.bottom_reserve
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            size: PageSize::a4(),
            margin: 50.0,
            line_height: 25.0,
            bottom_reserve: 120.0,
        }
    }
}
