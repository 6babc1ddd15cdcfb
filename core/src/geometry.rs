use nalgebra::Point2;

/// Axis-aligned rectangle with integer origin and non-negative extents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Corner with the smallest x and y.
    pub fn min_point(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Corner with the largest x and y (exclusive).
    pub fn max_point(&self) -> (i32, i32) {
        (
            self.x.saturating_add_unsigned(self.width),
            self.y.saturating_add_unsigned(self.height),
        )
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// True when `other` lies entirely inside `self`.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        let (ax1, ay1) = self.max_point();
        let (bx1, by1) = other.max_point();
        other.x >= self.x && other.y >= self.y && bx1 <= ax1 && by1 <= ay1
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Point2<f64>,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Point2<f64>, radius: f64) -> Self {
        Self { center, radius }
    }

    pub fn from_xyr(x: f64, y: f64, radius: f64) -> Self {
        Self::new(Point2::new(x, y), radius)
    }

    /// Point containment with an absolute slack `eps` on the radius.
    pub fn contains(&self, p: &Point2<f64>, eps: f64) -> bool {
        nalgebra::distance(&self.center, p) <= self.radius + eps
    }
}
