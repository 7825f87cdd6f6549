/// A position in overlay client coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle: top-left corner plus extent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// The part of `self` inside a `bounds`-sized area anchored at the
    /// origin, or `None` when nothing overlaps.
    pub fn clip(&self, bounds: Size) -> Option<Rect> {
        let left = self.x.max(0);
        let top = self.y.max(0);
        let right = self.x.saturating_add(self.width).min(bounds.width);
        let bottom = self.y.saturating_add(self.height).min(bounds.height);
        (right > left && bottom > top).then(|| Rect::new(left, top, right - left, bottom - top))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_trims_negative_origin() {
        let area = Size::new(20, 20);
        assert_eq!(Rect::new(0, -5, 20, 10).clip(area), Some(Rect::new(0, 0, 20, 5)));
        assert_eq!(Rect::new(-3, 0, 10, 20).clip(area), Some(Rect::new(0, 0, 7, 20)));
    }

    #[test]
    fn clip_trims_far_edges() {
        let area = Size::new(100, 80);
        assert_eq!(Rect::new(95, 75, 10, 10).clip(area), Some(Rect::new(95, 75, 5, 5)));
    }

    #[test]
    fn clip_outside_is_none() {
        let area = Size::new(10, 10);
        assert_eq!(Rect::new(-20, 0, 10, 10).clip(area), None);
        assert_eq!(Rect::new(10, 0, 5, 5).clip(area), None);
        assert_eq!(Rect::new(2, 2, 0, 4).clip(area), None);
    }
}
