use glam::Vec2;

/// Axis-aligned rectangle in framebuffer pixels.
///
/// Coordinates are y-up with the origin at the bottom-left corner of the
/// active render target, matching the default Cartesian 2D projection.
/// `x1 >= x0` and `y1 >= y0` is the caller's responsibility; nothing here
/// normalizes the corners.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    #[inline]
    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Builds a rect from its bottom-left corner and size.
    #[inline]
    pub fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self::new(origin.x, origin.y, origin.x + size.x, origin.y + size.y)
    }

    #[inline]
    pub fn width(self) -> f32 {
        self.x1 - self.x0
    }

    #[inline]
    pub fn height(self) -> f32 {
        self.y1 - self.y0
    }

    #[inline]
    pub fn left(self) -> f32 {
        self.x0
    }

    #[inline]
    pub fn right(self) -> f32 {
        self.x1
    }

    /// Top edge. With y-up coordinates this is the larger y.
    #[inline]
    pub fn top(self) -> f32 {
        self.y1
    }

    #[inline]
    pub fn bottom(self) -> f32 {
        self.y0
    }

    #[inline]
    pub fn origin(self) -> Vec2 {
        Vec2::new(self.x0, self.y0)
    }

    #[inline]
    pub fn size(self) -> Vec2 {
        Vec2::new(self.width(), self.height())
    }

    #[inline]
    pub fn center(self) -> Vec2 {
        Vec2::new((self.x0 + self.x1) * 0.5, (self.y0 + self.y1) * 0.5)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x0.is_finite() && self.y0.is_finite() && self.x1.is_finite() && self.y1.is_finite()
    }

    /// Strict containment: points on an edge are outside.
    #[inline]
    pub fn contains_strict(self, p: Vec2) -> bool {
        p.x > self.left() && p.x < self.right() && p.y < self.top() && p.y > self.bottom()
    }

    /// Grows every edge outward by `amount`.
    #[inline]
    pub fn expanded(self, amount: f32) -> Self {
        Self::new(self.x0 - amount, self.y0 - amount, self.x1 + amount, self.y1 + amount)
    }

    /// Returns the rect shifted by `offset`.
    #[inline]
    pub fn translated(self, offset: Vec2) -> Self {
        Self::new(self.x0 + offset.x, self.y0 + offset.y, self.x1 + offset.x, self.y1 + offset.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x0: f32, y0: f32, x1: f32, y1: f32) -> Rect { Rect::new(x0, y0, x1, y1) }

    // ── extents ───────────────────────────────────────────────────────────

    #[test]
    fn width_and_height_from_corners() {
        let rect = r(10.0, 20.0, 110.0, 70.0);
        assert_eq!(rect.width(), 100.0);
        assert_eq!(rect.height(), 50.0);
    }

    #[test]
    fn top_is_larger_y() {
        let rect = r(0.0, 5.0, 10.0, 15.0);
        assert_eq!(rect.top(), 15.0);
        assert_eq!(rect.bottom(), 5.0);
    }

    #[test]
    fn from_origin_size_round_trips_extents() {
        let rect = Rect::from_origin_size(Vec2::new(3.0, 4.0), Vec2::new(10.0, 20.0));
        assert_eq!(rect, r(3.0, 4.0, 13.0, 24.0));
        assert_eq!(rect.size(), Vec2::new(10.0, 20.0));
    }

    // ── contains_strict ───────────────────────────────────────────────────

    #[test]
    fn contains_interior_point() {
        assert!(r(0.0, 0.0, 10.0, 10.0).contains_strict(Vec2::new(5.0, 5.0)));
    }

    #[test]
    fn edges_are_outside() {
        let rect = r(0.0, 0.0, 10.0, 10.0);
        assert!(!rect.contains_strict(Vec2::new(0.0, 5.0)));
        assert!(!rect.contains_strict(Vec2::new(10.0, 5.0)));
        assert!(!rect.contains_strict(Vec2::new(5.0, 0.0)));
        assert!(!rect.contains_strict(Vec2::new(5.0, 10.0)));
    }

    // ── transforms ────────────────────────────────────────────────────────

    #[test]
    fn expanded_grows_all_edges() {
        assert_eq!(r(0.0, 0.0, 10.0, 10.0).expanded(2.0), r(-2.0, -2.0, 12.0, 12.0));
    }

    #[test]
    fn translated_keeps_size() {
        let moved = r(0.0, 0.0, 4.0, 3.0).translated(Vec2::new(1.0, -1.0));
        assert_eq!(moved, r(1.0, -1.0, 5.0, 2.0));
        assert_eq!(moved.size(), Vec2::new(4.0, 3.0));
    }
}
