//! Axis-aligned bounds for clip rejection and damage tracking

use kinesis_core::{Rect, Vec3};

/// Axis-aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

impl BoundingBox {
    /// Create an empty bounding box
    pub fn empty() -> Self {
        Self {
            min: Vec3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Vec3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    /// Create from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Check if the bounding box is empty
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand to include a point
    pub fn expand_to_include(&mut self, point: Vec3) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    /// Four-way screen-space rejection test against a clip rectangle
    ///
    /// Depth is ignored; only the x/y footprint matters for clipping.
    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        !(self.is_empty()
            || self.max.x <= rect.x()
            || self.min.x >= rect.right()
            || self.max.y <= rect.y()
            || self.min.y >= rect.bottom())
    }

    /// Screen-space footprint, `None` for an empty box
    pub fn to_rect(&self) -> Option<Rect> {
        if self.is_empty() {
            return None;
        }
        Some(Rect::from_edges(self.min.x, self.min.y, self.max.x, self.max.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_box_never_intersects() {
        let bb = BoundingBox::empty();
        assert!(bb.is_empty());
        assert!(!bb.intersects_rect(&Rect::new(-1e6, -1e6, 2e6, 2e6)));
        assert!(bb.to_rect().is_none());
    }

    #[test]
    fn test_intersects_rect_rejection() {
        let mut bb = BoundingBox::empty();
        bb.expand_to_include(Vec3::new(10.0, 10.0, 0.1));
        bb.expand_to_include(Vec3::new(20.0, 30.0, -0.1));

        assert!(bb.intersects_rect(&Rect::new(15.0, 0.0, 100.0, 12.0)));
        // left, right, above, below
        assert!(!bb.intersects_rect(&Rect::new(0.0, 0.0, 10.0, 100.0)));
        assert!(!bb.intersects_rect(&Rect::new(20.0, 0.0, 10.0, 100.0)));
        assert!(!bb.intersects_rect(&Rect::new(0.0, 0.0, 100.0, 10.0)));
        assert!(!bb.intersects_rect(&Rect::new(0.0, 30.0, 100.0, 10.0)));
    }
}
