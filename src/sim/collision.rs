//! Axis-aligned bounding boxes for collision detection
//!
//! Every entity resolves to a `Rect`; hostiles widen theirs horizontally to
//! cover wing extent (see `Hostile::hit_box`).

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Rect from a top-left position vector and a size
    pub fn at(pos: Vec2, w: f32, h: f32) -> Self {
        Self::new(pos.x, pos.y, w, h)
    }

    /// Center point of the rect
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Widen symmetrically on the x axis by `margin` on each side
    pub fn widened(&self, margin: f32) -> Self {
        Self::new(self.x - margin, self.y, self.w + margin * 2.0, self.h)
    }

    /// Standard AABB overlap test (strict inequalities - touching edges miss)
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }

    /// Check whether a point falls inside the rect
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn test_separated() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_touching_edges_miss() {
        // Exactly adjacent rects do not count as overlapping
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_widened() {
        let a = Rect::new(10.0, 0.0, 10.0, 10.0);
        let w = a.widened(5.0);
        assert_eq!(w.x, 5.0);
        assert_eq!(w.w, 20.0);
        assert_eq!(w.y, 0.0);
        assert_eq!(w.h, 10.0);
    }

    #[test]
    fn test_contains() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.contains(Vec2::new(5.0, 5.0)));
        assert!(!a.contains(Vec2::new(15.0, 5.0)));
    }
}
