//! Overlap tests for boxes and circles
//!
//! Everything in the arena collides as either an axis-aligned box (top-left
//! corner + size) or a circle (center + radius). All tests are pure and O(1).

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box anchored at its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    /// Box of half-extent `half` centered on `center`
    pub fn from_center(center: Vec2, half: Vec2) -> Self {
        Self {
            min: center - half,
            size: half * 2.0,
        }
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    /// Grow the box by `margin` on every side
    pub fn expanded(&self, margin: f32) -> Self {
        Self {
            min: self.min - Vec2::splat(margin),
            size: self.size + Vec2::splat(margin * 2.0),
        }
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        let max = self.max();
        p.x >= self.min.x && p.x <= max.x && p.y >= self.min.y && p.y <= max.y
    }

    /// Closest point inside the box to `p`
    pub fn clamp_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max())
    }
}

/// A circle given by center and radius
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Tight bounding box around the circle
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.center, Vec2::splat(self.radius))
    }
}

/// Collision shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Box(Aabb),
    Circle(Circle),
}

/// Extents overlap on both axes. Touching edges do not count.
#[inline]
pub fn boxes_overlap(a: &Aabb, b: &Aabb) -> bool {
    let (a_max, b_max) = (a.max(), b.max());
    a.min.x < b_max.x && b.min.x < a_max.x && a.min.y < b_max.y && b.min.y < a_max.y
}

/// Center distance strictly below the sum of radii
#[inline]
pub fn circles_overlap(a: &Circle, b: &Circle) -> bool {
    let reach = a.radius + b.radius;
    a.center.distance_squared(b.center) < reach * reach
}

/// Circle against box via the closest point on the box
#[inline]
pub fn box_circle_overlap(b: &Aabb, c: &Circle) -> bool {
    let closest = b.clamp_point(c.center);
    closest.distance_squared(c.center) < c.radius * c.radius
}

/// Do two shapes overlap?
pub fn intersects(a: &Shape, b: &Shape) -> bool {
    match (a, b) {
        (Shape::Box(a), Shape::Box(b)) => boxes_overlap(a, b),
        (Shape::Circle(a), Shape::Circle(b)) => circles_overlap(a, b),
        (Shape::Box(bx), Shape::Circle(c)) | (Shape::Circle(c), Shape::Box(bx)) => {
            box_circle_overlap(bx, c)
        }
    }
}

/// Points closer than `range` (used for pickup proximity)
#[inline]
pub fn within(a: Vec2, b: Vec2, range: f32) -> bool {
    a.distance_squared(b) < range * range
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_boxes_overlap() {
        let a = Aabb::new(Vec2::ZERO, Vec2::new(10.0, 10.0));
        let b = Aabb::new(Vec2::new(5.0, 5.0), Vec2::new(10.0, 10.0));
        let c = Aabb::new(Vec2::new(20.0, 0.0), Vec2::new(10.0, 10.0));
        assert!(intersects(&Shape::Box(a), &Shape::Box(b)));
        assert!(!intersects(&Shape::Box(a), &Shape::Box(c)));
    }

    #[test]
    fn test_boxes_touching_edges_do_not_overlap() {
        let a = Aabb::new(Vec2::ZERO, Vec2::new(10.0, 10.0));
        let b = Aabb::new(Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0));
        assert!(!boxes_overlap(&a, &b));
    }

    #[test]
    fn test_boxes_overlapping_on_one_axis_only() {
        let a = Aabb::new(Vec2::ZERO, Vec2::new(10.0, 10.0));
        let b = Aabb::new(Vec2::new(5.0, 30.0), Vec2::new(10.0, 10.0));
        assert!(!boxes_overlap(&a, &b));
    }

    #[test]
    fn test_circles_overlap() {
        let a = Circle::new(Vec2::ZERO, 10.0);
        assert!(circles_overlap(&a, &Circle::new(Vec2::new(15.0, 0.0), 6.0)));
        assert!(!circles_overlap(&a, &Circle::new(Vec2::new(16.0, 0.0), 6.0)));
    }

    #[test]
    fn test_box_circle_corner() {
        let b = Aabb::new(Vec2::ZERO, Vec2::new(10.0, 10.0));
        // Diagonal from the corner: distance ~7.07
        let near = Circle::new(Vec2::new(15.0, 15.0), 8.0);
        let far = Circle::new(Vec2::new(15.0, 15.0), 7.0);
        assert!(intersects(&Shape::Box(b), &Shape::Circle(near)));
        assert!(intersects(&Shape::Circle(near), &Shape::Box(b)));
        assert!(!intersects(&Shape::Box(b), &Shape::Circle(far)));
    }

    #[test]
    fn test_within() {
        assert!(within(Vec2::ZERO, Vec2::new(3.0, 4.0), 5.1));
        assert!(!within(Vec2::ZERO, Vec2::new(3.0, 4.0), 5.0));
    }

    #[test]
    fn test_expanded_box() {
        let view = Aabb::new(Vec2::ZERO, Vec2::new(800.0, 600.0));
        let envelope = view.expanded(50.0);
        assert!(!view.contains_point(Vec2::new(-20.0, 10.0)));
        assert!(envelope.contains_point(Vec2::new(-20.0, 10.0)));
        assert!(!envelope.contains_point(Vec2::new(-60.0, 10.0)));
    }

    proptest! {
        #[test]
        fn prop_intersects_is_symmetric(
            ax in -500.0f32..500.0, ay in -500.0f32..500.0, ar in 0.5f32..80.0,
            bx in -500.0f32..500.0, by in -500.0f32..500.0, bw in 0.5f32..80.0, bh in 0.5f32..80.0,
        ) {
            let c = Shape::Circle(Circle::new(Vec2::new(ax, ay), ar));
            let b = Shape::Box(Aabb::new(Vec2::new(bx, by), Vec2::new(bw, bh)));
            prop_assert_eq!(intersects(&c, &b), intersects(&b, &c));
        }

        #[test]
        fn prop_circle_overlap_implies_bounds_overlap(
            ax in -500.0f32..500.0, ay in -500.0f32..500.0, ar in 0.5f32..80.0,
            bx in -500.0f32..500.0, by in -500.0f32..500.0, br in 0.5f32..80.0,
        ) {
            let a = Circle::new(Vec2::new(ax, ay), ar);
            let b = Circle::new(Vec2::new(bx, by), br);
            if circles_overlap(&a, &b) {
                prop_assert!(boxes_overlap(&a.bounds(), &b.bounds()));
            }
        }
    }
}
