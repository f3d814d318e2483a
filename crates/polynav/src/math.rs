//! Plane geometry used by the navmesh.
//!
//! [`Point`] is glam's [`DVec2`]. The in-place `+=`, `-=` and `*=` operators, `length`,
//! `dot` and `distance` come straight from glam. [`PointExt`] adds the handful of
//! operations whose semantics differ from what glam offers out of the box.

use glam::DVec2;

#[cfg(feature = "bevy_reflect")]
use bevy_reflect::prelude::*;

/// A position or direction on the navmesh plane.
pub type Point = DVec2;

/// Polygons whose absolute signed area is at most this fraction of their squared extent
/// (the longer side of their bounding box, squared) are considered degenerate.
pub const AREA_EPSILON: f64 = 1e-9;

/// Extra 2D vector operations on [`Point`].
pub trait PointExt: Copy {
    /// Normalizes the vector in place. Leaves a zero-length vector untouched.
    fn normalize_in_place(&mut self);

    /// The 2D scalar cross product, `self.x * other.y - other.x * self.y`.
    fn cross(self, other: Self) -> f64;

    /// Rotates the vector by +90° and normalizes the result.
    ///
    /// Unlike [`DVec2::perp`], the result has unit length (or is zero for a zero vector).
    fn unit_perp(self) -> Self;

    /// Dot product of [`Self::unit_perp`] with `other`.
    fn unit_perp_dot(self, other: Self) -> f64;

    /// Returns the vector rotated counter-clockwise by `angle` radians.
    fn rotated_by(self, angle: f64) -> Self;

    /// Rotates the vector counter-clockwise by `angle` radians in place.
    fn rotate_by(&mut self, angle: f64);
}

impl PointExt for DVec2 {
    #[inline]
    fn normalize_in_place(&mut self) {
        let length = self.length();
        if length > 0.0 {
            *self /= length;
        }
    }

    #[inline]
    fn cross(self, other: Self) -> f64 {
        self.x * other.y - other.x * self.y
    }

    #[inline]
    fn unit_perp(self) -> Self {
        let mut perp = DVec2::new(-self.y, self.x);
        perp.normalize_in_place();
        perp
    }

    #[inline]
    fn unit_perp_dot(self, other: Self) -> f64 {
        self.unit_perp().dot(other)
    }

    #[inline]
    fn rotated_by(self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        DVec2::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    #[inline]
    fn rotate_by(&mut self, angle: f64) {
        *self = self.rotated_by(angle);
    }
}

/// Arithmetic mean of the given points. Returns [`DVec2::ZERO`] for an empty slice.
pub fn barycenter(points: &[Point]) -> Point {
    if points.is_empty() {
        return DVec2::ZERO;
    }
    let count = points.len() as f64;
    points.iter().fold(DVec2::ZERO, |acc, p| acc + *p / count)
}

/// The midpoint of the segment `a`-`b`.
#[inline]
pub fn midpoint(a: Point, b: Point) -> Point {
    a / 2.0 + b / 2.0
}

/// Signed area of a closed ring (shoelace formula). Positive for counter-clockwise rings.
pub fn signed_area(ring: &[Point]) -> f64 {
    let mut twice_area = 0.0;
    for (i, a) in ring.iter().enumerate() {
        let b = ring[(i + 1) % ring.len()];
        twice_area += a.cross(b);
    }
    twice_area / 2.0
}

/// Even-odd containment test of `point` against a closed ring.
///
/// Points exactly on the boundary may land on either side.
pub fn ring_contains(ring: &[Point], point: Point) -> bool {
    let mut inside = false;
    let mut j = ring.len().wrapping_sub(1);
    for (i, a) in ring.iter().enumerate() {
        let b = ring[j];
        if (a.y > point.y) != (b.y > point.y) {
            let x_at_y = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if point.x < x_at_y {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// A 2D axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bevy_reflect", derive(Reflect))]
pub struct Aabb2d {
    /// The minimum corner.
    pub min: Point,
    /// The maximum corner.
    pub max: Point,
}

impl Aabb2d {
    /// Creates a new AABB from the minimum and maximum corners.
    pub fn new(min: impl Into<Point>, max: impl Into<Point>) -> Self {
        Self {
            min: min.into(),
            max: max.into(),
        }
    }

    /// Computes the AABB of the given points.
    /// Returns `None` if `points` is empty.
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        Some(Self::around(*first, rest))
    }

    /// Computes the AABB of `first` and every point in `rest`.
    pub fn around(first: Point, rest: &[Point]) -> Self {
        let mut aabb = Self::new(first, first);
        for point in rest {
            aabb.min = aabb.min.min(*point);
            aabb.max = aabb.max.max(*point);
        }
        aabb
    }

    /// The longer side of the box.
    #[inline]
    pub fn extent(&self) -> f64 {
        (self.max - self.min).max_element()
    }

    /// Whether the point lies inside or on the boundary of the box.
    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}
