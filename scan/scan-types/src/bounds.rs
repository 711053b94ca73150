//! Axis-aligned bounding box.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box (AABB).
///
/// Supports both ways the scan pipeline needs bounds:
///
/// - **Incremental**: start from [`Aabb::empty`] and call
///   [`Aabb::expand_to_include`] as points arrive (running min/max).
/// - **One pass**: [`Aabb::from_points`] over a finished point set.
///
/// # Example
///
/// ```
/// use scan_types::{Aabb, Point3};
///
/// let mut running = Aabb::empty();
/// running.expand_to_include(&Point3::new(0.0, 1.0, 0.0));
/// running.expand_to_include(&Point3::new(2.0, -1.0, 3.0));
///
/// let points = [Point3::new(0.0, 1.0, 0.0), Point3::new(2.0, -1.0, 3.0)];
/// assert_eq!(running, Aabb::from_points(points.iter()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// Minimum corner (smallest x, y, z values).
    pub min: Point3<f64>,
    /// Maximum corner (largest x, y, z values).
    pub max: Point3<f64>,
}

impl Aabb {
    /// Create a new AABB from two corners.
    ///
    /// The corners are reordered per axis, so `min <= max` always holds.
    #[must_use]
    pub fn new(a: Point3<f64>, b: Point3<f64>) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Create a zero-volume AABB around a single point.
    #[inline]
    #[must_use]
    pub const fn from_point(point: Point3<f64>) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Create an empty (inverted) AABB, the identity for expansion.
    ///
    /// ```
    /// use scan_types::{Aabb, Point3};
    ///
    /// let mut aabb = Aabb::empty();
    /// assert!(aabb.is_empty());
    /// aabb.expand_to_include(&Point3::new(1.0, 2.0, 3.0));
    /// assert!(!aabb.is_empty());
    /// ```
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Compute the AABB of a point set in one pass.
    ///
    /// Returns an empty AABB if the iterator is empty.
    #[must_use]
    pub fn from_points<'a>(points: impl Iterator<Item = &'a Point3<f64>>) -> Self {
        let mut aabb = Self::empty();
        for point in points {
            aabb.expand_to_include(point);
        }
        aabb
    }

    /// Like [`Aabb::from_points`], but `None` for an empty point set.
    #[must_use]
    pub fn try_from_points<'a>(points: impl Iterator<Item = &'a Point3<f64>>) -> Option<Self> {
        let aabb = Self::from_points(points);
        if aabb.is_empty() {
            None
        } else {
            Some(aabb)
        }
    }

    /// Check if the AABB is empty (min > max on any axis).
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Width, height and depth of the box.
    #[inline]
    #[must_use]
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Center of the box.
    #[inline]
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Check if the AABB contains a point (boundary inclusive).
    #[inline]
    #[must_use]
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Grow the AABB to include a point (running min/max).
    pub fn expand_to_include(&mut self, point: &Point3<f64>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    /// Corners as plain arrays, the shape used by JSON summaries.
    #[must_use]
    pub fn to_arrays(&self) -> ([f64; 3], [f64; 3]) {
        (
            [self.min.x, self.min.y, self.min.z],
            [self.max.x, self.max.y, self.max.z],
        )
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_reorders_corners() {
        let aabb = Aabb::new(Point3::new(1.0, -1.0, 5.0), Point3::new(0.0, 2.0, 3.0));
        assert_eq!(aabb.min, Point3::new(0.0, -1.0, 3.0));
        assert_eq!(aabb.max, Point3::new(1.0, 2.0, 5.0));
    }

    #[test]
    fn test_incremental_matches_one_pass() {
        let points = [
            Point3::new(0.3, -0.2, 0.1),
            Point3::new(-1.0, 0.5, 0.0),
            Point3::new(0.0, 0.0, 2.0),
        ];

        let mut running = Aabb::empty();
        for p in &points {
            running.expand_to_include(p);
        }

        assert_eq!(running, Aabb::from_points(points.iter()));
    }

    #[test]
    fn test_try_from_points_empty() {
        let points: Vec<Point3<f64>> = Vec::new();
        assert!(Aabb::try_from_points(points.iter()).is_none());
        assert!(Aabb::default().is_empty());
    }

    #[test]
    fn test_size_center_contains() {
        let aabb = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 4.0, 6.0));
        assert_relative_eq!(aabb.size(), Vector3::new(2.0, 4.0, 6.0));
        assert_relative_eq!(aabb.center(), Point3::new(1.0, 2.0, 3.0));
        assert!(aabb.contains(&Point3::new(2.0, 4.0, 6.0)));
        assert!(!aabb.contains(&Point3::new(2.1, 0.0, 0.0)));
    }

    #[test]
    fn test_single_point_is_not_empty() {
        let aabb = Aabb::from_point(Point3::new(1.0, 1.0, 1.0));
        assert!(!aabb.is_empty());
        assert_relative_eq!(aabb.size().norm(), 0.0);
    }

    #[test]
    fn test_to_arrays() {
        let aabb = Aabb::new(Point3::new(-1.0, 0.0, 1.0), Point3::new(1.0, 2.0, 3.0));
        let (min, max) = aabb.to_arrays();
        assert_eq!(min, [-1.0, 0.0, 1.0]);
        assert_eq!(max, [1.0, 2.0, 3.0]);
    }
}
