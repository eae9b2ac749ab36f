//! # Axis-Aligned Bounding Boxes
//!
//! World-space bounds used to frame the camera on loaded models and to size
//! the scene. An empty box has `min > max` on every axis and absorbs nothing
//! until the first point is added.

use cgmath::{EuclideanSpace, Matrix4, Point3, Transform, Vector3};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vector3<f32>,
    /// Maximum corner of the bounding box
    pub max: Vector3<f32>,
}

impl Aabb {
    /// Create a new AABB
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// A box containing nothing
    pub fn empty() -> Self {
        Self {
            min: Vector3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Vector3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    /// Create AABB from a set of points
    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a [f32; 3]>,
    {
        let mut aabb = Self::empty();
        for p in points {
            aabb.expand(Vector3::new(p[0], p[1], p[2]));
        }
        aabb
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Grows the box to contain `point`
    pub fn expand(&mut self, point: Vector3<f32>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        if other.is_empty() {
            return *self;
        }
        if self.is_empty() {
            return *other;
        }
        let mut merged = *self;
        merged.expand(other.min);
        merged.expand(other.max);
        merged
    }

    /// Edge lengths; zero for an empty box
    pub fn size(&self) -> Vector3<f32> {
        if self.is_empty() {
            return Vector3::new(0.0, 0.0, 0.0);
        }
        self.max - self.min
    }

    pub fn center(&self) -> Vector3<f32> {
        if self.is_empty() {
            return Vector3::new(0.0, 0.0, 0.0);
        }
        (self.min + self.max) * 0.5
    }

    pub fn max_dimension(&self) -> f32 {
        let size = self.size();
        size.x.max(size.y).max(size.z)
    }

    /// Bounds of this box after applying `transform`, computed from its eight corners
    pub fn transformed(&self, transform: &Matrix4<f32>) -> Aabb {
        if self.is_empty() {
            return *self;
        }
        let mut out = Aabb::empty();
        for i in 0..8 {
            let corner = Point3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            out.expand(transform.transform_point(corner).to_vec());
        }
        out
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, InnerSpace, Matrix4};

    #[test]
    fn test_aabb_from_points() {
        let points = vec![[0.0, 0.0, 0.0], [1.0, 2.0, 1.0], [-1.0, -1.0, -3.0]];
        let aabb = Aabb::from_points(&points);

        assert_eq!(aabb.min, Vector3::new(-1.0, -1.0, -3.0));
        assert_eq!(aabb.max, Vector3::new(1.0, 2.0, 1.0));
        assert_eq!(aabb.size(), Vector3::new(2.0, 3.0, 4.0));
        assert_eq!(aabb.center(), Vector3::new(0.0, 0.5, -1.0));
        assert_eq!(aabb.max_dimension(), 4.0);
    }

    #[test]
    fn test_empty_aabb() {
        let aabb = Aabb::empty();
        assert!(aabb.is_empty());
        assert_eq!(aabb.size(), Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(aabb.max_dimension(), 0.0);

        let points: Vec<[f32; 3]> = Vec::new();
        assert!(Aabb::from_points(&points).is_empty());
    }

    #[test]
    fn test_union_ignores_empty() {
        let a = Aabb::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(a.union(&Aabb::empty()), a);
        assert_eq!(Aabb::empty().union(&a), a);

        let b = Aabb::new(Vector3::new(-2.0, 0.5, 0.0), Vector3::new(0.0, 3.0, 0.5));
        let merged = a.union(&b);
        assert_eq!(merged.min, Vector3::new(-2.0, 0.0, 0.0));
        assert_eq!(merged.max, Vector3::new(1.0, 3.0, 1.0));
    }

    #[test]
    fn test_transformed_bounds() {
        let unit = Aabb::new(Vector3::new(-0.5, -0.5, -0.5), Vector3::new(0.5, 0.5, 0.5));

        let moved = unit.transformed(
            &(Matrix4::from_translation(Vector3::new(-12.0, 3.0, -10.0)) * Matrix4::from_scale(3.0)),
        );
        assert!((moved.min - Vector3::new(-13.5, 1.5, -11.5)).magnitude2() < 1e-6);
        assert!((moved.max - Vector3::new(-10.5, 4.5, -8.5)).magnitude2() < 1e-6);

        // A quarter turn around Y swaps the X and Z extents
        let slab = Aabb::new(Vector3::new(-2.0, 0.0, -1.0), Vector3::new(2.0, 1.0, 1.0));
        let turned = slab.transformed(&Matrix4::from_angle_y(Deg(90.0)));
        assert!((turned.size() - Vector3::new(2.0, 1.0, 4.0)).magnitude2() < 1e-5);
    }
}
