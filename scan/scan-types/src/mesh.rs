//! Indexed triangle mesh produced by reconstruction.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Aabb, MeshError};

/// An indexed triangle mesh with optional per-vertex normals.
///
/// Vertices keep the order of the point cloud they came from, so vertex `i`
/// is input point `i`. Faces reference vertices by index.
///
/// # Winding Order
///
/// When reconstruction had camera poses, faces wind counter-clockwise as
/// seen from the capturing camera, so the right-hand-rule normal points
/// toward it. Without poses the winding is arbitrary but every face is
/// still a valid index triple.
///
/// # Example
///
/// ```
/// use scan_types::{ScanMesh, Point3};
///
/// let mut mesh = ScanMesh::from_points([
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ]);
/// mesh.faces.push([0, 1, 2]);
///
/// assert_eq!(mesh.vertex_count(), 3);
/// assert_eq!(mesh.face_count(), 1);
/// assert!((mesh.face_area(0).unwrap() - 0.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScanMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3<f64>>,

    /// One unit normal per vertex, when the normal stage ran.
    pub normals: Option<Vec<Vector3<f64>>>,

    /// Triangle faces as indices into `vertices`.
    pub faces: Vec<[u32; 3]>,
}

impl ScanMesh {
    /// Create a new empty mesh.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            normals: None,
            faces: Vec::new(),
        }
    }

    /// A face-less mesh holding the given points as vertices.
    ///
    /// This is the valid degenerate output for inputs too small to
    /// triangulate.
    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = Point3<f64>>) -> Self {
        Self {
            vertices: points.into_iter().collect(),
            normals: None,
            faces: Vec::new(),
        }
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// True if there are no faces.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// True if per-vertex normals are present.
    #[must_use]
    pub const fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    /// Bounding box of the vertices, `None` if there are none.
    #[must_use]
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::try_from_points(self.vertices.iter())
    }

    /// The three corner positions of a face.
    ///
    /// Returns `None` if the face or one of its indices is out of range.
    #[must_use]
    pub fn face_corners(&self, face: usize) -> Option<[Point3<f64>; 3]> {
        let [a, b, c] = *self.faces.get(face)?;
        Some([
            *self.vertices.get(a as usize)?,
            *self.vertices.get(b as usize)?,
            *self.vertices.get(c as usize)?,
        ])
    }

    /// Unnormalized right-hand-rule normal of a face (length = 2 × area).
    #[must_use]
    pub fn face_normal(&self, face: usize) -> Option<Vector3<f64>> {
        let [a, b, c] = self.face_corners(face)?;
        Some((b - a).cross(&(c - a)))
    }

    /// Area of a face.
    #[must_use]
    pub fn face_area(&self, face: usize) -> Option<f64> {
        self.face_normal(face).map(|n| 0.5 * n.norm())
    }

    /// Checks structural invariants: every face index is in range and the
    /// normal list (if any) matches the vertex count.
    ///
    /// # Errors
    ///
    /// Returns the first [`MeshError`] found.
    pub fn validate(&self) -> Result<(), MeshError> {
        let vertex_count = self.vertices.len();

        if let Some(normals) = &self.normals {
            if normals.len() != vertex_count {
                return Err(MeshError::NormalCountMismatch {
                    normal_count: normals.len(),
                    vertex_count,
                });
            }
        }

        for (face, indices) in self.faces.iter().enumerate() {
            if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(MeshError::IndexOutOfBounds {
                    face,
                    index,
                    vertex_count,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn right_triangle() -> ScanMesh {
        let mut mesh = ScanMesh::from_points([
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]);
        mesh.faces.push([0, 1, 2]);
        mesh
    }

    #[test]
    fn test_from_points_is_degenerate() {
        let mesh = ScanMesh::from_points([Point3::origin(), Point3::new(1.0, 0.0, 0.0)]);
        assert_eq!(mesh.vertex_count(), 2);
        assert!(mesh.is_empty());
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_face_normal_right_hand_rule() {
        let mesh = right_triangle();
        assert_relative_eq!(mesh.face_normal(0).unwrap(), Vector3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(mesh.face_area(0).unwrap(), 0.5);
        assert!(mesh.face_normal(1).is_none());
    }

    #[test]
    fn test_validate_catches_bad_index() {
        let mut mesh = right_triangle();
        mesh.faces.push([0, 1, 3]);
        assert_eq!(
            mesh.validate(),
            Err(MeshError::IndexOutOfBounds {
                face: 1,
                index: 3,
                vertex_count: 3,
            })
        );
        assert!(mesh.face_corners(1).is_none());
    }

    #[test]
    fn test_validate_catches_normal_mismatch() {
        let mut mesh = right_triangle();
        mesh.normals = Some(vec![Vector3::y()]);
        assert!(matches!(
            mesh.validate(),
            Err(MeshError::NormalCountMismatch { .. })
        ));

        mesh.normals = Some(vec![Vector3::y(); 3]);
        assert!(mesh.validate().is_ok());
        assert!(mesh.has_normals());
    }

    #[test]
    fn test_bounds() {
        let mesh = right_triangle();
        let bounds = mesh.bounds().unwrap();
        assert_relative_eq!(bounds.max, Point3::new(1.0, 1.0, 0.0));
        assert!(ScanMesh::new().bounds().is_none());
    }
}
