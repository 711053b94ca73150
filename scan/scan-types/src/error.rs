//! Error types for scan data validation.

use thiserror::Error;

/// Reasons a camera pose is rejected as non-rigid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PoseError {
    /// The matrix contains `NaN` or infinite entries.
    #[error("pose contains non-finite values")]
    NonFinite,

    /// The bottom row is not `[0, 0, 0, 1]`.
    #[error("pose is not affine: bottom row deviates by {deviation:.3e}")]
    NotAffine {
        /// Largest absolute deviation from `[0, 0, 0, 1]`.
        deviation: f64,
    },

    /// The rotation block is not orthonormal.
    #[error("pose rotation is not orthonormal: deviation {deviation:.3e} exceeds {tolerance:.3e}")]
    NotOrthonormal {
        /// Largest absolute entry of `RᵀR - I`.
        deviation: f64,
        /// Tolerance that was applied.
        tolerance: f64,
    },

    /// The rotation block is a reflection (determinant is not +1).
    #[error("pose rotation has determinant {determinant:.4}, expected +1")]
    Reflection {
        /// Determinant of the rotation block.
        determinant: f64,
    },
}

/// Structural problems found by [`ScanMesh::validate`](crate::ScanMesh::validate).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshError {
    /// A face references a vertex that does not exist.
    #[error("face {face} references vertex {index}, but mesh has {vertex_count} vertices")]
    IndexOutOfBounds {
        /// Face index.
        face: usize,
        /// Offending vertex index.
        index: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// Per-vertex normals do not match the vertex count.
    #[error("mesh has {normal_count} normals for {vertex_count} vertices")]
    NormalCountMismatch {
        /// Number of normals.
        normal_count: usize,
        /// Number of vertices.
        vertex_count: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pose_error_display() {
        let err = PoseError::Reflection { determinant: -1.0 };
        assert_eq!(
            format!("{err}"),
            "pose rotation has determinant -1.0000, expected +1"
        );
        assert_eq!(
            format!("{}", PoseError::NonFinite),
            "pose contains non-finite values"
        );
    }

    #[test]
    fn test_mesh_error_display() {
        let err = MeshError::IndexOutOfBounds {
            face: 2,
            index: 9,
            vertex_count: 4,
        };
        assert_eq!(
            format!("{err}"),
            "face 2 references vertex 9, but mesh has 4 vertices"
        );
    }
}
