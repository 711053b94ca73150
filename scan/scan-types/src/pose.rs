//! Camera poses supplied by the AR session.

use nalgebra::{Isometry3, Matrix3, Matrix4, Point3, Rotation3, Translation3, UnitQuaternion, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::PoseError;

/// Default tolerance for [`CameraPose::validate`].
pub(crate) const DEFAULT_RIGIDITY_TOLERANCE: f64 = 1e-3;

/// A camera-to-world transform, as delivered by the AR frame collaborator.
///
/// The matrix is stored verbatim so malformed input survives until someone
/// asks whether it is rigid. Cameras look down their local **-Z** axis and
/// the world is Y-up.
///
/// # Example
///
/// ```
/// use scan_types::{CameraPose, Point3, Vector3};
///
/// // Camera one meter above the origin, looking straight down.
/// let pose = CameraPose::look_at(
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::origin(),
///     Vector3::new(0.0, 0.0, -1.0),
/// );
///
/// assert!(pose.is_rigid());
/// assert!((pose.forward() - Vector3::new(0.0, -1.0, 0.0)).norm() < 1e-9);
/// assert!((pose.position().y - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CameraPose {
    matrix: Matrix4<f64>,
}

impl CameraPose {
    /// Wraps a raw 4×4 camera-to-world matrix without validating it.
    #[must_use]
    pub const fn from_matrix(matrix: Matrix4<f64>) -> Self {
        Self { matrix }
    }

    /// Creates a pose from a rigid isometry.
    #[must_use]
    pub fn from_isometry(isometry: &Isometry3<f64>) -> Self {
        Self {
            matrix: isometry.to_homogeneous(),
        }
    }

    /// Creates a pose from a camera position and orientation.
    #[must_use]
    pub fn from_position_rotation(position: Point3<f64>, rotation: UnitQuaternion<f64>) -> Self {
        Self::from_isometry(&Isometry3::from_parts(
            Translation3::from(position.coords),
            rotation,
        ))
    }

    /// Creates a pose for a camera at `eye` looking toward `target`.
    ///
    /// `up` must not be parallel to the viewing direction.
    #[must_use]
    pub fn look_at(eye: Point3<f64>, target: Point3<f64>, up: Vector3<f64>) -> Self {
        // look_at_rh builds world-to-camera with the camera looking down -Z
        Self::from_isometry(&Isometry3::look_at_rh(&eye, &target, &up).inverse())
    }

    /// The raw matrix.
    #[must_use]
    pub const fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    /// Camera position in world space (translation column).
    #[must_use]
    pub fn position(&self) -> Point3<f64> {
        Point3::new(self.matrix[(0, 3)], self.matrix[(1, 3)], self.matrix[(2, 3)])
    }

    /// Upper-left 3×3 block.
    #[must_use]
    pub fn rotation_block(&self) -> Matrix3<f64> {
        self.matrix.fixed_view::<3, 3>(0, 0).into_owned()
    }

    /// World-space viewing direction (the camera's -Z axis).
    #[must_use]
    pub fn forward(&self) -> Vector3<f64> {
        -Vector3::new(self.matrix[(0, 2)], self.matrix[(1, 2)], self.matrix[(2, 2)])
    }

    /// Checks that the matrix is a rigid transform and returns it as an isometry.
    ///
    /// # Errors
    ///
    /// Returns a [`PoseError`] describing the first violated property:
    /// non-finite entries, a non-affine bottom row, a non-orthonormal
    /// rotation block, or a reflection.
    pub fn validate(&self, tolerance: f64) -> Result<Isometry3<f64>, PoseError> {
        if self.matrix.iter().any(|v| !v.is_finite()) {
            return Err(PoseError::NonFinite);
        }

        let bottom = [
            self.matrix[(3, 0)],
            self.matrix[(3, 1)],
            self.matrix[(3, 2)],
            self.matrix[(3, 3)] - 1.0,
        ];
        let deviation = bottom.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        if deviation > tolerance {
            return Err(PoseError::NotAffine { deviation });
        }

        let rotation = self.rotation_block();
        let deviation = (rotation.transpose() * rotation - Matrix3::identity()).amax();
        if deviation > tolerance {
            return Err(PoseError::NotOrthonormal {
                deviation,
                tolerance,
            });
        }

        let determinant = rotation.determinant();
        if (determinant - 1.0).abs() > tolerance {
            return Err(PoseError::Reflection { determinant });
        }

        let rotation = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(rotation));
        Ok(Isometry3::from_parts(
            Translation3::from(self.position().coords),
            rotation,
        ))
    }

    /// True if [`CameraPose::validate`] passes with the default tolerance.
    #[must_use]
    pub fn is_rigid(&self) -> bool {
        self.validate(DEFAULT_RIGIDITY_TOLERANCE).is_ok()
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::from_matrix(Matrix4::identity())
    }
}

impl From<Isometry3<f64>> for CameraPose {
    fn from(isometry: Isometry3<f64>) -> Self {
        Self::from_isometry(&isometry)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_identity_is_rigid() {
        let pose = CameraPose::default();
        assert!(pose.is_rigid());
        assert_relative_eq!(pose.forward(), -Vector3::z());
        assert_relative_eq!(pose.position(), Point3::origin());
    }

    #[test]
    fn test_look_down_forward() {
        let pose = CameraPose::look_at(
            Point3::new(0.5, 2.0, -0.5),
            Point3::new(0.5, 0.0, -0.5),
            Vector3::z(),
        );
        assert!(pose.is_rigid());
        assert_relative_eq!(pose.forward(), -Vector3::y(), epsilon = 1e-12);
        assert_relative_eq!(pose.position(), Point3::new(0.5, 2.0, -0.5), epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_about_x() {
        let rotation = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -FRAC_PI_2);
        let pose = CameraPose::from_position_rotation(Point3::new(0.0, 1.0, 0.0), rotation);
        assert_relative_eq!(pose.forward(), -Vector3::y(), epsilon = 1e-12);
    }

    #[test]
    fn test_validate_returns_isometry() {
        let rotation = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 0.3);
        let pose = CameraPose::from_position_rotation(Point3::new(1.0, 2.0, 3.0), rotation);
        let iso = pose.validate(1e-6).unwrap();
        assert_relative_eq!(iso.translation.vector, Vector3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(iso.rotation.angle(), 0.3, epsilon = 1e-9);
    }

    #[test]
    fn test_rejects_nan() {
        let mut m = Matrix4::identity();
        m[(0, 0)] = f64::NAN;
        let pose = CameraPose::from_matrix(m);
        assert_eq!(pose.validate(1e-3), Err(PoseError::NonFinite));
    }

    #[test]
    fn test_rejects_projective_row() {
        let mut m = Matrix4::identity();
        m[(3, 2)] = 0.5;
        let pose = CameraPose::from_matrix(m);
        assert!(matches!(
            pose.validate(1e-3),
            Err(PoseError::NotAffine { .. })
        ));
    }

    #[test]
    fn test_rejects_scaled_rotation() {
        let mut m = Matrix4::identity();
        m[(0, 0)] = 2.0;
        let pose = CameraPose::from_matrix(m);
        assert!(matches!(
            pose.validate(1e-3),
            Err(PoseError::NotOrthonormal { .. })
        ));
        assert!(!pose.is_rigid());
    }

    #[test]
    fn test_rejects_reflection() {
        let mut m = Matrix4::identity();
        m[(0, 0)] = -1.0;
        let pose = CameraPose::from_matrix(m);
        assert!(matches!(
            pose.validate(1e-3),
            Err(PoseError::Reflection { .. })
        ));
    }
}
