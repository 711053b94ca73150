//! Point samples delivered by the frame collaborator.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::CameraPose;

/// A world-space point observed during a scan.
///
/// Feature points carry only a position. Raycast (hit-test) samples usually
/// also carry a surface normal, and any sample may remember the camera pose
/// that was active when it was observed.
///
/// # Example
///
/// ```
/// use scan_types::{CameraPose, PointSample, Point3, Vector3};
///
/// let sample = PointSample::with_normal(Point3::new(0.0, 0.0, -1.0), Vector3::new(0.0, 2.0, 0.0))
///     .with_pose(CameraPose::default());
///
/// // Normals are stored unit length
/// assert!((sample.normal.unwrap().norm() - 1.0).abs() < 1e-12);
/// assert!(sample.source_pose.is_some());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PointSample {
    /// World-space position.
    pub position: Point3<f64>,

    /// Optional unit surface normal.
    pub normal: Option<Vector3<f64>>,

    /// Camera-to-world transform active when the point was observed.
    pub source_pose: Option<CameraPose>,
}

impl PointSample {
    /// A bare position.
    #[must_use]
    pub const fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            normal: None,
            source_pose: None,
        }
    }

    /// A bare position from coordinates.
    #[must_use]
    pub const fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }

    /// A position with a surface normal.
    ///
    /// The normal is normalized; zero-length or non-finite normals are
    /// dropped rather than stored.
    #[must_use]
    pub fn with_normal(position: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self {
            position,
            normal: unit_or_none(normal),
            source_pose: None,
        }
    }

    /// Returns this sample tagged with the given camera pose.
    #[must_use]
    pub const fn with_pose(mut self, pose: CameraPose) -> Self {
        self.source_pose = Some(pose);
        self
    }

    /// True if a normal is present.
    #[must_use]
    pub const fn has_normal(&self) -> bool {
        self.normal.is_some()
    }

    /// True if a source pose is present.
    #[must_use]
    pub const fn has_pose(&self) -> bool {
        self.source_pose.is_some()
    }
}

impl From<Point3<f64>> for PointSample {
    fn from(position: Point3<f64>) -> Self {
        Self::new(position)
    }
}

fn unit_or_none(v: Vector3<f64>) -> Option<Vector3<f64>> {
    let norm = v.norm();
    if norm.is_finite() && norm > 1e-12 {
        Some(v / norm)
    } else {
        None
    }
}

/// One frame's worth of samples.
///
/// The collaborator may tag the whole batch with the pose active at capture
/// time instead of tagging each sample.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PointBatch {
    /// Samples in acquisition order.
    pub samples: Vec<PointSample>,

    /// Pose applied to every sample that has none of its own.
    pub pose: Option<CameraPose>,
}

impl PointBatch {
    /// A batch without a frame pose.
    #[must_use]
    pub const fn new(samples: Vec<PointSample>) -> Self {
        Self {
            samples,
            pose: None,
        }
    }

    /// A batch captured under `pose`.
    #[must_use]
    pub const fn with_pose(samples: Vec<PointSample>, pose: CameraPose) -> Self {
        Self {
            samples,
            pose: Some(pose),
        }
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True if the batch has no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Flattens the batch, tagging untagged samples with the batch pose.
    #[must_use]
    pub fn into_samples(self) -> Vec<PointSample> {
        let Self { mut samples, pose } = self;
        if let Some(pose) = pose {
            for sample in samples.iter_mut().filter(|s| s.source_pose.is_none()) {
                sample.source_pose = Some(pose);
            }
        }
        samples
    }
}

/// Keeps every `n`th item (the first always survives).
///
/// Frame sources call this before handing raw per-frame points over, so the
/// accumulator's throughput stays independent of frame rate. `n == 0` is
/// treated as 1.
///
/// ```
/// use scan_types::subsample_every_nth;
///
/// let kept = subsample_every_nth((0..10).collect::<Vec<_>>(), 3);
/// assert_eq!(kept, vec![0, 3, 6, 9]);
/// ```
#[must_use]
pub fn subsample_every_nth<T>(items: impl IntoIterator<Item = T>, n: usize) -> Vec<T> {
    items.into_iter().step_by(n.max(1)).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_has_no_attributes() {
        let sample = PointSample::from_coords(1.0, 2.0, 3.0);
        assert!(!sample.has_normal());
        assert!(!sample.has_pose());
        assert_relative_eq!(sample.position, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_with_normal_normalizes() {
        let sample = PointSample::with_normal(Point3::origin(), Vector3::new(3.0, 0.0, 4.0));
        assert_relative_eq!(sample.normal.unwrap(), Vector3::new(0.6, 0.0, 0.8));
    }

    #[test]
    fn test_with_normal_drops_degenerate() {
        let zero = PointSample::with_normal(Point3::origin(), Vector3::zeros());
        assert!(!zero.has_normal());

        let nan = PointSample::with_normal(Point3::origin(), Vector3::new(f64::NAN, 1.0, 0.0));
        assert!(!nan.has_normal());
    }

    #[test]
    fn test_batch_pose_tags_untagged_samples() {
        let own = CameraPose::look_at(Point3::new(0.0, 0.0, 1.0), Point3::origin(), Vector3::y());
        let batch_pose = CameraPose::default();

        let batch = PointBatch::with_pose(
            vec![
                PointSample::from_coords(0.0, 0.0, 0.0),
                PointSample::from_coords(1.0, 0.0, 0.0).with_pose(own),
            ],
            batch_pose,
        );
        assert_eq!(batch.len(), 2);

        let samples = batch.into_samples();
        assert_eq!(samples[0].source_pose, Some(batch_pose));
        assert_eq!(samples[1].source_pose, Some(own));
    }

    #[test]
    fn test_batch_without_pose_is_passthrough() {
        let batch = PointBatch::new(vec![PointSample::from_coords(0.0, 0.0, 0.0)]);
        let samples = batch.into_samples();
        assert!(samples[0].source_pose.is_none());
        assert!(PointBatch::default().is_empty());
    }

    #[test]
    fn test_subsample_zero_keeps_everything() {
        assert_eq!(subsample_every_nth(vec![1, 2, 3], 0), vec![1, 2, 3]);
        assert!(subsample_every_nth(Vec::<u8>::new(), 4).is_empty());
    }
}
