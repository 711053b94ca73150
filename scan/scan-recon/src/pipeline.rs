//! The full reconstruction pass run when a scan stops.
//!
//! Stages, in order: outlier filter, normal resolution, triangulation and
//! (optionally) shape detection. Every stage degrades instead of failing, so
//! [`reconstruct`] always returns a valid result.

use std::time::{Duration, Instant};

use nalgebra::Point3;
use scan_types::{Aabb, PointSample, ScanMesh, ShapeDetection};
use tracing::debug;

use crate::normals::resolve_normals;
use crate::outlier::filter_outliers;
use crate::params::PipelineParams;
use crate::shape::detect_shapes;
use crate::triangulate::{triangulate, TriangulationMode};

/// Per-stage counters of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Samples handed to the pipeline.
    pub input_points: usize,
    /// Samples left after outlier filtering.
    pub filtered_points: usize,
    /// True if the outlier filter fell back to the unfiltered cloud.
    pub filter_fail_open: bool,
    /// True if the cloud was too small to filter.
    pub filter_skipped: bool,
    /// Normals taken from the samples.
    pub supplied_normals: usize,
    /// Normals estimated from neighbours.
    pub estimated_normals: usize,
    /// Candidate triangles examined.
    pub candidates_tested: usize,
    /// True if the face cap was hit.
    pub faces_capped: bool,
    /// Wall time of the whole run.
    pub elapsed: Duration,
}

/// Output of a reconstruction pass.
#[derive(Debug, Clone)]
pub struct Reconstruction {
    /// Triangle mesh with per-vertex normals.
    pub mesh: ScanMesh,

    /// Bounds of the mesh vertices, `None` for an empty scan.
    pub bounds: Option<Aabb>,

    /// Detected shapes (empty if detection is disabled).
    pub shapes: Vec<ShapeDetection>,

    /// Triangulation strategy used.
    pub mode: TriangulationMode,

    /// Stage counters.
    pub stats: PipelineStats,
}

impl Reconstruction {
    /// `(vertex_count, face_count)` of the mesh.
    #[must_use]
    pub fn summary_counts(&self) -> (usize, usize) {
        (self.mesh.vertex_count(), self.mesh.face_count())
    }

    /// True if no faces were produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mesh.is_empty()
    }
}

impl std::fmt::Display for Reconstruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (vertices, faces) = self.summary_counts();
        write!(
            f,
            "Reconstruction ({}): {} → {} points, {} vertices, {} faces, {} shapes in {:.1?}",
            self.mode,
            self.stats.input_points,
            self.stats.filtered_points,
            vertices,
            faces,
            self.shapes.len(),
            self.stats.elapsed
        )
    }
}

/// Runs every stage over `samples`.
///
/// # Example
///
/// ```
/// use scan_recon::{reconstruct, PipelineParams};
/// use scan_types::PointSample;
///
/// let samples: Vec<_> = (0..100)
///     .map(|i| PointSample::from_coords(f64::from(i % 10) * 0.03, 0.0, f64::from(i / 10) * 0.03))
///     .collect();
///
/// let result = reconstruct(&samples, &PipelineParams::default());
/// assert!(result.mesh.face_count() > 0);
/// assert!(result.mesh.has_normals());
/// ```
#[must_use]
pub fn reconstruct(samples: &[PointSample], params: &PipelineParams) -> Reconstruction {
    let start = Instant::now();
    let strategy = params.neighbor_strategy;

    let filtered = filter_outliers(samples, &params.outlier, strategy);
    let normals = resolve_normals(&filtered.points, &params.normals, strategy);
    let triangulation = triangulate(
        &filtered.points,
        &params.triangulation,
        strategy,
        params.pose_tolerance,
    );

    let mut mesh = triangulation.mesh;
    mesh.normals = Some(normals.normals);

    let shapes = if params.shapes.enabled {
        let positions: Vec<Point3<f64>> = filtered.points.iter().map(|s| s.position).collect();
        detect_shapes(&positions, &params.shapes, strategy)
    } else {
        Vec::new()
    };

    let stats = PipelineStats {
        input_points: samples.len(),
        filtered_points: filtered.points.len(),
        filter_fail_open: filtered.fail_open,
        filter_skipped: filtered.skipped,
        supplied_normals: normals.supplied,
        estimated_normals: normals.estimated,
        candidates_tested: triangulation.candidates_tested,
        faces_capped: triangulation.faces_capped,
        elapsed: start.elapsed(),
    };

    let result = Reconstruction {
        bounds: mesh.bounds(),
        mesh,
        shapes,
        mode: triangulation.mode,
        stats,
    };
    debug!("{result}");
    result
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::params::ShapeParams;
    use nalgebra::Vector3;
    use scan_types::CameraPose;

    fn floor(n: i32, spacing: f64) -> Vec<PointSample> {
        (0..n * n)
            .map(|i| {
                PointSample::from_coords(
                    f64::from(i % n) * spacing,
                    f64::from((i * 3) % 7) * 0.001,
                    f64::from(i / n) * spacing,
                )
            })
            .collect()
    }

    #[test]
    fn test_empty_input() {
        let result = reconstruct(&[], &PipelineParams::default());
        assert_eq!(result.mode, TriangulationMode::Degenerate);
        assert!(result.bounds.is_none());
        assert!(result.is_empty());
        assert_eq!(result.summary_counts(), (0, 0));
        assert_eq!(result.mesh.normals, Some(Vec::new()));
    }

    #[test]
    fn test_posed_floor_is_pose_aware() {
        let pose = CameraPose::look_at(Point3::new(0.1, 1.0, 0.1), Point3::new(0.1, 0.0, 0.1), Vector3::z());
        let samples: Vec<_> = floor(8, 0.03).into_iter().map(|s| s.with_pose(pose)).collect();

        let result = reconstruct(&samples, &PipelineParams::default());
        assert_eq!(result.mode, TriangulationMode::PoseAware);
        assert!(result.mesh.face_count() > 0);
        assert!(result.mesh.validate().is_ok());
        assert_eq!(result.stats.input_points, 64);
        assert_eq!(result.stats.estimated_normals, result.mesh.vertex_count());
    }

    #[test]
    fn test_stats_record_outliers() {
        let mut samples = floor(8, 0.03);
        samples.push(PointSample::from_coords(4.0, 4.0, 4.0));

        let params = PipelineParams::default().with_shapes(ShapeParams::disabled());
        let result = reconstruct(&samples, &params);
        assert_eq!(result.stats.input_points, 65);
        assert_eq!(result.stats.filtered_points, 64);
        assert!(result.shapes.is_empty());

        let bounds = result.bounds.unwrap();
        assert!(bounds.max.x < 1.0);
        assert!(result.to_string().contains("65 → 64 points"));
    }
}
