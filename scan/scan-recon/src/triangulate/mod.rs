//! Point cloud to triangle mesh.
//!
//! Two strategies, picked per call from what the samples carry:
//!
//! - **Pose-aware** - every sample has a valid camera pose. Points are
//!   projected onto a plane facing the average camera and triangulated in
//!   2.5D; faces are wound toward the camera.
//! - **Fallback** - otherwise. A bounded proximity triangulation over the
//!   first points of the cloud, with arbitrary winding.
//!
//! Fewer than three points produce a mesh with every point as a vertex and
//! no faces. Triangulation never fails; bad input only shrinks the output.
//!
//! # Example
//!
//! ```
//! use scan_recon::triangulate::{triangulate, TriangulationMode};
//! use scan_recon::params::TriangulationParams;
//! use scan_recon::NeighborStrategy;
//! use scan_types::PointSample;
//!
//! let samples = vec![
//!     PointSample::from_coords(0.0, 0.0, 0.0),
//!     PointSample::from_coords(0.05, 0.0, 0.0),
//!     PointSample::from_coords(0.0, 0.0, 0.05),
//! ];
//!
//! let result = triangulate(&samples, &TriangulationParams::default(), NeighborStrategy::BruteForce, 1e-3);
//! assert_eq!(result.mode, TriangulationMode::Fallback);
//! assert_eq!(result.mesh.face_count(), 1);
//! ```

mod fallback;
mod pose_aware;

pub use pose_aware::ViewFrame;

use hashbrown::HashSet;
use nalgebra::Point3;
use scan_types::{PointSample, ScanMesh};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::neighbors::NeighborStrategy;
use crate::params::TriangulationParams;

/// Which strategy produced a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TriangulationMode {
    /// Camera-facing 2.5D triangulation.
    PoseAware,
    /// Pose-less proximity triangulation.
    Fallback,
    /// Too few points; no faces.
    Degenerate,
}

impl std::fmt::Display for TriangulationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PoseAware => write!(f, "pose-aware"),
            Self::Fallback => write!(f, "fallback"),
            Self::Degenerate => write!(f, "degenerate"),
        }
    }
}

/// Result of [`triangulate`].
#[derive(Debug, Clone)]
pub struct Triangulation {
    /// The mesh. Vertex `i` is sample `i`; normals are not filled here.
    pub mesh: ScanMesh,

    /// Strategy used.
    pub mode: TriangulationMode,

    /// Candidate triangles examined.
    pub candidates_tested: usize,

    /// True if the face cap stopped triangulation early.
    pub faces_capped: bool,
}

impl Triangulation {
    fn degenerate(positions: Vec<Point3<f64>>) -> Self {
        Self {
            mesh: ScanMesh::from_points(positions),
            mode: TriangulationMode::Degenerate,
            candidates_tested: 0,
            faces_capped: false,
        }
    }
}

impl std::fmt::Display for Triangulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Triangulation ({}): {} vertices, {} faces from {} candidates{}",
            self.mode,
            self.mesh.vertex_count(),
            self.mesh.face_count(),
            self.candidates_tested,
            if self.faces_capped { " (capped)" } else { "" }
        )
    }
}

/// Triangulates `samples`.
///
/// Pose-aware mode runs when every sample carries a pose that validates as
/// rigid within `pose_tolerance`; otherwise fallback mode runs.
#[must_use]
pub fn triangulate(
    samples: &[PointSample],
    params: &TriangulationParams,
    strategy: NeighborStrategy,
    pose_tolerance: f64,
) -> Triangulation {
    let positions: Vec<Point3<f64>> = samples.iter().map(|s| s.position).collect();

    if positions.len() < 3 {
        debug!(points = positions.len(), "Too few points to triangulate");
        return Triangulation::degenerate(positions);
    }
    if u32::try_from(positions.len()).is_err() {
        warn!(points = positions.len(), "Point count exceeds index range, skipping triangulation");
        return Triangulation::degenerate(positions);
    }

    let result = match select_view_frame(samples, pose_tolerance) {
        Some(frame) => pose_aware::triangulate(positions, &frame, &params.pose_aware, strategy),
        None => fallback::triangulate(positions, &params.fallback, strategy),
    };

    debug_assert!(result.mesh.validate().is_ok(), "triangulator emitted an invalid mesh");
    debug!("{result}");
    result
}

/// The averaged camera frame, if every sample has a usable pose.
#[must_use]
pub fn select_view_frame(samples: &[PointSample], pose_tolerance: f64) -> Option<ViewFrame> {
    let mut poses = Vec::with_capacity(samples.len());
    for sample in samples {
        let pose = sample.source_pose?;
        if let Err(err) = pose.validate(pose_tolerance) {
            warn!(%err, "Invalid camera pose, using pose-less triangulation");
            return None;
        }
        poses.push(pose);
    }

    let frame = ViewFrame::from_poses(&poses);
    if frame.is_none() {
        warn!("Camera view directions cancel out, using pose-less triangulation");
    }
    frame
}

/// Unordered triangle set for deduplication.
#[derive(Debug, Default)]
struct TriangleSet {
    seen: HashSet<[u32; 3]>,
}

impl TriangleSet {
    /// Records a triangle; false if some winding of it was already present.
    fn insert(&mut self, tri: [u32; 3]) -> bool {
        let mut key = tri;
        key.sort_unstable();
        self.seen.insert(key)
    }
}

/// Area of the triangle `(a, b, c)`.
fn triangle_area(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    0.5 * (b - a).cross(&(c - a)).norm()
}

#[allow(clippy::cast_possible_truncation)]
const fn vertex_index(i: usize) -> u32 {
    // callers check the point count fits u32 first
    i as u32
}
