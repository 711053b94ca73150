//! Camera-facing 2.5D triangulation.
//!
//! # Algorithm
//!
//! 1. Average the camera positions and viewing directions of all poses
//! 2. Build a (right, up) basis orthogonal to the average view direction
//! 3. Project every point to `(x, y, depth)` relative to the average camera
//! 4. For each point, keep up to `max_candidates` nearest points within
//!    `max_edge_length_2d` in the plane and `max_depth_diff` in depth
//! 5. Pair candidates into triangles; accept a triangle if its 2D edges are
//!    within `max_edge_length_2d`, its 3D edges are below
//!    `max_edge_length_3d` and its area exceeds `min_area`
//! 6. Wind each face so its normal points toward the average camera
//!
//! Output stops at `max_faces_per_point * n` faces.

use nalgebra::{Point3, Vector3};
use scan_types::{CameraPose, ScanMesh};

use super::{triangle_area, vertex_index, TriangleSet, Triangulation, TriangulationMode};
use crate::neighbors::{build_query, NeighborStrategy};
use crate::params::PoseAwareParams;

/// Above this |cos| between view and world up, Z is the reference axis.
const NEAR_VERTICAL: f64 = 0.99;

/// The averaged camera and its projection basis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewFrame {
    /// Average camera position.
    pub camera: Point3<f64>,
    /// Unit average viewing direction.
    pub view: Vector3<f64>,
    /// Unit horizontal axis of the projection plane.
    pub right: Vector3<f64>,
    /// Unit vertical axis of the projection plane.
    pub up: Vector3<f64>,
}

impl ViewFrame {
    /// Averages `poses`; `None` if there are none or their view
    /// directions cancel out.
    #[must_use]
    pub fn from_poses(poses: &[CameraPose]) -> Option<Self> {
        if poses.is_empty() {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let n = poses.len() as f64;

        let position_sum = poses
            .iter()
            .fold(Vector3::<f64>::zeros(), |acc, p| acc + p.position().coords);
        let forward_sum = poses
            .iter()
            .fold(Vector3::<f64>::zeros(), |acc, p| acc + p.forward());

        let view = (forward_sum / n).try_normalize(1e-6)?;
        Some(Self::new(Point3::from(position_sum / n), view))
    }

    /// Frame for a camera at `camera` looking along unit `view`.
    #[must_use]
    pub fn new(camera: Point3<f64>, view: Vector3<f64>) -> Self {
        let reference = if view.dot(&Vector3::y()).abs() > NEAR_VERTICAL {
            Vector3::z()
        } else {
            Vector3::y()
        };
        let right = view.cross(&reference).normalize();
        let up = right.cross(&view).normalize();
        Self {
            camera,
            view,
            right,
            up,
        }
    }

    /// `(x, y, depth)` of `point` in this frame.
    #[must_use]
    pub fn project(&self, point: &Point3<f64>) -> Point3<f64> {
        let d = point - self.camera;
        Point3::new(d.dot(&self.right), d.dot(&self.up), d.dot(&self.view))
    }
}

struct Candidate {
    index: usize,
    distance_2d: f64,
}

pub(super) fn triangulate(
    positions: Vec<Point3<f64>>,
    frame: &ViewFrame,
    params: &PoseAwareParams,
    strategy: NeighborStrategy,
) -> Triangulation {
    let n = positions.len();
    let projected: Vec<Point3<f64>> = positions.iter().map(|p| frame.project(p)).collect();

    // Anything within both 2D and depth limits lies inside this 3D radius
    // of the projected point.
    let search_radius = params.max_edge_length_2d.hypot(params.max_depth_diff);
    let query = build_query(&projected, strategy);

    let max_faces = params.max_faces_per_point.saturating_mul(n);
    let mut faces: Vec<[u32; 3]> = Vec::new();
    let mut seen = TriangleSet::default();
    let mut candidates_tested = 0;
    let mut faces_capped = false;

    'points: for i in 0..n {
        let pi = projected[i];
        let mut candidates: Vec<Candidate> = query
            .within(i, search_radius)
            .into_iter()
            .filter_map(|nb| {
                let pj = projected[nb.index];
                let distance_2d = (pj.x - pi.x).hypot(pj.y - pi.y);
                let close = distance_2d <= params.max_edge_length_2d
                    && (pj.z - pi.z).abs() <= params.max_depth_diff;
                close.then_some(Candidate {
                    index: nb.index,
                    distance_2d,
                })
            })
            .collect();

        candidates.sort_by(|a, b| {
            a.distance_2d
                .total_cmp(&b.distance_2d)
                .then_with(|| a.index.cmp(&b.index))
        });
        candidates.truncate(params.max_candidates);

        let anchors = candidates.len().min(params.pair_anchor_count);
        for a in 0..anchors {
            for b in (a + 1)..candidates.len() {
                candidates_tested += 1;
                let (ja, jb) = (candidates[a].index, candidates[b].index);

                let Some(face) = accept_triangle(&positions, &projected, [i, ja, jb], frame, params)
                else {
                    continue;
                };
                if !seen.insert(face) {
                    continue;
                }
                if faces.len() >= max_faces {
                    faces_capped = true;
                    break 'points;
                }
                faces.push(face);
            }
        }
    }

    let mut mesh = ScanMesh::from_points(positions);
    mesh.faces = faces;

    Triangulation {
        mesh,
        mode: TriangulationMode::PoseAware,
        candidates_tested,
        faces_capped,
    }
}

/// Applies the acceptance rules; returns the face wound toward the camera.
fn accept_triangle(
    positions: &[Point3<f64>],
    projected: &[Point3<f64>],
    [i, j, k]: [usize; 3],
    frame: &ViewFrame,
    params: &PoseAwareParams,
) -> Option<[u32; 3]> {
    let (qj, qk) = (projected[j], projected[k]);
    if (qk.x - qj.x).hypot(qk.y - qj.y) > params.max_edge_length_2d {
        return None;
    }

    let (a, b, c) = (positions[i], positions[j], positions[k]);
    let max_edge = params.max_edge_length_3d;
    if (b - a).norm() >= max_edge || (c - a).norm() >= max_edge || (c - b).norm() >= max_edge {
        return None;
    }

    if triangle_area(&a, &b, &c) <= params.min_area {
        return None;
    }

    let normal = (b - a).cross(&(c - a));
    let centroid = Point3::from((a.coords + b.coords + c.coords) / 3.0);
    let face = if normal.dot(&(frame.camera - centroid)) < 0.0 {
        [i, k, j]
    } else {
        [i, j, k]
    };
    Some(face.map(vertex_index))
}
