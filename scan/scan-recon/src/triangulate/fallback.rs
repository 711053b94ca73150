//! Pose-less proximity triangulation.
//!
//! Only the first `max_points` points seed triangles, which bounds the work
//! regardless of cloud size. Each seed pairs up its nearest neighbours; a
//! pair becomes a face if the closing edge is within the radius and the
//! triangle is not a sliver. Winding is whatever order the pair was formed
//! in.

use nalgebra::Point3;
use scan_types::ScanMesh;

use super::{triangle_area, vertex_index, TriangleSet, Triangulation, TriangulationMode};
use crate::neighbors::{build_query, NeighborStrategy};
use crate::params::FallbackParams;

pub(super) fn triangulate(
    positions: Vec<Point3<f64>>,
    params: &FallbackParams,
    strategy: NeighborStrategy,
) -> Triangulation {
    let query = build_query(&positions, strategy);
    let seeds = positions.len().min(params.max_points);

    let mut faces = Vec::new();
    let mut seen = TriangleSet::default();
    let mut candidates_tested = 0;

    for i in 0..seeds {
        let near = query.nearest_within(i, params.radius, params.max_neighbors);

        for (a, na) in near.iter().enumerate() {
            for nb in &near[a + 1..] {
                candidates_tested += 1;
                let (pa, pb) = (&positions[na.index], &positions[nb.index]);

                if (pb - pa).norm() > params.radius {
                    continue;
                }
                if triangle_area(&positions[i], pa, pb) <= params.min_area {
                    continue;
                }

                let face = [i, na.index, nb.index].map(vertex_index);
                if seen.insert(face) {
                    faces.push(face);
                }
            }
        }
    }

    let mut mesh = ScanMesh::from_points(positions);
    mesh.faces = faces;

    Triangulation {
        mesh,
        mode: TriangulationMode::Fallback,
        candidates_tested,
        faces_capped: false,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn grid(n: i32, spacing: f64) -> Vec<Point3<f64>> {
        (0..n * n)
            .map(|i| Point3::new(f64::from(i % n) * spacing, 0.0, f64::from(i / n) * spacing))
            .collect()
    }

    #[test]
    fn test_grid_produces_valid_faces() {
        let result = triangulate(grid(6, 0.04), &FallbackParams::default(), NeighborStrategy::BruteForce);
        assert_eq!(result.mode, TriangulationMode::Fallback);
        assert!(result.mesh.face_count() > 0);
        assert!(result.mesh.validate().is_ok());
        for f in 0..result.mesh.face_count() {
            assert!(result.mesh.face_area(f).unwrap() > 0.0001);
        }
    }

    #[test]
    fn test_only_leading_points_seed() {
        let params = FallbackParams {
            max_points: 1,
            ..FallbackParams::default()
        };
        let result = triangulate(grid(6, 0.04), &params, NeighborStrategy::BruteForce);
        assert!(result.mesh.face_count() > 0);
        assert!(result.mesh.faces.iter().all(|f| f[0] == 0));
        assert_eq!(result.mesh.vertex_count(), 36);
    }

    #[test]
    fn test_collinear_points_make_no_faces() {
        let line: Vec<_> = (0..10).map(|i| Point3::new(f64::from(i) * 0.02, 0.0, 0.0)).collect();
        let result = triangulate(line, &FallbackParams::default(), NeighborStrategy::BruteForce);
        assert!(result.mesh.faces.is_empty());
        assert!(result.candidates_tested > 0);
    }

    #[test]
    fn test_far_apart_points_make_no_faces() {
        let result = triangulate(grid(3, 1.0), &FallbackParams::default(), NeighborStrategy::BruteForce);
        assert!(result.mesh.faces.is_empty());
        assert_eq!(result.candidates_tested, 0);
    }
}
