//! Per-point normal estimation.
//!
//! Feature-point clouds are too sparse and noisy for PCA, so the estimate is
//! a two-neighbour cross product: take the vectors to the two nearest
//! non-collinear neighbours, cross them and normalize. Normals are flipped
//! to point up (non-negative Y), which is right for the floors and table
//! tops that dominate handheld scans.
//!
//! Raycast samples usually arrive with a surface normal from the hit test;
//! [`resolve_normals`] prefers those.

use nalgebra::{Point3, Vector3};
use rayon::prelude::*;
use scan_types::PointSample;
use tracing::debug;

use crate::neighbors::{build_query, NeighborQuery, NeighborStrategy};
use crate::params::NormalParams;

/// Sine of the smallest angle between two neighbour vectors that still
/// spans a plane.
const MIN_SPAN_SINE: f64 = 1e-6;

/// Normal used when a point has too few usable neighbours.
#[must_use]
pub fn default_normal() -> Vector3<f64> {
    Vector3::y()
}

/// Normals for a mixed cloud, with their provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedNormals {
    /// One unit normal per sample.
    pub normals: Vec<Vector3<f64>>,

    /// How many came from the samples themselves.
    pub supplied: usize,

    /// How many were estimated.
    pub estimated: usize,
}

/// Estimates one unit normal per position.
///
/// Each normal faces up (`y >= 0`). Points with fewer than two neighbours
/// within `params.radius`, or whose neighbours are collinear with them, get
/// [`default_normal`].
///
/// # Example
///
/// ```
/// use scan_recon::normals::estimate_normals;
/// use scan_recon::params::NormalParams;
/// use scan_recon::NeighborStrategy;
/// use nalgebra::Point3;
///
/// let floor = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(0.02, 0.0, 0.0),
///     Point3::new(0.0, 0.0, 0.02),
/// ];
/// let normals = estimate_normals(&floor, &NormalParams::default(), NeighborStrategy::BruteForce);
/// assert!((normals[0].y - 1.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn estimate_normals(
    positions: &[Point3<f64>],
    params: &NormalParams,
    strategy: NeighborStrategy,
) -> Vec<Vector3<f64>> {
    let query = build_query(positions, strategy);
    (0..positions.len())
        .into_par_iter()
        .map(|i| estimate_point_normal(positions, query.as_ref(), i, params))
        .collect()
}

fn estimate_point_normal(
    positions: &[Point3<f64>],
    query: &dyn NeighborQuery,
    index: usize,
    params: &NormalParams,
) -> Vector3<f64> {
    let neighbors = query.nearest_within(index, params.radius, params.max_neighbors);
    if neighbors.len() < 2 {
        return default_normal();
    }

    let origin = positions[index];
    let mut first: Option<Vector3<f64>> = None;

    for neighbor in &neighbors {
        let v = positions[neighbor.index] - origin;
        let len = v.norm();
        if len <= f64::EPSILON {
            continue;
        }
        let Some(a) = first else {
            first = Some(v);
            continue;
        };

        let n = a.cross(&v);
        let span = n.norm();
        if span > MIN_SPAN_SINE * a.norm() * len {
            let n = n / span;
            return if n.y < 0.0 { -n } else { n };
        }
    }

    default_normal()
}

/// Normals for `samples`, preferring the ones they carry.
///
/// With `prefer_supplied` and every sample carrying a normal, nothing is
/// estimated. Otherwise the cloud is estimated and, if `prefer_supplied`,
/// supplied normals replace the estimates where present.
#[must_use]
pub fn resolve_normals(
    samples: &[PointSample],
    params: &NormalParams,
    strategy: NeighborStrategy,
) -> ResolvedNormals {
    let with_normal = samples.iter().filter(|s| s.normal.is_some()).count();

    if params.prefer_supplied && with_normal == samples.len() {
        debug!(points = samples.len(), "Using supplied normals");
        return ResolvedNormals {
            normals: samples.iter().map(|s| s.normal.unwrap_or_else(default_normal)).collect(),
            supplied: samples.len(),
            estimated: 0,
        };
    }

    let positions: Vec<_> = samples.iter().map(|s| s.position).collect();
    let mut normals = estimate_normals(&positions, params, strategy);

    let supplied = if params.prefer_supplied {
        for (normal, sample) in normals.iter_mut().zip(samples) {
            if let Some(n) = sample.normal {
                *normal = n;
            }
        }
        with_normal
    } else {
        0
    };

    debug!(
        points = samples.len(),
        supplied,
        estimated = samples.len() - supplied,
        "Resolved normals"
    );

    ResolvedNormals {
        normals,
        supplied,
        estimated: samples.len() - supplied,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn floor_grid() -> Vec<Point3<f64>> {
        (0..25)
            .map(|i| Point3::new(f64::from(i % 5) * 0.02, 0.0, f64::from(i / 5) * 0.02))
            .collect()
    }

    #[test]
    fn test_flat_floor_faces_up() {
        let normals = estimate_normals(&floor_grid(), &NormalParams::default(), NeighborStrategy::BruteForce);
        for n in normals {
            assert_relative_eq!(n, Vector3::y(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_tilted_plane_normal() {
        // Plane y = x, upward normal (-1, 1, 0) / sqrt(2)
        let points: Vec<_> = (0..16)
            .map(|i| {
                let x = f64::from(i % 4) * 0.02;
                let z = f64::from(i / 4) * 0.02;
                Point3::new(x, x, z)
            })
            .collect();

        let normals = estimate_normals(&points, &NormalParams::default(), NeighborStrategy::BruteForce);
        let expected = Vector3::new(-1.0, 1.0, 0.0).normalize();
        for n in normals {
            assert_relative_eq!(n, expected, epsilon = 1e-9);
            assert!(n.y >= 0.0);
        }
    }

    #[test]
    fn test_isolated_and_collinear_default() {
        let isolated = vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)];
        let normals = estimate_normals(&isolated, &NormalParams::default(), NeighborStrategy::BruteForce);
        assert!(normals.iter().all(|n| *n == default_normal()));

        let line: Vec<_> = (0..5).map(|i| Point3::new(f64::from(i) * 0.01, 0.0, 0.0)).collect();
        let normals = estimate_normals(&line, &NormalParams::default(), NeighborStrategy::BruteForce);
        assert!(normals.iter().all(|n| *n == default_normal()));
    }

    #[test]
    fn test_supplied_normals_win() {
        let samples: Vec<_> = floor_grid()
            .into_iter()
            .map(|p| PointSample::with_normal(p, Vector3::x()))
            .collect();

        let resolved = resolve_normals(&samples, &NormalParams::default(), NeighborStrategy::BruteForce);
        assert_eq!(resolved.supplied, 25);
        assert_eq!(resolved.estimated, 0);
        assert!(resolved.normals.iter().all(|n| *n == Vector3::x()));
    }

    #[test]
    fn test_mixed_cloud_fills_gaps() {
        let mut samples: Vec<_> = floor_grid().into_iter().map(PointSample::new).collect();
        samples[3] = PointSample::with_normal(samples[3].position, Vector3::z());

        let resolved = resolve_normals(&samples, &NormalParams::default(), NeighborStrategy::BruteForce);
        assert_eq!(resolved.supplied, 1);
        assert_eq!(resolved.estimated, 24);
        assert_relative_eq!(resolved.normals[3], Vector3::z());
        assert_relative_eq!(resolved.normals[0], Vector3::y(), epsilon = 1e-12);
    }

    #[test]
    fn test_prefer_supplied_off_recomputes() {
        let samples: Vec<_> = floor_grid()
            .into_iter()
            .map(|p| PointSample::with_normal(p, Vector3::x()))
            .collect();
        let params = NormalParams::default().with_prefer_supplied(false);

        let resolved = resolve_normals(&samples, &params, NeighborStrategy::BruteForce);
        assert_eq!(resolved.supplied, 0);
        assert_relative_eq!(resolved.normals[0], Vector3::y(), epsilon = 1e-12);
    }
}
