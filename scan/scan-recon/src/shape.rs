//! Best-effort circle/rectangle labelling of point clusters.
//!
//! # Algorithm
//!
//! 1. Flood-fill the cloud into clusters of points linked by `proximity`
//! 2. For every cluster with at least `min_cluster_points`, take the
//!    horizontal (XZ) bounding box and reject it unless both sides lie in
//!    `[min_extent, max_extent]`
//! 3. Split the footprint into `angular_sectors` around the cluster centre
//!    and take the farthest horizontal distance in each sector; the
//!    coefficient of variation of those radii is the circularity
//! 4. `Circle` if circularity < `max_circularity` and aspect ratio <
//!    `max_aspect_ratio`, otherwise `Rectangle`
//!
//! This is a heuristic for UI hints. Squares with a near-unit aspect ratio
//! score a low circularity too and may come back as circles.

use std::collections::VecDeque;
use std::f64::consts::PI;

use nalgebra::Point3;
use scan_types::{Aabb, ShapeDetection, ShapeKind};
use tracing::debug;

use crate::neighbors::{build_query, NeighborStrategy};
use crate::params::ShapeParams;

/// Splits `points` into proximity clusters.
///
/// Clusters are grown breadth-first from the lowest unvisited index. A
/// cluster stops growing at `max_cluster_points`; points left out may seed
/// later clusters. At most `max_clusters` are returned. Each cluster lists
/// point indices.
#[must_use]
pub fn cluster_points(
    points: &[Point3<f64>],
    params: &ShapeParams,
    strategy: NeighborStrategy,
) -> Vec<Vec<usize>> {
    let query = build_query(points, strategy);
    let mut visited = vec![false; points.len()];
    let mut clusters = Vec::new();

    for seed in 0..points.len() {
        if clusters.len() >= params.max_clusters {
            break;
        }
        if visited[seed] {
            continue;
        }

        visited[seed] = true;
        let mut cluster = vec![seed];
        let mut frontier = VecDeque::from([seed]);

        'grow: while let Some(current) = frontier.pop_front() {
            for neighbor in query.within(current, params.proximity) {
                if cluster.len() >= params.max_cluster_points {
                    break 'grow;
                }
                if !visited[neighbor.index] {
                    visited[neighbor.index] = true;
                    cluster.push(neighbor.index);
                    frontier.push_back(neighbor.index);
                }
            }
        }

        clusters.push(cluster);
    }

    clusters
}

/// Labels one cluster, or `None` if it is too small, too large or too thin.
///
/// # Example
///
/// ```
/// use scan_recon::shape::analyze_cluster_for_shape;
/// use scan_recon::params::ShapeParams;
/// use scan_types::ShapeKind;
/// use nalgebra::Point3;
///
/// let ring: Vec<_> = (0..100)
///     .map(|i| {
///         let t = f64::from(i) / 100.0 * std::f64::consts::TAU;
///         Point3::new(0.5 * t.cos(), 0.0, 0.5 * t.sin())
///     })
///     .collect();
///
/// let shape = analyze_cluster_for_shape(&ring, &ShapeParams::default()).unwrap();
/// assert_eq!(shape.kind, ShapeKind::Circle);
/// ```
#[must_use]
pub fn analyze_cluster_for_shape(points: &[Point3<f64>], params: &ShapeParams) -> Option<ShapeDetection> {
    if points.len() < params.min_cluster_points.max(1) {
        return None;
    }

    let bounds = Aabb::from_points(points.iter());
    let size = bounds.size();
    let (width, depth) = (size.x, size.z);
    let in_range = |v: f64| (params.min_extent..=params.max_extent).contains(&v);
    if !in_range(width) || !in_range(depth) {
        return None;
    }

    let circularity = radial_variation(points, params.angular_sectors.max(1))?;
    let aspect_ratio = width.max(depth) / width.min(depth);

    let kind = if circularity < params.max_circularity && aspect_ratio < params.max_aspect_ratio {
        ShapeKind::Circle
    } else {
        ShapeKind::Rectangle
    };

    Some(ShapeDetection {
        kind,
        bounds,
        point_count: points.len(),
        circularity,
        aspect_ratio,
    })
}

/// Clusters `points` and labels every qualifying cluster.
///
/// Returns nothing when `params.enabled` is false.
#[must_use]
pub fn detect_shapes(
    points: &[Point3<f64>],
    params: &ShapeParams,
    strategy: NeighborStrategy,
) -> Vec<ShapeDetection> {
    if !params.enabled {
        return Vec::new();
    }

    let clusters = cluster_points(points, params, strategy);
    let shapes: Vec<ShapeDetection> = clusters
        .iter()
        .filter(|c| c.len() >= params.min_cluster_points)
        .filter_map(|c| {
            let members: Vec<Point3<f64>> = c.iter().map(|&i| points[i]).collect();
            analyze_cluster_for_shape(&members, params)
        })
        .collect();

    debug!(
        clusters = clusters.len(),
        shapes = shapes.len(),
        "Shape detection finished"
    );
    shapes
}

/// Coefficient of variation of the per-sector maximum horizontal radius.
///
/// Empty sectors are skipped. `None` if every point sits on the centre.
fn radial_variation(points: &[Point3<f64>], sectors: usize) -> Option<f64> {
    #[allow(clippy::cast_precision_loss)]
    let n = points.len() as f64;
    let (sum_x, sum_z) = points
        .iter()
        .fold((0.0, 0.0), |(x, z), p| (x + p.x, z + p.z));
    let (cx, cz) = (sum_x / n, sum_z / n);

    let mut max_radius = vec![None::<f64>; sectors];
    #[allow(clippy::cast_precision_loss)]
    let sector_width = 2.0 * PI / sectors as f64;

    for p in points {
        let (dx, dz) = (p.x - cx, p.z - cz);
        let r = dx.hypot(dz);
        // atan2 is in [-pi, pi]; shift to [0, 2pi]
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let sector = (((dz.atan2(dx) + PI) / sector_width) as usize).min(sectors - 1);
        let slot = &mut max_radius[sector];
        *slot = Some(slot.map_or(r, |m| m.max(r)));
    }

    let radii: Vec<f64> = max_radius.into_iter().flatten().collect();
    #[allow(clippy::cast_precision_loss)]
    let count = radii.len() as f64;
    let mean = radii.iter().sum::<f64>() / count;
    if mean <= f64::EPSILON {
        return None;
    }
    let variance = radii.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / count;
    Some(variance.sqrt() / mean)
}
