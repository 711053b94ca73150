//! Fixed-radius neighbour queries.
//!
//! Every stage asks the same question: which points lie within `r` of point
//! `i`? [`NeighborQuery`] hides how that is answered so the brute-force scan
//! used for small clouds can be swapped for a kd-tree as caps grow.
//!
//! # Example
//!
//! ```
//! use scan_recon::neighbors::{build_query, NeighborStrategy};
//! use nalgebra::Point3;
//!
//! let points = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(0.1, 0.0, 0.0),
//!     Point3::new(5.0, 0.0, 0.0),
//! ];
//!
//! let query = build_query(&points, NeighborStrategy::KdTree);
//! let near = query.within(0, 0.5);
//! assert_eq!(near.len(), 1);
//! assert_eq!(near[0].index, 1);
//! ```

use hashbrown::HashMap;
use kiddo::{KdTree, SquaredEuclidean};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Points sharing one coordinate value beyond this count make kiddo's
/// fixed-size buckets overflow.
const MAX_SHARED_AXIS_VALUES: usize = 16;

/// One result of a radius query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Index of the neighbouring point.
    pub index: usize,
    /// Euclidean distance to the query point.
    pub distance: f64,
}

/// A radius search over a fixed point set.
pub trait NeighborQuery: Send + Sync {
    /// Number of indexed points.
    fn len(&self) -> usize;

    /// True if nothing is indexed.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Points within `radius` (inclusive) of point `index`, nearest first.
    ///
    /// The query point itself is never returned; coincident duplicates are.
    fn within(&self, index: usize, radius: f64) -> Vec<Neighbor>;

    /// At most `k` nearest points within `radius`.
    fn nearest_within(&self, index: usize, radius: f64, k: usize) -> Vec<Neighbor> {
        let mut neighbors = self.within(index, radius);
        neighbors.truncate(k);
        neighbors
    }
}

/// Which [`NeighborQuery`] implementation the pipeline builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NeighborStrategy {
    /// Pairwise scan, O(n) per query. Fine up to a few thousand points.
    #[default]
    BruteForce,
    /// kd-tree, O(log n) per query.
    KdTree,
}

/// Builds the query backend for `points`.
///
/// A kd-tree request silently degrades to brute force when too many points
/// share a coordinate on one axis.
#[must_use]
pub fn build_query(points: &[Point3<f64>], strategy: NeighborStrategy) -> Box<dyn NeighborQuery> {
    match strategy {
        NeighborStrategy::BruteForce => Box::new(BruteForce::new(points.to_vec())),
        NeighborStrategy::KdTree => match KdTreeQuery::try_new(points) {
            Some(tree) => Box::new(tree),
            None => {
                debug!(
                    points = points.len(),
                    "Axis collisions in point set, using brute-force neighbour search"
                );
                Box::new(BruteForce::new(points.to_vec()))
            }
        },
    }
}

/// Exhaustive pairwise search.
#[derive(Debug, Clone, Default)]
pub struct BruteForce {
    points: Vec<Point3<f64>>,
}

impl BruteForce {
    /// Indexes `points`.
    #[must_use]
    pub const fn new(points: Vec<Point3<f64>>) -> Self {
        Self { points }
    }
}

impl NeighborQuery for BruteForce {
    fn len(&self) -> usize {
        self.points.len()
    }

    fn within(&self, index: usize, radius: f64) -> Vec<Neighbor> {
        let Some(origin) = self.points.get(index) else {
            return Vec::new();
        };
        let radius_sq = radius * radius;

        let mut neighbors: Vec<Neighbor> = self
            .points
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != index)
            .filter_map(|(j, p)| {
                let d_sq = (p - origin).norm_squared();
                (d_sq <= radius_sq).then(|| Neighbor {
                    index: j,
                    distance: d_sq.sqrt(),
                })
            })
            .collect();

        sort_by_distance(&mut neighbors);
        neighbors
    }
}

/// kd-tree backed search.
pub struct KdTreeQuery {
    tree: KdTree<f64, 3>,
    points: Vec<Point3<f64>>,
}

impl std::fmt::Debug for KdTreeQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KdTreeQuery")
            .field("points", &self.points.len())
            .finish_non_exhaustive()
    }
}

impl KdTreeQuery {
    /// Builds a tree, or `None` if the point set would overflow a bucket.
    #[must_use]
    pub fn try_new(points: &[Point3<f64>]) -> Option<Self> {
        if has_axis_collisions(points) {
            return None;
        }

        let mut tree: KdTree<f64, 3> = KdTree::new();
        for (i, p) in points.iter().enumerate() {
            tree.add(&[p.x, p.y, p.z], i as u64);
        }

        Some(Self {
            tree,
            points: points.to_vec(),
        })
    }
}

impl NeighborQuery for KdTreeQuery {
    fn len(&self) -> usize {
        self.points.len()
    }

    fn within(&self, index: usize, radius: f64) -> Vec<Neighbor> {
        let Some(p) = self.points.get(index) else {
            return Vec::new();
        };

        let mut neighbors: Vec<Neighbor> = self
            .tree
            .within::<SquaredEuclidean>(&[p.x, p.y, p.z], radius * radius)
            .into_iter()
            .filter(|n| n.item as usize != index)
            .map(|n| Neighbor {
                index: n.item as usize,
                distance: n.distance.sqrt(),
            })
            .collect();

        sort_by_distance(&mut neighbors);
        neighbors
    }
}

/// Ties are broken by index so both backends agree exactly.
fn sort_by_distance(neighbors: &mut [Neighbor]) {
    neighbors.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| a.index.cmp(&b.index))
    });
}

fn has_axis_collisions(points: &[Point3<f64>]) -> bool {
    (0..3).any(|axis| {
        let mut counts: HashMap<u64, usize> = HashMap::with_capacity(points.len());
        points.iter().any(|p| {
            // +0.0 and -0.0 land in the same bucket
            let value = p[axis] + 0.0;
            let count = counts.entry(value.to_bits()).or_insert(0);
            *count += 1;
            *count > MAX_SHARED_AXIS_VALUES
        })
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::cast_precision_loss)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{Rng, SeedableRng};

    fn random_cloud(n: usize, seed: u64) -> Vec<Point3<f64>> {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| {
                Point3::new(
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                )
            })
            .collect()
    }

    #[test]
    fn test_brute_force_sorted_and_excludes_self() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.3, 0.0, 0.0),
            Point3::new(0.1, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        let query = BruteForce::new(points);
        let near = query.within(0, 0.5);

        assert_eq!(near.len(), 2);
        assert_eq!(near[0].index, 2);
        assert_eq!(near[1].index, 1);
        assert_relative_eq!(near[0].distance, 0.1);
    }

    #[test]
    fn test_duplicates_are_neighbors() {
        let query = BruteForce::new(vec![Point3::origin(); 3]);
        assert_eq!(query.within(1, 0.01).len(), 2);
    }

    #[test]
    fn test_out_of_range_index() {
        let query = BruteForce::new(vec![Point3::origin()]);
        assert!(query.within(5, 1.0).is_empty());
        assert!(!query.is_empty());
    }

    #[test]
    fn test_nearest_within_truncates() {
        let points: Vec<_> = (0..10)
            .map(|i| Point3::new(f64::from(i) * 0.01, 0.0, 0.0))
            .collect();
        let query = BruteForce::new(points);
        let near = query.nearest_within(0, 1.0, 3);
        assert_eq!(
            near.iter().map(|n| n.index).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_kdtree_matches_brute_force() {
        let points = random_cloud(400, 7);
        let brute = BruteForce::new(points.clone());
        let tree = KdTreeQuery::try_new(&points).unwrap();

        for i in (0..points.len()).step_by(13) {
            let a: Vec<usize> = brute.within(i, 0.25).iter().map(|n| n.index).collect();
            let b: Vec<usize> = tree.within(i, 0.25).iter().map(|n| n.index).collect();
            assert_eq!(a, b, "mismatch for point {i}");
        }
    }

    #[test]
    fn test_kdtree_degrades_on_shared_axis_values() {
        // 100 points on the plane z = 0 would overflow a kd-tree bucket
        let points: Vec<_> = (0..100)
            .map(|i| Point3::new(i as f64 * 0.01, (i * 7 % 13) as f64 * 0.01, 0.0))
            .collect();
        assert!(KdTreeQuery::try_new(&points).is_none());

        let query = build_query(&points, NeighborStrategy::KdTree);
        assert_eq!(query.len(), 100);
        assert!(!query.within(0, 0.05).is_empty());
    }

    #[test]
    fn test_strategy_serde_names() {
        let json = serde_json::to_string(&NeighborStrategy::KdTree).unwrap();
        assert_eq!(json, "\"kdTree\"");
        let back: NeighborStrategy = serde_json::from_str("\"bruteForce\"").unwrap();
        assert_eq!(back, NeighborStrategy::BruteForce);
    }
}
