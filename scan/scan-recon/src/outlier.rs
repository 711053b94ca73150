//! Density-based outlier removal.
//!
//! # Algorithm
//!
//! 1. Count the neighbours of every point within `radius` (excluding itself)
//! 2. Take the median of those counts
//! 3. Keep a point iff its count is at least
//!    `max(2, round(min_relative_density * median))`
//!
//! If that would discard every point the input is returned unchanged
//! (fail-open). Clouds of `min_points` or fewer are not filtered at all.
//!
//! # Example
//!
//! ```
//! use scan_recon::outlier::filter_outliers;
//! use scan_recon::params::OutlierParams;
//! use scan_recon::NeighborStrategy;
//! use scan_types::PointSample;
//!
//! // A tight 5×5 grid plus one far-away point
//! let mut samples: Vec<_> = (0..25)
//!     .map(|i| PointSample::from_coords(f64::from(i % 5) * 0.01, 0.0, f64::from(i / 5) * 0.01))
//!     .collect();
//! samples.push(PointSample::from_coords(3.0, 3.0, 3.0));
//!
//! let report = filter_outliers(&samples, &OutlierParams::default(), NeighborStrategy::BruteForce);
//! assert_eq!(report.removed, 1);
//! assert_eq!(report.points.len(), 25);
//! ```

use rayon::prelude::*;
use scan_types::PointSample;
use tracing::{debug, warn};

use crate::neighbors::{build_query, NeighborStrategy};
use crate::params::OutlierParams;

/// Result of [`filter_outliers`].
#[derive(Debug, Clone)]
pub struct OutlierReport {
    /// Surviving samples in input order.
    pub points: Vec<PointSample>,

    /// Number of samples in the input.
    pub original_count: usize,

    /// Number of samples removed.
    pub removed: usize,

    /// Minimum neighbour count a sample needed (0 when skipped).
    pub threshold: usize,

    /// True if the filter would have removed everything and gave up.
    pub fail_open: bool,

    /// True if the cloud was too small to filter.
    pub skipped: bool,
}

impl OutlierReport {
    fn passthrough(points: Vec<PointSample>, threshold: usize, fail_open: bool, skipped: bool) -> Self {
        Self {
            original_count: points.len(),
            points,
            removed: 0,
            threshold,
            fail_open,
            skipped,
        }
    }

    /// Percentage of input samples that were removed.
    #[must_use]
    pub fn removed_percentage(&self) -> f64 {
        if self.original_count == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        {
            100.0 * self.removed as f64 / self.original_count as f64
        }
    }
}

impl std::fmt::Display for OutlierReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.skipped {
            return write!(f, "Outlier filter skipped: {} points", self.original_count);
        }
        write!(
            f,
            "Outlier filter: {} → {} points ({} removed, {:.1}%, threshold {})",
            self.original_count,
            self.points.len(),
            self.removed,
            self.removed_percentage(),
            self.threshold
        )?;
        if self.fail_open {
            write!(f, " [fail-open]")?;
        }
        Ok(())
    }
}

/// Removes samples in sparse regions of the cloud.
///
/// Never returns an empty cloud for non-empty input.
#[must_use]
pub fn filter_outliers(
    samples: &[PointSample],
    params: &OutlierParams,
    strategy: NeighborStrategy,
) -> OutlierReport {
    if samples.len() <= params.min_points {
        debug!(points = samples.len(), "Too few points for outlier filtering");
        return OutlierReport::passthrough(samples.to_vec(), 0, false, true);
    }

    let positions: Vec<_> = samples.iter().map(|s| s.position).collect();
    let query = build_query(&positions, strategy);

    let counts: Vec<usize> = (0..samples.len())
        .into_par_iter()
        .map(|i| query.within(i, params.radius).len())
        .collect();

    let threshold = density_threshold(&counts, params.min_relative_density);

    let points: Vec<PointSample> = samples
        .iter()
        .zip(&counts)
        .filter(|&(_, &count)| count >= threshold)
        .map(|(s, _)| *s)
        .collect();

    if points.is_empty() {
        warn!(
            points = samples.len(),
            threshold, "Outlier filter would remove every point, keeping input"
        );
        return OutlierReport::passthrough(samples.to_vec(), threshold, true, false);
    }

    let report = OutlierReport {
        original_count: samples.len(),
        removed: samples.len() - points.len(),
        points,
        threshold,
        fail_open: false,
        skipped: false,
    };
    debug!("{report}");
    report
}

/// `max(2, round(relative * median))` over the neighbour counts.
///
/// The median of an even-length list is its upper middle element.
fn density_threshold(counts: &[usize], relative: f64) -> usize {
    let mut sorted = counts.to_vec();
    sorted.sort_unstable();
    let median = sorted.get(sorted.len() / 2).copied().unwrap_or(0);

    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    let scaled = (relative * median as f64).round().max(0.0) as usize;
    scaled.max(2)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn grid(n: i32, spacing: f64) -> Vec<PointSample> {
        (0..n * n)
            .map(|i| {
                PointSample::from_coords(f64::from(i % n) * spacing, 0.0, f64::from(i / n) * spacing)
            })
            .collect()
    }

    #[test]
    fn test_threshold_floor_is_two() {
        assert_eq!(density_threshold(&[0, 0, 1, 1], 0.3), 2);
        assert_eq!(density_threshold(&[], 0.3), 2);
    }

    #[test]
    fn test_threshold_rounds_scaled_median() {
        // median 20 (upper middle), 0.3 * 20 = 6
        assert_eq!(density_threshold(&[10, 20, 20, 30], 0.3), 6);
        // 0.5 * 15 = 7.5 rounds away from zero
        assert_eq!(density_threshold(&[15, 15, 15], 0.5), 8);
    }

    #[test]
    fn test_isolated_points_fail_open() {
        let samples: Vec<_> = (0..20)
            .map(|i| PointSample::from_coords(f64::from(i), 0.0, 0.0))
            .collect();

        let report = filter_outliers(&samples, &OutlierParams::default(), NeighborStrategy::BruteForce);
        assert!(report.fail_open);
        assert_eq!(report.points, samples);
        assert_eq!(report.removed, 0);
        assert!(report.to_string().contains("fail-open"));
    }

    #[test]
    fn test_small_cloud_is_skipped() {
        // 10 isolated points would all be removed if filtered
        let samples: Vec<_> = (0..10)
            .map(|i| PointSample::from_coords(f64::from(i), 0.0, 0.0))
            .collect();

        let report = filter_outliers(&samples, &OutlierParams::default(), NeighborStrategy::BruteForce);
        assert!(report.skipped);
        assert!(!report.fail_open);
        assert_eq!(report.points.len(), 10);
    }

    #[test]
    fn test_removes_stragglers_keeps_order() {
        let mut samples = grid(6, 0.02);
        samples.insert(7, PointSample::from_coords(1.0, 1.0, 1.0));
        samples.push(PointSample::from_coords(-1.0, 0.5, 0.0));

        let report = filter_outliers(&samples, &OutlierParams::default(), NeighborStrategy::KdTree);
        assert_eq!(report.removed, 2);
        assert_eq!(report.points, grid(6, 0.02));
        assert!(report.removed_percentage() > 0.0);
    }

    #[test]
    fn test_backends_agree() {
        let mut samples = grid(8, 0.03);
        samples.push(PointSample::from_coords(0.5, 0.5, 0.5));
        let params = OutlierParams::default();

        let brute = filter_outliers(&samples, &params, NeighborStrategy::BruteForce);
        let tree = filter_outliers(&samples, &params, NeighborStrategy::KdTree);
        assert_eq!(brute.points, tree.points);
        assert_eq!(brute.threshold, tree.threshold);
    }
}
