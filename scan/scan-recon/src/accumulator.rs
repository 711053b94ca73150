//! Bounded sliding-window point store.
//!
//! Samples arrive in frame-sized batches and are kept in acquisition order.
//! Once the cap is reached the oldest samples are evicted first, so the
//! cloud always reflects the most recent part of the scan.
//!
//! # Example
//!
//! ```
//! use scan_recon::accumulator::PointAccumulator;
//! use scan_recon::params::AccumulatorParams;
//! use scan_types::PointSample;
//!
//! let mut acc = PointAccumulator::new(AccumulatorParams::default().with_max_points(3));
//! acc.accept((0..5).map(|i| PointSample::from_coords(f64::from(i), 0.0, 0.0)));
//!
//! assert_eq!(acc.len(), 3);
//! assert_eq!(acc.total_evicted(), 2);
//! assert_eq!(acc.iter().next().unwrap().position.x, 2.0);
//! ```

use std::collections::VecDeque;

use scan_types::{Aabb, PointSample};
use tracing::trace;

use crate::params::AccumulatorParams;

/// FIFO-capped store of [`PointSample`]s.
#[derive(Debug, Clone, Default)]
pub struct PointAccumulator {
    samples: VecDeque<PointSample>,
    params: AccumulatorParams,
    bounds: Option<Aabb>,
    total_accepted: u64,
    total_evicted: u64,
}

impl PointAccumulator {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new(params: AccumulatorParams) -> Self {
        Self {
            samples: VecDeque::with_capacity(params.max_points.min(8192)),
            params,
            bounds: None,
            total_accepted: 0,
            total_evicted: 0,
        }
    }

    /// Appends a batch, then evicts from the front until the cap holds.
    ///
    /// Returns how many samples were appended. An empty batch changes
    /// nothing.
    pub fn accept(&mut self, batch: impl IntoIterator<Item = PointSample>) -> usize {
        let before = self.samples.len();
        for sample in batch {
            if self.params.track_bounds {
                self.bounds
                    .get_or_insert_with(Aabb::empty)
                    .expand_to_include(&sample.position);
            }
            self.samples.push_back(sample);
        }
        let appended = self.samples.len() - before;
        if appended == 0 {
            return 0;
        }
        self.total_accepted += appended as u64;

        let overflow = self.samples.len().saturating_sub(self.params.max_points);
        if overflow > 0 {
            self.samples.drain(..overflow);
            self.total_evicted += overflow as u64;
            trace!(
                evicted = overflow,
                retained = self.samples.len(),
                "Point cap reached, evicted oldest samples"
            );
        }

        appended
    }

    /// Number of retained samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True if nothing is retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The configured cap.
    #[must_use]
    pub const fn max_points(&self) -> usize {
        self.params.max_points
    }

    /// Drops every sample and resets bounds and counters.
    pub fn clear(&mut self) {
        self.samples.clear();
        self.bounds = None;
        self.total_accepted = 0;
        self.total_evicted = 0;
    }

    /// Copies the retained samples, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<PointSample> {
        self.samples.iter().copied().collect()
    }

    /// Iterates the retained samples, oldest first.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &PointSample> + '_ {
        self.samples.iter()
    }

    /// Running bounds of everything accepted since the last clear.
    ///
    /// Eviction does not shrink this box; call
    /// [`recompute_bounds`](Self::recompute_bounds) for the tight box of the
    /// retained samples. `None` when tracking is off or nothing was accepted.
    #[must_use]
    pub const fn bounds(&self) -> Option<Aabb> {
        self.bounds
    }

    /// Tight bounds of the retained samples, in one pass.
    #[must_use]
    pub fn recompute_bounds(&self) -> Option<Aabb> {
        Aabb::try_from_points(self.samples.iter().map(|s| &s.position))
    }

    /// Samples accepted since the last clear, evicted ones included.
    #[must_use]
    pub const fn total_accepted(&self) -> u64 {
        self.total_accepted
    }

    /// Samples evicted since the last clear.
    #[must_use]
    pub const fn total_evicted(&self) -> u64 {
        self.total_evicted
    }
}
