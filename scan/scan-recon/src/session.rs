//! Scan lifecycle and the shared handle used by frame sources and the UI.
//!
//! [`ScanSession`] is the plain state: an active flag plus the point
//! accumulator. [`ScanController`] wraps it in one mutex so the frame
//! callback and the UI thread can share it. The lock is only held for
//! bookkeeping; reconstruction works on a snapshot taken at stop time,
//! either inline ([`ScanController::stop_scan`]) or on the rayon pool
//! ([`ScanController::stop_scan_async`]).
//!
//! # Example
//!
//! ```
//! use scan_recon::{PipelineParams, ScanController};
//! use scan_types::PointSample;
//!
//! let scanner = ScanController::new(PipelineParams::default());
//! scanner.start_scan();
//!
//! let frame_source = scanner.clone();
//! frame_source.accept((0..100).map(|i| {
//!     PointSample::from_coords(f64::from(i % 10) * 0.03, 0.0, f64::from(i / 10) * 0.03)
//! }));
//!
//! let result = scanner.stop_scan().unwrap();
//! assert!(result.mesh.face_count() > 0);
//! assert!(!scanner.is_active());
//! ```

use std::sync::{mpsc, Arc};

use parking_lot::Mutex;
use scan_types::{Aabb, PointBatch, PointSample};
use tracing::{debug, info};

use crate::accumulator::PointAccumulator;
use crate::error::{ScanError, ScanResult};
use crate::params::PipelineParams;
use crate::pipeline::{reconstruct, Reconstruction};

/// State of one scan.
#[derive(Debug, Clone, Default)]
pub struct ScanSession {
    active: bool,
    points: PointAccumulator,
}

impl ScanSession {
    /// An idle session using `params` for its accumulator.
    #[must_use]
    pub fn new(params: &PipelineParams) -> Self {
        Self {
            active: false,
            points: PointAccumulator::new(params.accumulator.clone()),
        }
    }

    /// Discards previous points and starts accepting.
    pub fn start(&mut self) {
        self.points.clear();
        self.active = true;
    }

    /// Accepts samples while active; returns how many were appended.
    pub fn accept(&mut self, samples: impl IntoIterator<Item = PointSample>) -> usize {
        if !self.active {
            return 0;
        }
        self.points.accept(samples)
    }

    /// Stops accepting and returns the retained samples.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::NotScanning`] if the session was not active.
    pub fn stop(&mut self) -> ScanResult<Vec<PointSample>> {
        if !self.active {
            return Err(ScanError::NotScanning);
        }
        self.active = false;
        Ok(self.points.snapshot())
    }

    /// Stops and discards everything.
    pub fn clear(&mut self) {
        self.active = false;
        self.points.clear();
    }

    /// True between `start` and `stop`/`clear`.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// The point store.
    #[must_use]
    pub const fn points(&self) -> &PointAccumulator {
        &self.points
    }
}

/// Cloneable, thread-safe handle to a [`ScanSession`].
///
/// Clones share the same session; hand one to the frame source and keep
/// one for the UI.
#[derive(Debug, Clone)]
pub struct ScanController {
    session: Arc<Mutex<ScanSession>>,
    params: Arc<PipelineParams>,
}

impl Default for ScanController {
    fn default() -> Self {
        Self::new(PipelineParams::default())
    }
}

impl ScanController {
    /// Creates an idle controller.
    #[must_use]
    pub fn new(params: PipelineParams) -> Self {
        Self {
            session: Arc::new(Mutex::new(ScanSession::new(&params))),
            params: Arc::new(params),
        }
    }

    /// The pipeline configuration.
    #[must_use]
    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    /// Resets the session and starts accepting points.
    pub fn start_scan(&self) {
        self.session.lock().start();
        info!(max_points = self.params.accumulator.max_points, "Scan started");
    }

    /// Accepts samples; ignored unless a scan is active.
    pub fn accept(&self, samples: impl IntoIterator<Item = PointSample>) -> usize {
        self.session.lock().accept(samples)
    }

    /// Accepts a frame batch, tagging untagged samples with its pose.
    pub fn accept_batch(&self, batch: PointBatch) -> usize {
        self.accept(batch.into_samples())
    }

    /// Stops the scan and reconstructs on the calling thread.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::NotScanning`] if no scan is active.
    pub fn stop_scan(&self) -> ScanResult<Reconstruction> {
        let samples = self.take_snapshot()?;
        let result = reconstruct(&samples, &self.params);
        info!("{result}");
        Ok(result)
    }

    /// Stops the scan and reconstructs on the rayon thread pool.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::NotScanning`] if no scan is active.
    pub fn stop_scan_async(&self) -> ScanResult<ReconstructionJob> {
        let samples = self.take_snapshot()?;
        let params = Arc::clone(&self.params);
        let (tx, rx) = mpsc::channel();

        rayon::spawn(move || {
            let result = reconstruct(&samples, &params);
            info!("{result}");
            // receiver may have been dropped; nothing to do then
            let _ = tx.send(result);
        });

        Ok(ReconstructionJob { rx })
    }

    /// Stops the scan and discards its points without reconstructing.
    pub fn clear_scan(&self) {
        self.session.lock().clear();
        debug!("Scan cleared");
    }

    /// Copies the current points for display.
    #[must_use]
    pub fn snapshot(&self) -> Vec<PointSample> {
        self.session.lock().points().snapshot()
    }

    /// Number of retained points.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.session.lock().points().len()
    }

    /// Running bounds of the scan so far.
    #[must_use]
    pub fn bounds(&self) -> Option<Aabb> {
        self.session.lock().points().bounds()
    }

    /// True while a scan is accepting points.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.session.lock().is_active()
    }

    fn take_snapshot(&self) -> ScanResult<Vec<PointSample>> {
        let samples = self.session.lock().stop()?;
        info!(points = samples.len(), "Scan stopped");
        Ok(samples)
    }
}

/// A reconstruction running in the background.
#[derive(Debug)]
pub struct ReconstructionJob {
    rx: mpsc::Receiver<Reconstruction>,
}

impl ReconstructionJob {
    /// Blocks until the result is ready.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::WorkerDisconnected`] if the worker died.
    pub fn wait(self) -> ScanResult<Reconstruction> {
        self.rx.recv().map_err(|_| ScanError::WorkerDisconnected)
    }

    /// Returns the result if it is ready, without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::WorkerDisconnected`] if the worker died.
    pub fn try_take(&self) -> ScanResult<Option<Reconstruction>> {
        match self.rx.try_recv() {
            Ok(result) => Ok(Some(result)),
            Err(mpsc::TryRecvError::Empty) => Ok(None),
            Err(mpsc::TryRecvError::Disconnected) => Err(ScanError::WorkerDisconnected),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use scan_types::CameraPose;
    use std::thread;

    fn grid_row(row: i32) -> Vec<PointSample> {
        (0..10)
            .map(|i| PointSample::from_coords(f64::from(i) * 0.03, 0.0, f64::from(row) * 0.03))
            .collect()
    }

    #[test]
    fn test_accept_ignored_while_idle() {
        let scanner = ScanController::default();
        assert_eq!(scanner.accept(grid_row(0)), 0);
        assert_eq!(scanner.point_count(), 0);

        scanner.start_scan();
        assert_eq!(scanner.accept(grid_row(0)), 10);
        assert!(scanner.is_active());
    }

    #[test]
    fn test_stop_without_start() {
        let scanner = ScanController::default();
        assert_eq!(scanner.stop_scan().unwrap_err(), ScanError::NotScanning);

        scanner.start_scan();
        scanner.stop_scan().unwrap();
        assert_eq!(scanner.stop_scan().unwrap_err(), ScanError::NotScanning);
    }

    #[test]
    fn test_stop_keeps_points_until_restart() {
        let scanner = ScanController::default();
        scanner.start_scan();
        scanner.accept(grid_row(0));
        scanner.stop_scan().unwrap();

        assert_eq!(scanner.point_count(), 10);
        assert_eq!(scanner.accept(grid_row(1)), 0);

        scanner.start_scan();
        assert_eq!(scanner.point_count(), 0);
    }

    #[test]
    fn test_clear_discards() {
        let scanner = ScanController::default();
        scanner.start_scan();
        scanner.accept(grid_row(0));
        scanner.clear_scan();

        assert!(!scanner.is_active());
        assert_eq!(scanner.point_count(), 0);
        assert!(scanner.bounds().is_none());
        assert!(scanner.stop_scan().is_err());
    }

    #[test]
    fn test_accept_batch_applies_pose() {
        let scanner = ScanController::default();
        scanner.start_scan();
        let pose = CameraPose::default();
        scanner.accept_batch(PointBatch::with_pose(grid_row(0), pose));

        assert!(scanner.snapshot().iter().all(|s| s.source_pose == Some(pose)));
    }

    #[test]
    fn test_concurrent_producers() {
        let scanner = ScanController::new(PipelineParams::default().with_max_points(50));
        scanner.start_scan();

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let producer = scanner.clone();
                thread::spawn(move || {
                    for row in 0..5 {
                        producer.accept(grid_row(t * 5 + row));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(scanner.point_count(), 50);
    }

    #[test]
    fn test_async_stop() {
        let scanner = ScanController::default();
        scanner.start_scan();
        for row in 0..10 {
            scanner.accept(grid_row(row));
        }

        let job = scanner.stop_scan_async().unwrap();
        assert!(!scanner.is_active());

        let result = job.wait().unwrap();
        assert_eq!(result.stats.input_points, 100);
        assert!(result.mesh.face_count() > 0);
    }

    #[test]
    fn test_try_take_eventually_ready() {
        let scanner = ScanController::default();
        scanner.start_scan();
        scanner.accept(grid_row(0));
        let job = scanner.stop_scan_async().unwrap();

        let result = loop {
            if let Some(result) = job.try_take().unwrap() {
                break result;
            }
            thread::yield_now();
        };
        assert_eq!(result.stats.input_points, 10);
    }
}
