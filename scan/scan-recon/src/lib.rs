//! On-device reconstruction of AR scans.
//!
//! This crate turns the sparse, noisy points an AR session produces into a
//! triangle mesh while the user walks around an object:
//!
//! - **Accumulator** - Bounded FIFO store of incoming samples
//! - **Outlier filter** - Median-density filter that never empties the cloud
//! - **Normals** - Supplied hit-test normals, or a two-neighbour estimate
//! - **Triangulation** - Camera-aware 2.5D meshing with a pose-less fallback
//! - **Shapes** - Best-effort circle/rectangle hints for clusters
//! - **Session** - Thread-safe start/accept/stop lifecycle
//!
//! # Layer 0
//!
//! No platform dependencies. The AR session, rendering and file export live
//! outside; see `scan-io` for OBJ/MTL/JSON output.
//!
//! # Quick Start
//!
//! ```
//! use scan_recon::{PipelineParams, ScanController, TriangulationMode};
//! use scan_types::{CameraPose, PointBatch, PointSample, Point3, Vector3};
//!
//! let scanner = ScanController::new(PipelineParams::feature_points());
//! scanner.start_scan();
//!
//! // One frame: a patch of floor seen from above
//! let pose = CameraPose::look_at(Point3::new(0.1, 1.0, 0.1), Point3::new(0.1, 0.0, 0.1), Vector3::z());
//! let samples = (0..64)
//!     .map(|i| PointSample::from_coords(f64::from(i % 8) * 0.03, 0.0, f64::from(i / 8) * 0.03))
//!     .collect();
//! scanner.accept_batch(PointBatch::with_pose(samples, pose));
//!
//! let result = scanner.stop_scan().unwrap();
//! assert_eq!(result.mode, TriangulationMode::PoseAware);
//! assert!(result.mesh.face_count() > 0);
//! ```
//!
//! # Error Handling
//!
//! Reconstruction never fails. Too few points give a face-less mesh, a
//! collapsing filter keeps its input and invalid poses select the pose-less
//! triangulator. Only session misuse returns a [`ScanError`].
//!
//! # Logging
//!
//! Stages report through `tracing` (`debug!` per stage, `info!` on
//! start/stop, `warn!` on fail-open and invalid poses). No subscriber is
//! installed here.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![allow(clippy::module_name_repetitions)]

pub mod accumulator;
pub mod error;
pub mod neighbors;
pub mod normals;
pub mod outlier;
pub mod params;
pub mod pipeline;
pub mod session;
pub mod shape;
pub mod triangulate;

pub use accumulator::PointAccumulator;
pub use error::{ScanError, ScanResult};
pub use neighbors::{build_query, BruteForce, KdTreeQuery, Neighbor, NeighborQuery, NeighborStrategy};
pub use normals::{estimate_normals, resolve_normals, ResolvedNormals};
pub use outlier::{filter_outliers, OutlierReport};
pub use params::{
    AccumulatorParams, FallbackParams, NormalParams, OutlierParams, PipelineParams,
    PoseAwareParams, ShapeParams, TriangulationParams,
};
pub use pipeline::{reconstruct, PipelineStats, Reconstruction};
pub use session::{ReconstructionJob, ScanController, ScanSession};
pub use shape::{analyze_cluster_for_shape, cluster_points, detect_shapes};
pub use triangulate::{triangulate, Triangulation, TriangulationMode, ViewFrame};
