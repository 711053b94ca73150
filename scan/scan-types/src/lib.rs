//! Core data types for on-device scan reconstruction.
//!
//! This crate provides the foundational types shared by the scan pipeline:
//!
//! - [`PointSample`] - A world-space point with optional normal and camera pose
//! - [`PointBatch`] - One frame's worth of samples, optionally tagged with a pose
//! - [`CameraPose`] - A camera-to-world transform with rigidity validation
//! - [`Aabb`] - Axis-aligned bounding box (incremental or one-pass)
//! - [`ScanMesh`] - Indexed triangle mesh with optional per-vertex normals
//! - [`ShapeDetection`] - Best-effort circle/rectangle label for a cluster
//! - [`ScanType`] - Which capture mode produced a result
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero platform dependencies**. The AR session,
//! frame decoding and UI live outside; they only hand points in and take
//! meshes out.
//!
//! # Units and Axes
//!
//! Coordinates are `f64` meters in the AR world frame. **Y is up**, matching
//! `ARKit` and `ARCore`. Cameras look down their local **-Z** axis.
//!
//! # Example
//!
//! ```
//! use scan_types::{Aabb, PointSample, ScanMesh, Point3};
//!
//! let samples = vec![
//!     PointSample::new(Point3::new(0.0, 0.0, 0.0)),
//!     PointSample::new(Point3::new(1.0, 0.0, 0.0)),
//!     PointSample::new(Point3::new(0.0, 0.0, 1.0)),
//! ];
//!
//! let bounds = Aabb::from_points(samples.iter().map(|s| &s.position));
//! assert!((bounds.size().x - 1.0).abs() < 1e-12);
//!
//! let mut mesh = ScanMesh::from_points(samples.iter().map(|s| s.position));
//! mesh.faces.push([0, 1, 2]);
//! assert!(mesh.validate().is_ok());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![allow(clippy::module_name_repetitions)]

mod bounds;
mod error;
mod mesh;
mod pose;
mod sample;
mod shape;

pub use bounds::Aabb;
pub use error::{MeshError, PoseError};
pub use mesh::ScanMesh;
pub use pose::CameraPose;
pub use sample::{subsample_every_nth, PointBatch, PointSample};
pub use shape::{ScanType, ShapeDetection, ShapeKind};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
