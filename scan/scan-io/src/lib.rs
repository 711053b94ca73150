//! File output for AR scans.
//!
//! This crate writes what `scan-recon` produces:
//!
//! - **OBJ** - Vertices, per-vertex normals and 1-indexed faces
//! - **MTL** - A companion material library
//! - **JSON** - Scan summary with counts, bounds and scan type
//! - **Config** - Pipeline parameters loaded from partial JSON documents
//!
//! # Example
//!
//! ```no_run
//! use scan_io::export_reconstruction;
//! use scan_recon::{PipelineParams, ScanController};
//! use scan_types::ScanType;
//!
//! let params = scan_io::load_params("scan.json").unwrap();
//! let scanner = ScanController::new(params);
//! scanner.start_scan();
//! // ... feed frames ...
//! let result = scanner.stop_scan().unwrap();
//!
//! let files = export_reconstruction(&result, "out", "table", ScanType::FeaturePoints).unwrap();
//! println!("wrote {}", files.obj.display());
//! ```
//!
//! Meshes are validated before anything is written; an out-of-range face
//! index yields [`IoError::InvalidMesh`] instead of a broken file.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![allow(clippy::module_name_repetitions)]

mod config;
mod error;
mod export;
mod mtl;
mod obj;
mod summary;

pub use config::{load_params, params_from_json, save_params};
pub use error::{IoError, IoResult};
pub use export::{export_reconstruction, ExportedFiles};
pub use mtl::{save_mtl, save_obj_with_material, write_mtl, Material};
pub use obj::{save_obj, save_obj_with_options, write_obj, ObjOptions};
pub use summary::{save_summary, BoundingBox, ScanSummary};
