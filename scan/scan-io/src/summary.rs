//! JSON scan summaries.
//!
//! The summary is what the UI shows after a scan and what gets stored next
//! to the OBJ. Keys are camelCase:
//!
//! ```json
//! {
//!   "vertexCount": 480,
//!   "faceCount": 1210,
//!   "meshCount": 1,
//!   "boundingBox": { "min": [-0.4, -0.02, -0.4], "max": [0.4, 0.02, 0.4] },
//!   "scanType": "featurePoints"
//! }
//! ```
//!
//! `boundingBox` is `null` for an empty scan.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use scan_recon::Reconstruction;
use scan_types::{Aabb, ScanMesh, ScanType};
use serde::{Deserialize, Serialize};

use crate::error::IoResult;

/// Axis-aligned box as plain arrays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum corner `[x, y, z]`.
    pub min: [f64; 3],
    /// Maximum corner `[x, y, z]`.
    pub max: [f64; 3],
}

impl From<Aabb> for BoundingBox {
    fn from(aabb: Aabb) -> Self {
        let (min, max) = aabb.to_arrays();
        Self { min, max }
    }
}

/// Counts and extent of a finished scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSummary {
    /// Vertices in the exported mesh.
    pub vertex_count: usize,
    /// Triangles in the exported mesh.
    pub face_count: usize,
    /// Meshes in the export: 1 if any faces were produced, else 0.
    pub mesh_count: usize,
    /// Extent of the vertices.
    pub bounding_box: Option<BoundingBox>,
    /// Capture mode.
    pub scan_type: ScanType,
}

impl ScanSummary {
    /// Summary of a bare mesh.
    #[must_use]
    pub fn from_mesh(mesh: &ScanMesh, scan_type: ScanType) -> Self {
        Self {
            vertex_count: mesh.vertex_count(),
            face_count: mesh.face_count(),
            mesh_count: usize::from(!mesh.is_empty()),
            bounding_box: mesh.bounds().map(BoundingBox::from),
            scan_type,
        }
    }

    /// Summary of a reconstruction.
    #[must_use]
    pub fn from_reconstruction(recon: &Reconstruction, scan_type: ScanType) -> Self {
        let (vertex_count, face_count) = recon.summary_counts();
        Self {
            vertex_count,
            face_count,
            mesh_count: usize::from(face_count > 0),
            bounding_box: recon.bounds.map(BoundingBox::from),
            scan_type,
        }
    }

    /// Compact JSON.
    ///
    /// # Errors
    ///
    /// Returns a JSON error if serialization fails.
    pub fn to_json(&self) -> IoResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Indented JSON.
    ///
    /// # Errors
    ///
    /// Returns a JSON error if serialization fails.
    pub fn to_json_pretty(&self) -> IoResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Writes `summary` as pretty JSON to `path`.
///
/// # Errors
///
/// Fails if the file cannot be created or written.
pub fn save_summary<P: AsRef<Path>>(summary: &ScanSummary, path: P) -> IoResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, summary)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
