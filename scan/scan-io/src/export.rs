//! One-call export of a finished scan.

use std::fs;
use std::path::{Path, PathBuf};

use scan_recon::Reconstruction;
use scan_types::ScanType;
use tracing::info;

use crate::error::IoResult;
use crate::mtl::{save_obj_with_material, Material};
use crate::summary::{save_summary, ScanSummary};

/// Files written by [`export_reconstruction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFiles {
    /// The mesh.
    pub obj: PathBuf,
    /// Its material library.
    pub mtl: PathBuf,
    /// The JSON summary.
    pub summary: PathBuf,
}

/// Writes `<dir>/<stem>.obj`, `<stem>.mtl` and `<stem>.json`.
///
/// `dir` is created if missing. Existing files are overwritten.
///
/// # Errors
///
/// Fails on an invalid mesh or any file system error.
pub fn export_reconstruction<P: AsRef<Path>>(
    recon: &Reconstruction,
    dir: P,
    stem: &str,
    scan_type: ScanType,
) -> IoResult<ExportedFiles> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let obj = dir.join(format!("{stem}.obj"));
    let mtl = save_obj_with_material(&recon.mesh, &obj, &Material::default())?;

    let summary = dir.join(format!("{stem}.json"));
    save_summary(&ScanSummary::from_reconstruction(recon, scan_type), &summary)?;

    info!(
        dir = %dir.display(),
        stem,
        vertices = recon.mesh.vertex_count(),
        faces = recon.mesh.face_count(),
        "Exported scan"
    );

    Ok(ExportedFiles { obj, mtl, summary })
}
