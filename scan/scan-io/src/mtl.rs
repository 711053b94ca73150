//! Companion MTL material files.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use scan_types::ScanMesh;

use crate::error::IoResult;
use crate::obj::{save_obj_with_options, ObjOptions};

/// A single Phong material.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Name referenced by `usemtl`.
    pub name: String,
    /// Ambient colour (`Ka`).
    pub ambient: [f64; 3],
    /// Diffuse colour (`Kd`).
    pub diffuse: [f64; 3],
    /// Specular colour (`Ks`).
    pub specular: [f64; 3],
    /// Specular exponent (`Ns`).
    pub shininess: f64,
    /// Opacity (`d`), 1.0 is opaque.
    pub opacity: f64,
    /// Illumination model (`illum`).
    pub illum: u8,
}

impl Default for Material {
    /// A matte light grey.
    fn default() -> Self {
        Self {
            name: "scan_surface".to_string(),
            ambient: [0.2, 0.2, 0.2],
            diffuse: [0.8, 0.8, 0.8],
            specular: [0.0, 0.0, 0.0],
            shininess: 10.0,
            opacity: 1.0,
            illum: 2,
        }
    }
}

impl Material {
    /// The default material under another name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the diffuse colour.
    #[must_use]
    pub const fn with_diffuse(mut self, rgb: [f64; 3]) -> Self {
        self.diffuse = rgb;
        self
    }
}

/// Writes `material` as MTL text.
///
/// # Errors
///
/// Returns an I/O error from the writer.
pub fn write_mtl<W: Write>(material: &Material, mut writer: W) -> IoResult<()> {
    let rgb = |c: [f64; 3]| format!("{:.4} {:.4} {:.4}", c[0], c[1], c[2]);

    writeln!(writer, "newmtl {}", material.name)?;
    writeln!(writer, "Ka {}", rgb(material.ambient))?;
    writeln!(writer, "Kd {}", rgb(material.diffuse))?;
    writeln!(writer, "Ks {}", rgb(material.specular))?;
    writeln!(writer, "Ns {:.4}", material.shininess)?;
    writeln!(writer, "d {:.4}", material.opacity)?;
    writeln!(writer, "illum {}", material.illum)?;
    writer.flush()?;
    Ok(())
}

/// Saves `material` to an MTL file.
///
/// # Errors
///
/// Fails if the file cannot be created or written.
pub fn save_mtl<P: AsRef<Path>>(material: &Material, path: P) -> IoResult<()> {
    let file = File::create(path)?;
    write_mtl(material, BufWriter::new(file))
}

/// Saves `mesh` to `path` and `material` next to it with an `.mtl`
/// extension. Returns the MTL path.
///
/// # Errors
///
/// Returns [`IoError::InvalidMesh`](crate::IoError::InvalidMesh) for an
/// invalid mesh (nothing is written then), or an I/O error.
pub fn save_obj_with_material<P: AsRef<Path>>(
    mesh: &ScanMesh,
    path: P,
    material: &Material,
) -> IoResult<PathBuf> {
    let path = path.as_ref();
    mesh.validate()?;

    let mtl_path = path.with_extension("mtl");
    let library = mtl_path
        .file_name()
        .map_or_else(|| "material.mtl".to_string(), |n| n.to_string_lossy().into_owned());

    save_mtl(material, &mtl_path)?;
    let options = ObjOptions::default().with_material(library, material.name.clone());
    save_obj_with_options(mesh, path, &options)?;
    Ok(mtl_path)
}
