//! Wavefront OBJ writer.
//!
//! Writes `v` lines, `vn` lines when the mesh has normals, and 1-indexed
//! faces: `f a//a b//b c//c` with normals, `f a b c` without. Vertex and
//! normal indices coincide because normals are per vertex.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use scan_types::ScanMesh;

use crate::error::IoResult;

/// Options for [`write_obj`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjOptions {
    /// Material library to reference with `mtllib`.
    pub mtllib: Option<String>,

    /// Material to select with `usemtl` before the faces.
    pub material: Option<String>,

    /// Write `vn` lines and `//` face references when normals exist.
    /// Default: true.
    pub write_normals: bool,

    /// Digits after the decimal point. Default: 6.
    pub precision: usize,
}

impl Default for ObjOptions {
    fn default() -> Self {
        Self {
            mtllib: None,
            material: None,
            write_normals: true,
            precision: 6,
        }
    }
}

impl ObjOptions {
    /// References `library` and selects `material` from it.
    #[must_use]
    pub fn with_material(mut self, library: impl Into<String>, material: impl Into<String>) -> Self {
        self.mtllib = Some(library.into());
        self.material = Some(material.into());
        self
    }

    /// Sets whether normals are written.
    #[must_use]
    pub const fn with_normals(mut self, write_normals: bool) -> Self {
        self.write_normals = write_normals;
        self
    }
}

/// Writes `mesh` as OBJ text.
///
/// # Errors
///
/// Returns [`IoError::InvalidMesh`](crate::IoError::InvalidMesh) if a face
/// references a missing vertex, or an I/O error from the writer.
///
/// # Example
///
/// ```
/// use scan_io::{write_obj, ObjOptions};
/// use scan_types::{ScanMesh, Point3};
///
/// let mut mesh = ScanMesh::from_points([
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 0.0, 1.0),
/// ]);
/// mesh.faces.push([0, 1, 2]);
///
/// let mut out = Vec::new();
/// write_obj(&mesh, &mut out, &ObjOptions::default()).unwrap();
/// let text = String::from_utf8(out).unwrap();
/// assert!(text.contains("f 1 2 3"));
/// ```
pub fn write_obj<W: Write>(mesh: &ScanMesh, mut writer: W, options: &ObjOptions) -> IoResult<()> {
    mesh.validate()?;
    let p = options.precision;

    writeln!(
        writer,
        "# {} vertices, {} faces",
        mesh.vertex_count(),
        mesh.face_count()
    )?;
    if let Some(lib) = &options.mtllib {
        writeln!(writer, "mtllib {lib}")?;
    }

    for v in &mesh.vertices {
        writeln!(writer, "v {:.p$} {:.p$} {:.p$}", v.x, v.y, v.z)?;
    }

    let normals = mesh.normals.as_ref().filter(|_| options.write_normals);
    if let Some(normals) = normals {
        for n in normals {
            writeln!(writer, "vn {:.p$} {:.p$} {:.p$}", n.x, n.y, n.z)?;
        }
    }

    if let Some(material) = &options.material {
        writeln!(writer, "usemtl {material}")?;
    }

    for face in &mesh.faces {
        let [a, b, c] = face.map(|i| u64::from(i) + 1);
        if normals.is_some() {
            writeln!(writer, "f {a}//{a} {b}//{b} {c}//{c}")?;
        } else {
            writeln!(writer, "f {a} {b} {c}")?;
        }
    }

    writer.flush()?;
    Ok(())
}

/// Saves `mesh` to an OBJ file with default options.
///
/// # Errors
///
/// See [`write_obj`]; also fails if the file cannot be created.
pub fn save_obj<P: AsRef<Path>>(mesh: &ScanMesh, path: P) -> IoResult<()> {
    save_obj_with_options(mesh, path, &ObjOptions::default())
}

/// Saves `mesh` to an OBJ file.
///
/// # Errors
///
/// See [`write_obj`]; also fails if the file cannot be created.
pub fn save_obj_with_options<P: AsRef<Path>>(
    mesh: &ScanMesh,
    path: P,
    options: &ObjOptions,
) -> IoResult<()> {
    // validate before touching the file system
    mesh.validate()?;
    let file = File::create(path)?;
    write_obj(mesh, BufWriter::new(file), options)
}
