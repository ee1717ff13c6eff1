//! Triangle meshes in Wavefront OBJ format.
//!
//! The autoencoder driver trains on vertex coordinates only: a mesh with `N`
//! vertices becomes a vector of length `3N` holding all x coordinates, then all
//! y, then all z. Normals and faces are carried along untouched so a
//! reconstructed vector can be written back with the original topology.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::linalg::{Matrix, Real, Vector};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct ObjMesh {
    /// `(N, 3)` vertex positions.
    coords: Matrix<f64>,
    /// `(K, 3)` vertex normals.
    normals: Matrix<f64>,
    /// `(M, 3)` zero-based vertex indices.
    triangles: Matrix<usize>,
}

fn malformed(line_no: usize, msg: impl std::fmt::Display) -> Error {
    Error::MalformedMesh(format!("line {line_no}: {msg}"))
}

impl ObjMesh {
    pub fn new(coords: Matrix<f64>, normals: Matrix<f64>, triangles: Matrix<usize>) -> Result<Self> {
        for (name, cols) in [
            ("coords", coords.cols()),
            ("normals", normals.cols()),
            ("triangles", triangles.cols()),
        ] {
            if cols != 3 {
                return Err(Error::DimensionMismatch(format!(
                    "{name} must have 3 columns, got {cols}"
                )));
            }
        }
        if let Some(&bad) = triangles.as_slice().iter().find(|&&i| i >= coords.rows()) {
            return Err(Error::IndexOutOfBounds(format!(
                "triangle references vertex {bad}, mesh has {} vertices",
                coords.rows()
            )));
        }
        Ok(Self {
            coords,
            normals,
            triangles,
        })
    }

    #[inline]
    pub fn coords(&self) -> &Matrix<f64> {
        &self.coords
    }

    #[inline]
    pub fn normals(&self) -> &Matrix<f64> {
        &self.normals
    }

    #[inline]
    pub fn triangles(&self) -> &Matrix<usize> {
        &self.triangles
    }

    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.coords.rows()
    }

    #[inline]
    pub fn num_triangles(&self) -> usize {
        self.triangles.rows()
    }

    /// Parse `v`, `vn`, and triangular `f` records. Comments, blank lines, and
    /// other record types are skipped.
    pub fn from_obj_str(s: &str) -> Result<Self> {
        let mut coords = Vec::new();
        let mut normals = Vec::new();
        let mut triangles = Vec::new();

        for (idx, line) in s.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut fields = line.split_whitespace();
            let Some(keyword) = fields.next() else {
                continue;
            };
            let rest: Vec<&str> = fields.collect();
            match keyword {
                "v" => coords.extend(parse_xyz(line_no, &rest)?),
                "vn" => normals.extend(parse_xyz(line_no, &rest)?),
                "f" => {
                    if rest.len() != 3 {
                        return Err(malformed(
                            line_no,
                            format!("face must have 3 vertices, got {}", rest.len()),
                        ));
                    }
                    for r in rest {
                        triangles.push(parse_vertex_ref(line_no, r)?);
                    }
                }
                _ => {}
            }
        }

        let coords = Matrix::from_shape_vec((coords.len() / 3, 3), coords)?;
        let normals = Matrix::from_shape_vec((normals.len() / 3, 3), normals)?;
        let triangles = Matrix::from_shape_vec((triangles.len() / 3, 3), triangles)?;
        Self::new(coords, normals, triangles)
            .map_err(|e| Error::MalformedMesh(e.to_string()))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let p = path.as_ref();
        let s = std::fs::read_to_string(p)
            .map_err(|e| Error::Io(format!("failed to read {}: {e}", p.display())))?;
        let mesh = Self::from_obj_str(&s).map_err(|e| match e {
            Error::MalformedMesh(msg) => Error::MalformedMesh(format!("{}: {msg}", p.display())),
            other => other,
        })?;
        log::debug!(
            "loaded {} ({} vertices, {} triangles)",
            p.display(),
            mesh.num_vertices(),
            mesh.num_triangles()
        );
        Ok(mesh)
    }

    /// Load every `.obj` file in `dir`, sorted by file name.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<Self>> {
        let d = dir.as_ref();
        let io_err = |e: std::io::Error| Error::Io(format!("failed to list {}: {e}", d.display()));

        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in std::fs::read_dir(d).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            let is_obj = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("obj"));
            if is_obj && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        paths.iter().map(Self::load).collect()
    }

    pub fn to_obj_string(&self) -> String {
        let mut out = String::new();
        // Writing into a `String` cannot fail.
        let _ = self.write_obj(&mut out);
        out
    }

    fn write_obj(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "# {} vertice(s)", self.coords.rows())?;
        for row in self.coords.as_slice().chunks(3) {
            writeln!(out, "v {} {} {}", row[0], row[1], row[2])?;
        }
        writeln!(out)?;
        writeln!(out, "# {} normal(s)", self.normals.rows())?;
        for row in self.normals.as_slice().chunks(3) {
            writeln!(out, "vn {} {} {}", row[0], row[1], row[2])?;
        }
        writeln!(out)?;
        writeln!(out, "# {} triangle(s)", self.triangles.rows())?;
        for tri in self.triangles.as_slice().chunks(3) {
            let (a, b, c) = (tri[0] + 1, tri[1] + 1, tri[2] + 1);
            writeln!(out, "f {a}//{a} {b}//{b} {c}//{c}")?;
        }
        Ok(())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let p = path.as_ref();
        std::fs::write(p, self.to_obj_string())
            .map_err(|e| Error::Io(format!("failed to write {}: {e}", p.display())))?;
        log::info!("saved mesh to {}", p.display());
        Ok(())
    }

    /// Coordinates as stacked columns: `[x_0..x_n, y_0..y_n, z_0..z_n]`.
    pub fn coords_vector<T: Real>(&self) -> Vector<T> {
        let n = self.coords.rows();
        (0..3)
            .flat_map(|c| (0..n).map(move |r| (r, c)))
            .map(|(r, c)| T::from(self.coords[(r, c)]).unwrap_or_else(T::zero))
            .collect()
    }

    /// Same topology, coordinates taken from a stacked-column vector.
    pub fn with_coords_vector<T: Real>(&self, coords: &Vector<T>) -> Result<Self> {
        let n = self.coords.rows();
        if coords.len() != 3 * n {
            return Err(Error::DimensionMismatch(format!(
                "coordinate vector has length {}, mesh needs {}",
                coords.len(),
                3 * n
            )));
        }

        let mut m = Matrix::zeros(n, 3);
        for c in 0..3 {
            for r in 0..n {
                m[(r, c)] = coords[c * n + r].to_f64().unwrap_or(0.0);
            }
        }
        Ok(Self {
            coords: m,
            normals: self.normals.clone(),
            triangles: self.triangles.clone(),
        })
    }
}

fn parse_xyz(line_no: usize, fields: &[&str]) -> Result<[f64; 3]> {
    // A fourth `w` component is allowed and ignored.
    if !(3..=4).contains(&fields.len()) {
        return Err(malformed(
            line_no,
            format!("expected 3 coordinates, got {}", fields.len()),
        ));
    }
    let mut xyz = [0.0; 3];
    for (slot, tok) in xyz.iter_mut().zip(fields) {
        *slot = tok
            .parse()
            .map_err(|_| malformed(line_no, format!("invalid number {tok:?}")))?;
    }
    Ok(xyz)
}

/// `a`, `a/b`, `a//c`, or `a/b/c`; returns the zero-based vertex index.
fn parse_vertex_ref(line_no: usize, token: &str) -> Result<usize> {
    let vertex = token.split('/').next().unwrap_or(token);
    match vertex.parse::<usize>() {
        Ok(i) if i >= 1 => Ok(i - 1),
        _ => Err(malformed(
            line_no,
            format!("invalid vertex reference {token:?}"),
        )),
    }
}
