//! Mesh and file export for tessellations
//!
//! Generates engine-agnostic mesh data from resolved cells, and writes
//! complete cells as Wavefront OBJ polygons.

use std::io::Write;

use glam::DVec3;

use crate::error::Result;
use crate::tessellation::Tessellation;

/// Engine-agnostic mesh data output
///
/// Contains raw vertex data suitable for any rendering engine:
/// - Bevy: Convert to `Mesh` with attributes
/// - Godot: Convert to `ArrayMesh`
/// - wgpu: Use directly as vertex buffers
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    /// Vertex positions (3D coordinates on the unit sphere)
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals (equal to the positions on the unit sphere)
    pub normals: Vec<[f32; 3]>,
    /// Index of the cell each vertex belongs to
    pub cell_ids: Vec<u32>,
    /// Triangle indices
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Get the number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check if mesh is empty
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Generate a mesh from every resolved cell
///
/// Each cell is triangulated as a triangle fan from its position to its
/// corners, which must be sorted (the default configuration sorts them).
pub fn generate_mesh(tessellation: &Tessellation) -> MeshData {
    let mut mesh = MeshData::default();

    for cell in tessellation.cells() {
        // Skip degenerate cells
        if !cell.is_resolved() {
            continue;
        }
        triangulate_cell(cell.id as u32, cell.position, &cell.corners, &mut mesh);
    }

    mesh
}

/// Triangulate a single cell as a triangle fan
fn triangulate_cell(cell_id: u32, center: DVec3, corners: &[DVec3], mesh: &mut MeshData) {
    let base_idx = mesh.positions.len() as u32;

    for vertex in std::iter::once(&center).chain(corners) {
        let position = vertex.as_vec3();
        mesh.positions.push(position.to_array());
        mesh.normals.push(position.normalize_or_zero().to_array());
        mesh.cell_ids.push(cell_id);
    }

    let num_corners = corners.len() as u32;
    for i in 0..num_corners {
        let next_i = (i + 1) % num_corners;
        mesh.indices.push(base_idx);
        mesh.indices.push(base_idx + 1 + i);
        mesh.indices.push(base_idx + 1 + next_i);
    }
}

/// Write every complete cell with at least three corners as an OBJ polygon
///
/// Each cell emits its corners as `v` lines followed by one `f` line with
/// negative (relative) indices, so cells can be written independently.
///
/// # Errors
///
/// Returns `Io` if writing fails.
///
/// # Example
///
/// ```
/// use rust_voronoi_sweep::*;
///
/// let config = GeneratorConfigBuilder::new().seed(2).build().unwrap();
/// let tessellation = Tessellation::generate_random(50, config).unwrap();
///
/// let mut obj = Vec::new();
/// write_obj(&tessellation, &mut obj).unwrap();
/// assert!(String::from_utf8(obj).unwrap().contains("f -"));
/// ```
pub fn write_obj<W: Write>(tessellation: &Tessellation, mut writer: W) -> Result<()> {
    for cell in tessellation.cells() {
        if !cell.complete || !cell.is_resolved() {
            continue;
        }

        let n = cell.corners.len() as i64;
        for corner in &cell.corners {
            writeln!(writer, "v {:.6} {:.6} {:.6}", corner.x, corner.y, corner.z)?;
        }
        let face: Vec<String> = (0..n).map(|j| (j - n).to_string()).collect();
        writeln!(writer, "f {}", face.join(" "))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfigBuilder;

    fn tessellation() -> Tessellation {
        let config = GeneratorConfigBuilder::new().seed(42).build().unwrap();
        Tessellation::generate_random(200, config).unwrap()
    }

    #[test]
    fn test_generate_mesh() {
        let tessellation = tessellation();
        let mesh = generate_mesh(&tessellation);

        assert!(!mesh.is_empty());
        assert_eq!(mesh.positions.len(), mesh.normals.len());
        assert_eq!(mesh.positions.len(), mesh.cell_ids.len());
        assert_eq!(mesh.indices.len() % 3, 0);

        let resolved: Vec<_> = tessellation.cells().iter().filter(|c| c.is_resolved()).collect();
        let corners: usize = resolved.iter().map(|c| c.corner_count()).sum();
        assert_eq!(mesh.vertex_count(), resolved.len() + corners);
        assert_eq!(mesh.triangle_count(), corners);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
    }

    #[test]
    fn test_mesh_consistency() {
        let tessellation = tessellation();
        let mesh1 = generate_mesh(&tessellation);
        let mesh2 = generate_mesh(&tessellation);

        assert_eq!(mesh1.vertex_count(), mesh2.vertex_count());
        assert_eq!(mesh1.indices, mesh2.indices);
    }

    #[test]
    fn test_write_obj() {
        let tessellation = tessellation();
        let mut out = Vec::new();
        write_obj(&tessellation, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let written: Vec<_> = tessellation
            .cells()
            .iter()
            .filter(|c| c.complete && c.is_resolved())
            .collect();
        let faces: Vec<&str> = text.lines().filter(|l| l.starts_with("f ")).collect();
        assert_eq!(faces.len(), written.len());

        let vertices = text.lines().filter(|l| l.starts_with("v ")).count();
        assert_eq!(vertices, written.iter().map(|c| c.corner_count()).sum::<usize>());

        // Faces reference only the vertices written right before them.
        let n = written[0].corner_count();
        let expected: Vec<String> = (0..n as i64).map(|j| (j - n as i64).to_string()).collect();
        assert_eq!(faces[0], format!("f {}", expected.join(" ")));
    }
}
