//! Flat triangle-mesh input for the KD-tree builder.

use beamline_math::Point3;

use crate::error::{KdTreeError, Result};

/// A triangle mesh as flat vertex and index arrays.
///
/// The same layout model and asset loaders hand to the renderer; the
/// builder only reads corner positions out of it.
#[derive(Debug, Clone)]
pub struct TriangleMesh {
    /// Flat array of vertex positions: `[x0, y0, z0, x1, y1, z1, ...]`.
    pub vertices: Vec<f32>,
    /// Flat array of triangle indices: `[i0, i1, i2, ...]`.
    pub indices: Vec<u32>,
}

impl TriangleMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Corner positions of triangle `index`.
    pub fn triangle(&self, index: usize) -> Result<[Point3; 3]> {
        if index >= self.num_triangles() {
            return Err(KdTreeError::IndexOutOfRange {
                index,
                count: self.num_triangles(),
            });
        }
        let i = index * 3;
        Ok([
            self.vertex(self.indices[i])?,
            self.vertex(self.indices[i + 1])?,
            self.vertex(self.indices[i + 2])?,
        ])
    }

    /// Merge another mesh into this one, rebasing its indices.
    pub fn merge(&mut self, other: &TriangleMesh) {
        let offset = self.num_vertices() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices
            .extend(other.indices.iter().map(|&i| i + offset));
    }

    fn vertex(&self, index: u32) -> Result<Point3> {
        let i = index as usize * 3;
        if i + 3 > self.vertices.len() {
            return Err(KdTreeError::MalformedMesh(format!(
                "vertex index {} out of range for {} vertices",
                index,
                self.num_vertices()
            )));
        }
        Ok(Point3::new(
            self.vertices[i],
            self.vertices[i + 1],
            self.vertices[i + 2],
        ))
    }
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Unit quad in the XY plane: 4 vertices, 2 triangles.
    fn quad() -> TriangleMesh {
        TriangleMesh {
            vertices: vec![
                0.0, 0.0, 0.0, //
                1.0, 0.0, 0.0, //
                1.0, 1.0, 0.0, //
                0.0, 1.0, 0.0,
            ],
            indices: vec![0, 1, 2, 0, 2, 3],
        }
    }

    #[test]
    fn test_counts() {
        let mesh = quad();
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_triangles(), 2);
    }

    #[test]
    fn test_triangle_accessor() {
        let mesh = quad();
        let [p0, p1, p2] = mesh.triangle(1).unwrap();
        assert_eq!(p0, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(p1, Point3::new(1.0, 1.0, 0.0));
        assert_eq!(p2, Point3::new(0.0, 1.0, 0.0));

        assert!(matches!(
            mesh.triangle(2),
            Err(KdTreeError::IndexOutOfRange { index: 2, count: 2 })
        ));
    }

    #[test]
    fn test_bad_vertex_index() {
        let mut mesh = quad();
        mesh.indices[4] = 9;
        assert!(matches!(
            mesh.triangle(1),
            Err(KdTreeError::MalformedMesh(_))
        ));
    }

    #[test]
    fn test_merge_rebases_indices() {
        let mut mesh = TriangleMesh::new();
        mesh.merge(&quad());
        assert_eq!(mesh.indices, quad().indices); // offset 0 into an empty mesh

        mesh.merge(&quad());
        assert_eq!(mesh.num_vertices(), 8);
        assert_eq!(mesh.num_triangles(), 4);
        // Second quad's first triangle references the appended vertices
        assert_eq!(&mesh.indices[6..9], &[4, 5, 6]);

        let [p0, _, _] = mesh.triangle(2).unwrap();
        assert_eq!(p0, Point3::new(0.0, 0.0, 0.0));
    }
}
