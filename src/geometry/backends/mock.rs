//! Mock geometry backend for testing.
//!
//! This backend provides a simple, hand-wired implementation for unit
//! testing the selection and contour logic without running an actual
//! Delaunay triangulation. Inserted points become isolated vertices; the
//! triangle list is fixed at construction.

use crate::geometry::traits::{EdgeKey, TriangulatorBackend, VertexId};

/// Mock backend errors
#[derive(Debug, thiserror::Error)]
pub enum MockError {
    /// Invalid vertex identity provided
    #[error("invalid vertex {0}")]
    Vertex(VertexId),

    /// No edge connects the two vertices
    #[error("no edge between {0} and {1}")]
    Edge(VertexId, VertexId),

    /// Coordinates outside the admissible box
    #[error("point ({0}, {1}) outside admissible interval")]
    OutOfRange(f64, f64),
}

/// Mock backend holding an explicit vertex and triangle list.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    positions: Vec<(f64, f64)>,
    triangles: Vec<[VertexId; 3]>,
}

impl MockBackend {
    /// Builds a backend from explicit positions and triangle index triples.
    ///
    /// # Panics
    /// Panics if a triangle references a vertex that does not exist.
    #[must_use]
    pub fn from_parts(positions: Vec<(f64, f64)>, triangles: Vec<[usize; 3]>) -> Self {
        let triangles = triangles
            .into_iter()
            .map(|[a, b, c]| {
                assert!(a < positions.len() && b < positions.len() && c < positions.len());
                [VertexId::new(a), VertexId::new(b), VertexId::new(c)]
            })
            .collect();
        Self {
            positions,
            triangles,
        }
    }

    /// Builds a backend with a fixed triangle topology and no vertices yet.
    ///
    /// Positions are supplied later through `insert`, in identity order.
    /// Useful for driving a `MeshStore` whose side tables must line up with
    /// backend identities.
    #[must_use]
    pub fn with_topology(triangles: Vec<[usize; 3]>) -> Self {
        Self {
            positions: Vec::new(),
            triangles: triangles
                .into_iter()
                .map(|[a, b, c]| [VertexId::new(a), VertexId::new(b), VertexId::new(c)])
                .collect(),
        }
    }

    /// A single triangle inside the admissible box.
    #[must_use]
    pub fn single_triangle() -> Self {
        Self::from_parts(
            vec![(1.2, 1.2), (1.8, 1.2), (1.5, 1.7)],
            vec![[0, 1, 2]],
        )
    }

    /// A fan of four triangles around a central vertex.
    ///
    /// Vertex 0 is the hub; vertices 1..=4 sit east, north, west, and south
    /// of it, so hub spokes are interior edges and the rim is the hull.
    #[must_use]
    pub fn fan() -> Self {
        Self::from_parts(
            vec![
                (1.5, 1.5),
                (1.8, 1.5),
                (1.5, 1.8),
                (1.2, 1.5),
                (1.5, 1.2),
            ],
            vec![[0, 1, 2], [0, 2, 3], [0, 3, 4], [0, 4, 1]],
        )
    }

    fn unique_edges(&self) -> Vec<EdgeKey> {
        let mut keys: Vec<EdgeKey> = self
            .triangles
            .iter()
            .flat_map(|t| {
                [
                    EdgeKey::new(t[0], t[1]),
                    EdgeKey::new(t[1], t[2]),
                    EdgeKey::new(t[2], t[0]),
                ]
            })
            .collect();
        keys.sort_unstable();
        keys.dedup();
        keys
    }
}

impl TriangulatorBackend for MockBackend {
    type Error = MockError;

    fn backend_name(&self) -> &'static str {
        "mock"
    }

    fn admissible_box(&self) -> (f64, f64) {
        (1.0, 2.0)
    }

    fn insert(&mut self, x: f64, y: f64) -> Result<VertexId, Self::Error> {
        if !(x > 1.0 && x < 2.0 && y > 1.0 && y < 2.0) {
            return Err(MockError::OutOfRange(x, y));
        }
        // Exact duplicates collapse onto the existing vertex, mirroring the
        // production backend.
        if let Some(existing) = self.positions.iter().position(|&p| p == (x, y)) {
            return Ok(VertexId::new(existing));
        }
        self.positions.push((x, y));
        Ok(VertexId::new(self.positions.len() - 1))
    }

    fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    fn edge_count(&self) -> usize {
        self.unique_edges().len()
    }

    fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    fn position(&self, v: VertexId) -> Result<(f64, f64), Self::Error> {
        self.positions
            .get(v.index())
            .copied()
            .ok_or(MockError::Vertex(v))
    }

    fn triangles(&self) -> Box<dyn Iterator<Item = [VertexId; 3]> + '_> {
        Box::new(self.triangles.iter().copied())
    }

    fn edges(&self) -> Box<dyn Iterator<Item = (VertexId, VertexId)> + '_> {
        Box::new(
            self.unique_edges()
                .into_iter()
                .map(|k| (k.lo(), k.hi())),
        )
    }

    fn edge_triangles(&self, a: VertexId, b: VertexId) -> Result<Vec<[VertexId; 3]>, Self::Error> {
        let key = EdgeKey::new(a, b);
        let incident: Vec<[VertexId; 3]> = self
            .triangles
            .iter()
            .filter(|t| {
                [
                    EdgeKey::new(t[0], t[1]),
                    EdgeKey::new(t[1], t[2]),
                    EdgeKey::new(t[2], t[0]),
                ]
                .contains(&key)
            })
            .copied()
            .collect();
        if incident.is_empty() {
            return Err(MockError::Edge(a, b));
        }
        Ok(incident)
    }
}
