//! Plot-data extraction.
//!
//! Projects the final mesh state back to user coordinates so callers can
//! visualize the triangulation, the quadrant coloring, and the
//! phase-reversal edges without touching the triangulator.

use crate::geometry::mesh::MeshStore;
use crate::geometry::traits::TriangulatorBackend;
use crate::grpf::quadrant::Quadrant;
use crate::grpf::selector::CandidateSet;
use num_complex::Complex64;

/// A backend-independent snapshot of the mesh in user coordinates.
#[derive(Debug, Clone, Default)]
pub struct PlotData {
    /// Vertex positions, indexed by dense vertex identity
    pub vertices: Vec<Complex64>,
    /// Quadrant label per vertex (0 for nodes and unevaluated vertices)
    pub quadrants: Vec<u8>,
    /// Triangles as vertex index triples
    pub triangles: Vec<[usize; 3]>,
    /// Edges as index pairs with their signed phase jumps
    pub edges: Vec<(usize, usize, Option<i8>)>,
}

impl PlotData {
    /// Captures the current mesh state.
    #[must_use]
    pub fn from_mesh<B: TriangulatorBackend>(
        mesh: &MeshStore<B>,
        candidates: &CandidateSet,
    ) -> Self {
        let count = mesh.vertex_count();
        let mut vertices = Vec::with_capacity(count);
        let mut quadrants = Vec::with_capacity(count);
        for i in 0..count {
            let v = crate::geometry::traits::VertexId::new(i);
            vertices.push(mesh.user_position(v));
            quadrants.push(mesh.quadrant(v).unwrap_or(Quadrant::Node).label());
        }

        let triangles = mesh
            .triangles()
            .map(|t| [t[0].index(), t[1].index(), t[2].index()])
            .collect();

        let edges = candidates
            .edge_jumps
            .iter()
            .map(|e| (e.a.index(), e.b.index(), e.jump))
            .collect();

        Self {
            vertices,
            quadrants,
            triangles,
            edges,
        }
    }
}
