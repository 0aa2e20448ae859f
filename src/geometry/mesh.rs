//! Mesh store: the triangulator plus per-vertex side tables.
//!
//! Vertex attributes (user-coordinate position, function value, quadrant)
//! are stored in tables keyed by vertex identity rather than inside the
//! triangulator's node payload, so the triangulator remains a black box
//! behind [`TriangulatorBackend`].

use crate::errors::{GrpfError, GrpfResult};
use crate::geometry::mapper::PlaneMapper;
use crate::geometry::traits::{TriangulatorBackend, VertexId};
use crate::grpf::quadrant::Quadrant;
use num_complex::Complex64;
use std::collections::HashSet;

/// Spatial dedup resolution in triangulator-plane units.
///
/// Candidate midpoints generated in one refinement round can coincide (two
/// triangles sharing an edge propose the same midpoint) or collide with
/// existing vertices; anything closer than this snaps together.
const DEDUP_EPS: f64 = 1e-12;

/// Per-vertex attributes maintained alongside the triangulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexAttr {
    /// Position in user coordinates
    pub position: Complex64,
    /// Function value, once evaluated
    pub value: Option<Complex64>,
    /// Quadrant label, once evaluated
    pub quadrant: Option<Quadrant>,
}

/// The evolving mesh: a triangulator backend plus side tables.
#[derive(Debug)]
pub struct MeshStore<B: TriangulatorBackend> {
    backend: B,
    mapper: PlaneMapper,
    attrs: Vec<VertexAttr>,
    occupied: HashSet<(i64, i64)>,
}

impl<B: TriangulatorBackend> MeshStore<B> {
    /// Creates an empty mesh over the given backend and mapper.
    #[must_use]
    pub fn new(backend: B, mapper: PlaneMapper) -> Self {
        Self {
            backend,
            mapper,
            attrs: Vec::new(),
            occupied: HashSet::new(),
        }
    }

    /// The coordinate mapper in use.
    #[must_use]
    pub const fn mapper(&self) -> &PlaneMapper {
        &self.mapper
    }

    /// Read-only access to the underlying backend.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Number of vertices in the mesh.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.attrs.len()
    }

    /// Number of triangles in the mesh.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.backend.triangle_count()
    }

    /// Inserts user-coordinate points, skipping near-duplicates.
    ///
    /// Returns the identities of vertices that are genuinely new; points
    /// within the dedup resolution of an existing vertex (or of an earlier
    /// point in the same batch) are dropped.
    ///
    /// # Errors
    /// Returns [`GrpfError::InvalidDomain`] if a mapped point escapes the
    /// admissible box, or [`GrpfError::Triangulator`] if the backend
    /// rejects an insertion.
    pub fn insert_points(&mut self, points: &[Complex64]) -> GrpfResult<Vec<VertexId>> {
        let (lo, hi) = self.backend.admissible_box();
        let mut fresh = Vec::new();

        for &z in points {
            let (x, y) = self.mapper.map(z);
            if !(x > lo && x < hi && y > lo && y < hi) {
                return Err(GrpfError::InvalidDomain(format!(
                    "point {z} maps to ({x}, {y}), outside the admissible interval ({lo}, {hi})"
                )));
            }

            let key = grid_key(x, y);
            if !self.occupied.insert(key) {
                continue;
            }

            let id = self
                .backend
                .insert(x, y)
                .map_err(|e| GrpfError::Triangulator(e.to_string()))?;

            if id.index() == self.attrs.len() {
                self.attrs.push(VertexAttr {
                    position: z,
                    value: None,
                    quadrant: None,
                });
                fresh.push(id);
            }
            // Otherwise the backend collapsed an exact duplicate that the
            // grid missed; the existing attributes stay authoritative.
        }

        log::trace!(
            "inserted {} of {} points ({} total vertices)",
            fresh.len(),
            points.len(),
            self.attrs.len()
        );
        Ok(fresh)
    }

    /// O(1) lookup of a vertex's attributes.
    ///
    /// # Errors
    /// Returns [`GrpfError::Triangulator`] if the identity is unknown.
    pub fn vertex_attr(&self, v: VertexId) -> GrpfResult<&VertexAttr> {
        self.attrs
            .get(v.index())
            .ok_or_else(|| GrpfError::Triangulator(format!("unknown vertex {v}")))
    }

    /// The user-coordinate position of a vertex.
    ///
    /// # Panics
    /// Panics if the identity was not produced by this mesh.
    #[must_use]
    pub fn user_position(&self, v: VertexId) -> Complex64 {
        self.attrs[v.index()].position
    }

    /// The quadrant of a vertex, if it has been evaluated.
    #[must_use]
    pub fn quadrant(&self, v: VertexId) -> Option<Quadrant> {
        self.attrs.get(v.index()).and_then(|a| a.quadrant)
    }

    /// Records the evaluation result for a vertex.
    ///
    /// Each vertex is evaluated exactly once; re-recording is a logic error.
    ///
    /// # Panics
    /// Panics if the vertex already has a value.
    pub fn record_evaluation(&mut self, v: VertexId, value: Complex64, quadrant: Quadrant) {
        let attr = &mut self.attrs[v.index()];
        assert!(attr.value.is_none(), "vertex {v} evaluated twice");
        attr.value = Some(value);
        attr.quadrant = Some(quadrant);
    }

    /// Identities of vertices still lacking an evaluation.
    #[must_use]
    pub fn unevaluated(&self) -> Vec<VertexId> {
        self.attrs
            .iter()
            .enumerate()
            .filter(|(_, a)| a.quadrant.is_none())
            .map(|(i, _)| VertexId::new(i))
            .collect()
    }

    /// Edge length measured in user coordinates.
    #[must_use]
    pub fn edge_length(&self, a: VertexId, b: VertexId) -> f64 {
        (self.user_position(a) - self.user_position(b)).norm()
    }

    /// Iterate over all triangles.
    pub fn triangles(&self) -> Box<dyn Iterator<Item = [VertexId; 3]> + '_> {
        self.backend.triangles()
    }

    /// Iterate over all unique edges.
    pub fn edges(&self) -> Box<dyn Iterator<Item = (VertexId, VertexId)> + '_> {
        self.backend.edges()
    }

    /// The 1 or 2 triangles incident to an edge.
    ///
    /// # Errors
    /// Returns [`GrpfError::Triangulator`] if the backend does not know the
    /// edge.
    pub fn edge_triangles(&self, a: VertexId, b: VertexId) -> GrpfResult<Vec<[VertexId; 3]>> {
        self.backend
            .edge_triangles(a, b)
            .map_err(|e| GrpfError::Triangulator(e.to_string()))
    }
}

#[allow(clippy::cast_possible_truncation)]
fn grid_key(x: f64, y: f64) -> (i64, i64) {
    ((x / DEDUP_EPS).round() as i64, (y / DEDUP_EPS).round() as i64)
}
