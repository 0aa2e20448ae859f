//! Spade backend - wraps the spade crate's incremental Delaunay triangulation.
//!
//! This is the ONLY module that directly uses types from the spade crate,
//! providing complete isolation of the triangulator implementation from the
//! root-finding logic. Spade keeps its vertices in an append-only store, so
//! a vertex's fixed-handle index is a stable, dense, insertion-ordered
//! identity as long as no vertex is removed; this backend never removes.

use crate::geometry::traits::{TriangulatorBackend, VertexId};
use spade::handles::FixedVertexHandle;
use spade::{DelaunayTriangulation, InsertionError, Point2, Triangulation};

/// Lower bound of the open admissible coordinate interval.
pub const ADMISSIBLE_MIN: f64 = 1.0;

/// Upper bound of the open admissible coordinate interval.
pub const ADMISSIBLE_MAX: f64 = 2.0;

/// Error type for spade backend operations
#[derive(Debug, thiserror::Error)]
pub enum SpadeBackendError {
    /// Coordinates fall outside the admissible open box
    #[error("point ({x}, {y}) outside admissible interval ({ADMISSIBLE_MIN}, {ADMISSIBLE_MAX})")]
    OutOfRange {
        /// Offending x coordinate
        x: f64,
        /// Offending y coordinate
        y: f64,
    },

    /// Unknown vertex identity
    #[error("unknown vertex {0}")]
    UnknownVertex(VertexId),

    /// No edge connects the two vertices
    #[error("no edge between {0} and {1}")]
    UnknownEdge(VertexId, VertexId),

    /// Insertion rejected by spade
    #[error("insertion failed: {0}")]
    Insertion(#[from] InsertionError),
}

/// Incremental Delaunay backend over `spade::DelaunayTriangulation`.
#[derive(Default)]
pub struct SpadeBackend {
    tri: DelaunayTriangulation<Point2<f64>>,
    /// Fixed handle for each dense vertex identity, in insertion order.
    handles: Vec<FixedVertexHandle>,
}

impl std::fmt::Debug for SpadeBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpadeBackend")
            .field("vertices", &self.tri.num_vertices())
            .field("triangles", &self.tri.num_inner_faces())
            .finish()
    }
}

impl SpadeBackend {
    /// Creates an empty backend, reserving room for `size_hint` vertices.
    #[must_use]
    pub fn with_size_hint(size_hint: usize) -> Self {
        Self {
            tri: DelaunayTriangulation::new(),
            handles: Vec::with_capacity(size_hint),
        }
    }

    fn handle(&self, v: VertexId) -> Result<FixedVertexHandle, SpadeBackendError> {
        self.handles
            .get(v.index())
            .copied()
            .ok_or(SpadeBackendError::UnknownVertex(v))
    }
}

impl TriangulatorBackend for SpadeBackend {
    type Error = SpadeBackendError;

    fn backend_name(&self) -> &'static str {
        "spade"
    }

    fn admissible_box(&self) -> (f64, f64) {
        (ADMISSIBLE_MIN, ADMISSIBLE_MAX)
    }

    fn insert(&mut self, x: f64, y: f64) -> Result<VertexId, Self::Error> {
        if !(x > ADMISSIBLE_MIN && x < ADMISSIBLE_MAX && y > ADMISSIBLE_MIN && y < ADMISSIBLE_MAX) {
            return Err(SpadeBackendError::OutOfRange { x, y });
        }

        let handle = self.tri.insert(Point2::new(x, y))?;
        let index = handle.index();
        if index == self.handles.len() {
            self.handles.push(handle);
        }
        // An index below handles.len() means spade collapsed an exact
        // duplicate onto an existing vertex.
        Ok(VertexId::new(index))
    }

    fn vertex_count(&self) -> usize {
        self.tri.num_vertices()
    }

    fn edge_count(&self) -> usize {
        self.tri.num_undirected_edges()
    }

    fn triangle_count(&self) -> usize {
        self.tri.num_inner_faces()
    }

    fn position(&self, v: VertexId) -> Result<(f64, f64), Self::Error> {
        let handle = self.handle(v)?;
        let p = self.tri.vertex(handle).position();
        Ok((p.x, p.y))
    }

    fn triangles(&self) -> Box<dyn Iterator<Item = [VertexId; 3]> + '_> {
        Box::new(self.tri.inner_faces().map(|face| {
            let [a, b, c] = face.vertices();
            [
                VertexId::new(a.fix().index()),
                VertexId::new(b.fix().index()),
                VertexId::new(c.fix().index()),
            ]
        }))
    }

    fn edges(&self) -> Box<dyn Iterator<Item = (VertexId, VertexId)> + '_> {
        Box::new(self.tri.undirected_edges().map(|edge| {
            let [a, b] = edge.vertices();
            (
                VertexId::new(a.fix().index()),
                VertexId::new(b.fix().index()),
            )
        }))
    }

    fn edge_triangles(&self, a: VertexId, b: VertexId) -> Result<Vec<[VertexId; 3]>, Self::Error> {
        let ha = self.handle(a)?;
        let hb = self.handle(b)?;
        let edge = self
            .tri
            .get_edge_from_neighbors(ha, hb)
            .ok_or(SpadeBackendError::UnknownEdge(a, b))?;

        let mut incident = Vec::with_capacity(2);
        for face in [edge.face(), edge.rev().face()] {
            if let Some(inner) = face.as_inner() {
                let [x, y, z] = inner.vertices();
                incident.push([
                    VertexId::new(x.fix().index()),
                    VertexId::new(y.fix().index()),
                    VertexId::new(z.fix().index()),
                ]);
            }
        }
        Ok(incident)
    }
}
