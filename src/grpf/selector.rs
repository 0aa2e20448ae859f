//! Candidate detection: phase-reversal edges and the triangles they touch.
//!
//! Edges are walked once per iteration; an edge whose endpoint quadrants
//! differ by two carries a phase reversal and is flagged as a candidate,
//! and every triangle incident to a candidate edge (or to an isolated node
//! vertex) becomes a candidate triangle. The returned collections are
//! owned so the mesh can be mutated while they are consumed.

use crate::geometry::mesh::MeshStore;
use crate::geometry::traits::{EdgeKey, TriangulatorBackend, VertexId};
use crate::grpf::quadrant::{self, Quadrant};
use std::collections::HashSet;

/// An edge together with its signed quantized phase jump.
///
/// `jump` is `None` when either endpoint is a node (zero / non-finite
/// evaluation); such edges never become candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeJump {
    /// First endpoint
    pub a: VertexId,
    /// Second endpoint
    pub b: VertexId,
    /// Signed phase jump from `a` to `b`, in [-2, 2]
    pub jump: Option<i8>,
}

/// Result of one selection pass over the mesh.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    /// Every mesh edge with its signed phase jump, in iteration order
    pub edge_jumps: Vec<EdgeJump>,
    /// Candidate (phase-reversal) edges, canonically keyed and sorted
    pub candidate_edges: Vec<EdgeKey>,
    /// Triangles with a candidate edge or an isolated node vertex
    pub candidate_triangles: Vec<[VertexId; 3]>,
}

impl CandidateSet {
    /// Whether the mesh currently shows any phase reversal.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidate_triangles.is_empty()
    }
}

/// Walks all mesh edges and flags candidates.
///
/// A triangle is a candidate if it has a phase-reversal edge, or if it
/// touches an *isolated* node vertex. A singular point hit exactly by a
/// sample (f evaluates to zero or overflows there) carries no usable phase
/// and would otherwise erase the reversals around itself; keeping the ring
/// of triangles around such a node in play lets the contour tracer resolve
/// it by winding number. Nodes adjacent to other nodes stay inert, so a
/// patch of failed evaluations is absorbed without driving refinement.
pub fn select_candidates<B: TriangulatorBackend>(mesh: &MeshStore<B>) -> CandidateSet {
    let mut edge_jumps = Vec::new();
    let mut reversal_keys: HashSet<EdgeKey> = HashSet::new();
    let mut nodes: HashSet<VertexId> = HashSet::new();
    let mut clustered: HashSet<VertexId> = HashSet::new();

    for (a, b) in mesh.edges() {
        let qa = mesh.quadrant(a).unwrap_or(Quadrant::Node);
        let qb = mesh.quadrant(b).unwrap_or(Quadrant::Node);

        let a_is_node = mesh.quadrant(a) == Some(Quadrant::Node);
        let b_is_node = mesh.quadrant(b) == Some(Quadrant::Node);
        if a_is_node {
            nodes.insert(a);
        }
        if b_is_node {
            nodes.insert(b);
        }
        if a_is_node && b_is_node {
            clustered.insert(a);
            clustered.insert(b);
        }

        let jump = quadrant::phase_jump(qa, qb);
        if quadrant::is_reversal(jump) {
            reversal_keys.insert(EdgeKey::new(a, b));
        }
        edge_jumps.push(EdgeJump { a, b, jump });
    }

    let candidate_triangles: Vec<[VertexId; 3]> = mesh
        .triangles()
        .filter(|t| {
            [
                EdgeKey::new(t[0], t[1]),
                EdgeKey::new(t[1], t[2]),
                EdgeKey::new(t[2], t[0]),
            ]
            .iter()
            .any(|k| reversal_keys.contains(k))
                || t.iter().any(|v| nodes.contains(v) && !clustered.contains(v))
        })
        .collect();

    let mut candidate_edges: Vec<EdgeKey> = reversal_keys.into_iter().collect();
    candidate_edges.sort_unstable();

    log::debug!(
        "selection: {} candidate edges, {} candidate triangles over {} edges",
        candidate_edges.len(),
        candidate_triangles.len(),
        edge_jumps.len()
    );

    CandidateSet {
        edge_jumps,
        candidate_edges,
        candidate_triangles,
    }
}
