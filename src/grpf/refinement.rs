//! Adaptive refinement of the candidate regions.
//!
//! Each iteration selects the current candidate triangles, subdivides those
//! whose longest user-coordinate edge still exceeds the tolerance (plus any
//! skinny neighbour of a candidate, to keep slivers from starving the
//! argument-principle sum along the contour), inserts the edge midpoints,
//! and re-evaluates. The loop ends when the mesh converges or a safety cap
//! is hit, in which case a warning is logged and the best-effort state is
//! returned.

use crate::errors::GrpfResult;
use crate::geometry::mesh::MeshStore;
use crate::geometry::traits::{TriangulatorBackend, VertexId};
use crate::grpf::evaluator::evaluate_vertices;
use crate::grpf::selector::{CandidateSet, select_candidates};
use crate::grpf::solver::GrpfParams;
use num_complex::Complex64;
use std::collections::HashSet;

/// How the refinement loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// No candidate triangle has an edge above tolerance (or none exist)
    Converged,
    /// `max_iterations` refinement rounds were spent before convergence
    IterationLimit,
    /// The mesh reached `max_nodes` vertices before convergence
    NodeLimit,
}

/// Outcome of the refinement loop.
#[derive(Debug, Clone)]
pub struct RefinementOutcome {
    /// Why the loop stopped
    pub termination: Termination,
    /// Number of selection passes performed (>= 1)
    pub iterations: u32,
    /// Selection state at exit, consumed by the contour tracer
    pub candidates: CandidateSet,
}

/// Runs the refinement loop to convergence or a safety cap.
///
/// # Errors
/// Propagates mesh insertion failures.
pub fn refine<B, F>(
    mesh: &mut MeshStore<B>,
    f: &F,
    params: &GrpfParams,
) -> GrpfResult<RefinementOutcome>
where
    B: TriangulatorBackend,
    F: Fn(Complex64) -> Complex64 + Sync,
{
    let mut passes: u32 = 0;
    let mut rounds: u32 = 0;

    loop {
        passes += 1;
        let candidates = select_candidates(mesh);

        if candidates.is_empty() {
            log::info!("refinement converged after {passes} passes: no phase reversals remain");
            return Ok(RefinementOutcome {
                termination: Termination::Converged,
                iterations: passes,
                candidates,
            });
        }

        if rounds >= params.max_iterations {
            log::warn!(
                "iteration limit ({}) reached with {} candidate triangles outstanding; \
                 returning best-effort results",
                params.max_iterations,
                candidates.candidate_triangles.len()
            );
            return Ok(RefinementOutcome {
                termination: Termination::IterationLimit,
                iterations: passes,
                candidates,
            });
        }
        if mesh.vertex_count() >= params.max_nodes {
            log::warn!(
                "node limit ({}) reached at {} vertices; returning best-effort results",
                params.max_nodes,
                mesh.vertex_count()
            );
            return Ok(RefinementOutcome {
                termination: Termination::NodeLimit,
                iterations: passes,
                candidates,
            });
        }

        let to_subdivide = subdivision_set(mesh, &candidates, params);
        if to_subdivide.is_empty() {
            log::info!(
                "refinement converged after {passes} passes: all candidate edges below {:.3e}",
                params.tolerance
            );
            return Ok(RefinementOutcome {
                termination: Termination::Converged,
                iterations: passes,
                candidates,
            });
        }

        let midpoints = edge_midpoints(mesh, &to_subdivide);
        let fresh = mesh.insert_points(&midpoints)?;
        if fresh.is_empty() {
            // Every proposed midpoint collapsed onto an existing vertex;
            // the mesh cannot be refined further at this resolution.
            log::info!("refinement converged after {passes} passes: mesh at resolution floor");
            return Ok(RefinementOutcome {
                termination: Termination::Converged,
                iterations: passes,
                candidates,
            });
        }

        evaluate_vertices(mesh, &fresh, f, params.multithreading);
        rounds += 1;
        log::debug!(
            "iteration {rounds}: subdivided {} triangles, {} new vertices, {} total",
            to_subdivide.len(),
            fresh.len(),
            mesh.vertex_count()
        );
    }
}

/// Triangles to subdivide this round: candidates whose longest edge (user
/// coordinates) exceeds the tolerance, plus skinny neighbours of candidates.
fn subdivision_set<B: TriangulatorBackend>(
    mesh: &MeshStore<B>,
    candidates: &CandidateSet,
    params: &GrpfParams,
) -> Vec<[VertexId; 3]> {
    let candidate_keys: HashSet<[VertexId; 3]> = candidates
        .candidate_triangles
        .iter()
        .map(|t| triangle_key(*t))
        .collect();

    let mut selected: Vec<[VertexId; 3]> = Vec::new();
    let mut selected_keys: HashSet<[VertexId; 3]> = HashSet::new();

    for &t in &candidates.candidate_triangles {
        if longest_edge(mesh, t) > params.tolerance
            && selected_keys.insert(triangle_key(t))
        {
            selected.push(t);
        }
    }
    // Once every candidate triangle is below tolerance the mesh has
    // converged; sliver handling only supports active refinement.
    if selected.is_empty() {
        return selected;
    }

    // Sliver suppression: skinny non-candidate triangles sharing an edge
    // with any candidate triangle.
    for &t in &candidates.candidate_triangles {
        for (a, b) in triangle_edges(t) {
            let Ok(neighbours) = mesh.edge_triangles(a, b) else {
                continue;
            };
            for n in neighbours {
                let key = triangle_key(n);
                if candidate_keys.contains(&key) || selected_keys.contains(&key) {
                    continue;
                }
                if skinny_ratio(mesh, n) > params.skinny_ratio {
                    selected_keys.insert(key);
                    selected.push(n);
                }
            }
        }
    }

    selected
}

/// Midpoints of the three edges of each triangle, in user coordinates.
///
/// The affine mapper commutes with midpoints, so generating them in user
/// coordinates and mapping on insert is exact.
fn edge_midpoints<B: TriangulatorBackend>(
    mesh: &MeshStore<B>,
    triangles: &[[VertexId; 3]],
) -> Vec<Complex64> {
    let mut points = Vec::with_capacity(triangles.len() * 3);
    for &t in triangles {
        for (a, b) in triangle_edges(t) {
            points.push((mesh.user_position(a) + mesh.user_position(b)) / 2.0);
        }
    }
    points
}

fn triangle_edges(t: [VertexId; 3]) -> [(VertexId, VertexId); 3] {
    [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])]
}

/// Canonical (sorted) form of a triangle for identity comparisons.
fn triangle_key(mut t: [VertexId; 3]) -> [VertexId; 3] {
    t.sort_unstable();
    t
}

fn longest_edge<B: TriangulatorBackend>(mesh: &MeshStore<B>, t: [VertexId; 3]) -> f64 {
    triangle_edges(t)
        .iter()
        .map(|&(a, b)| mesh.edge_length(a, b))
        .fold(0.0, f64::max)
}

fn skinny_ratio<B: TriangulatorBackend>(mesh: &MeshStore<B>, t: [VertexId; 3]) -> f64 {
    let lengths: Vec<f64> = triangle_edges(t)
        .iter()
        .map(|&(a, b)| mesh.edge_length(a, b))
        .collect();
    let longest = lengths.iter().copied().fold(0.0, f64::max);
    let shortest = lengths.iter().copied().fold(f64::INFINITY, f64::min);
    if shortest <= 0.0 {
        f64::INFINITY
    } else {
        longest / shortest
    }
}
