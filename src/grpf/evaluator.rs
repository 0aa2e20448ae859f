//! Function evaluation over newly inserted mesh vertices.
//!
//! Each vertex is evaluated exactly once. When multithreading is enabled
//! the evaluations run as a data-parallel map with a join barrier before
//! any result is written back, so selection always observes a complete
//! iteration; each result targets its own vertex slot.

use crate::geometry::mesh::MeshStore;
use crate::geometry::traits::{TriangulatorBackend, VertexId};
use crate::grpf::quadrant::Quadrant;
use num_complex::Complex64;
use rayon::prelude::*;
use std::panic::{AssertUnwindSafe, catch_unwind};

/// Evaluates f at the given vertices and records values and quadrants.
///
/// A panicking or non-finite evaluation tags its vertex as a node
/// ([`Quadrant::Node`]); such vertices are never retried.
pub fn evaluate_vertices<B, F>(
    mesh: &mut MeshStore<B>,
    vertices: &[VertexId],
    f: &F,
    multithreading: bool,
) where
    B: TriangulatorBackend,
    F: Fn(Complex64) -> Complex64 + Sync,
{
    let inputs: Vec<(VertexId, Complex64)> = vertices
        .iter()
        .map(|&v| (v, mesh.user_position(v)))
        .collect();

    let evaluate_one = |z: Complex64| -> (Complex64, Quadrant) {
        let value = catch_unwind(AssertUnwindSafe(|| f(z)))
            .unwrap_or_else(|_| Complex64::new(f64::NAN, f64::NAN));
        (value, Quadrant::classify(value))
    };

    let results: Vec<(VertexId, Complex64, Quadrant)> = if multithreading {
        inputs
            .par_iter()
            .map(|&(v, z)| {
                let (value, quadrant) = evaluate_one(z);
                (v, value, quadrant)
            })
            .collect()
    } else {
        inputs
            .iter()
            .map(|&(v, z)| {
                let (value, quadrant) = evaluate_one(z);
                (v, value, quadrant)
            })
            .collect()
    };

    let mut nodes = 0usize;
    for (v, value, quadrant) in results {
        if !quadrant.is_phase() {
            nodes += 1;
        }
        mesh.record_evaluation(v, value, quadrant);
    }

    log::debug!(
        "evaluated {} vertices ({} nodes)",
        vertices.len(),
        nodes
    );
}
