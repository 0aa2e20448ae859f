//! Contour tracing and winding-number classification.
//!
//! After refinement the candidate triangles tile small patches around each
//! suspected root or pole. The boundary of such a patch (edges used by
//! exactly one candidate triangle) is a closed curve; summing the quantized
//! phase jumps along it counterclockwise and dividing by four yields the
//! winding number of f around the enclosed points. Positive winding means a
//! root, negative a pole, zero a false positive from coarse sampling.

use crate::geometry::mesh::MeshStore;
use crate::geometry::traits::{EdgeKey, TriangulatorBackend, VertexId};
use crate::grpf::quadrant::{self, Quadrant};
use crate::grpf::selector::CandidateSet;
use num_complex::Complex64;
use num_traits::cast::NumCast;
use std::collections::{BTreeMap, HashMap};

/// One classified candidate region.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Arithmetic mean of the region's boundary vertices, user coordinates
    pub location: Complex64,
    /// Quantized winding number; positive for roots, negative for poles
    pub winding: i32,
    /// Distinct boundary vertices, ascending
    pub vertices: Vec<VertexId>,
}

impl Region {
    /// Whether the region encloses at least one root.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.winding > 0
    }

    /// Whether the region encloses at least one pole.
    #[must_use]
    pub const fn is_pole(&self) -> bool {
        self.winding < 0
    }
}

/// Traces candidate-region boundaries and classifies each region.
///
/// Regions are reported in ascending order of their lowest vertex
/// identity, which is stable for a given mesh.
pub fn trace_regions<B: TriangulatorBackend>(
    mesh: &MeshStore<B>,
    candidates: &CandidateSet,
) -> Vec<Region> {
    let boundary = boundary_edges(candidates);
    if boundary.is_empty() {
        return Vec::new();
    }

    let mut regions = Vec::new();
    for component in connected_components(&boundary) {
        let Some(mut loop_vertices) = closed_trail(&component) else {
            log::debug!(
                "dropping open boundary component with {} edges",
                component.len()
            );
            continue;
        };

        if signed_area(mesh, &loop_vertices) < 0.0 {
            loop_vertices.reverse();
        }

        let winding = winding_number(mesh, &loop_vertices);

        let mut vertices: Vec<VertexId> = component
            .iter()
            .flat_map(|k| [k.lo(), k.hi()])
            .collect();
        vertices.sort_unstable();
        vertices.dedup();

        let mut location = Complex64::new(0.0, 0.0);
        for &v in &vertices {
            location += mesh.user_position(v);
        }
        let count: f64 = NumCast::from(vertices.len()).unwrap_or(1.0);
        location /= count;

        regions.push(Region {
            location,
            winding,
            vertices,
        });
    }

    regions.sort_by_key(|r| r.vertices.first().copied());
    regions
}

/// Edges of candidate triangles used by exactly one candidate triangle.
///
/// Interior edges are shared by two candidate triangles and cancel; what
/// remains is the closed boundary of each candidate patch.
fn boundary_edges(candidates: &CandidateSet) -> Vec<EdgeKey> {
    let mut usage: BTreeMap<EdgeKey, usize> = BTreeMap::new();
    for t in &candidates.candidate_triangles {
        for key in [
            EdgeKey::new(t[0], t[1]),
            EdgeKey::new(t[1], t[2]),
            EdgeKey::new(t[2], t[0]),
        ] {
            *usage.entry(key).or_insert(0) += 1;
        }
    }
    usage
        .into_iter()
        .filter(|&(_, count)| count == 1)
        .map(|(key, _)| key)
        .collect()
}

/// Splits boundary edges into connected components.
fn connected_components(edges: &[EdgeKey]) -> Vec<Vec<EdgeKey>> {
    let mut incident: BTreeMap<VertexId, Vec<usize>> = BTreeMap::new();
    for (i, key) in edges.iter().enumerate() {
        incident.entry(key.lo()).or_default().push(i);
        incident.entry(key.hi()).or_default().push(i);
    }

    let mut assigned = vec![false; edges.len()];
    let mut components = Vec::new();

    for start in 0..edges.len() {
        if assigned[start] {
            continue;
        }
        let mut component = Vec::new();
        let mut stack = vec![start];
        assigned[start] = true;
        while let Some(i) = stack.pop() {
            component.push(edges[i]);
            for v in [edges[i].lo(), edges[i].hi()] {
                for &j in &incident[&v] {
                    if !assigned[j] {
                        assigned[j] = true;
                        stack.push(j);
                    }
                }
            }
        }
        component.sort_unstable();
        components.push(component);
    }
    components
}

/// Orders a component's edges into a closed trail visiting each edge once.
///
/// The boundary of a union of triangles has even degree at every vertex,
/// so an Eulerian circuit exists; branching vertices (touching regions,
/// high multiplicity) are handled by the circuit construction. Returns
/// `None` if the component is not closed, which only happens on malformed
/// input.
fn closed_trail(component: &[EdgeKey]) -> Option<Vec<VertexId>> {
    let mut adjacency: HashMap<VertexId, Vec<(VertexId, usize)>> = HashMap::new();
    for (i, key) in component.iter().enumerate() {
        adjacency.entry(key.lo()).or_default().push((key.hi(), i));
        adjacency.entry(key.hi()).or_default().push((key.lo(), i));
    }
    if adjacency.values().any(|n| n.len() % 2 != 0) {
        return None;
    }

    // Hierholzer's algorithm over the undirected multigraph.
    let mut used = vec![false; component.len()];
    let start = component.first()?.lo();
    let mut stack = vec![start];
    let mut trail = Vec::with_capacity(component.len() + 1);

    while let Some(&v) = stack.last() {
        let next = adjacency
            .get_mut(&v)
            .and_then(|n| {
                while let Some(&(to, i)) = n.last() {
                    if used[i] {
                        n.pop();
                    } else {
                        used[i] = true;
                        n.pop();
                        return Some(to);
                    }
                }
                None
            });
        match next {
            Some(to) => stack.push(to),
            None => {
                trail.push(v);
                stack.pop();
            }
        }
    }

    if used.iter().all(|&u| u) && trail.first() == trail.last() {
        Some(trail)
    } else {
        None
    }
}

/// Shoelace signed area of the trail polygon in user coordinates.
fn signed_area<B: TriangulatorBackend>(mesh: &MeshStore<B>, trail: &[VertexId]) -> f64 {
    let mut area = 0.0;
    for pair in trail.windows(2) {
        let p = mesh.user_position(pair[0]);
        let q = mesh.user_position(pair[1]);
        area += p.re * q.im - q.re * p.im;
    }
    area / 2.0
}

/// Quantized winding number along a closed counterclockwise trail.
fn winding_number<B: TriangulatorBackend>(mesh: &MeshStore<B>, trail: &[VertexId]) -> i32 {
    let mut sum: i64 = 0;
    for pair in trail.windows(2) {
        let qa = mesh.quadrant(pair[0]).unwrap_or(Quadrant::Node);
        let qb = mesh.quadrant(pair[1]).unwrap_or(Quadrant::Node);
        sum += quadrant::winding_term(quadrant::phase_jump(qa, qb));
    }
    let quarters: f64 = <f64 as NumCast>::from(sum).unwrap_or(0.0) / 4.0;
    #[allow(clippy::cast_possible_truncation)]
    let winding = quarters.round() as i32;
    winding
}
