//! Parameters and the `grpf` entry point.
//!
//! `grpf` wires the pipeline together: bounding box -> coordinate mapper ->
//! seeded mesh -> evaluation -> adaptive refinement -> contour tracing ->
//! classification. The solver is a pure function of its inputs; the mesh
//! lives only for the duration of one call.

use crate::errors::{GrpfError, GrpfResult};
use crate::geometry::backends::spade::SpadeBackend;
use crate::geometry::mapper::PlaneMapper;
use crate::geometry::mesh::MeshStore;
use crate::geometry::traits::TriangulatorBackend;
use crate::grpf::contour::{Region, trace_regions};
use crate::grpf::evaluator::evaluate_vertices;
use crate::grpf::plot::PlotData;
use crate::grpf::refinement::{RefinementOutcome, Termination, refine};
use num_complex::Complex64;

/// Solver parameters, immutable for the duration of a `grpf` call.
#[derive(Debug, Clone, PartialEq)]
pub struct GrpfParams {
    /// Initial capacity hint for the triangulator
    pub tess_sizehint: usize,
    /// Edge-length stop in user coordinates
    pub tolerance: f64,
    /// Cap on refinement rounds
    pub max_iterations: u32,
    /// Cap on mesh vertices
    pub max_nodes: usize,
    /// Longest-to-shortest edge ratio above which a triangle is skinny
    pub skinny_ratio: f64,
    /// Evaluate f in parallel; f must be pure and reentrant
    pub multithreading: bool,
}

impl Default for GrpfParams {
    fn default() -> Self {
        Self {
            tess_sizehint: 5000,
            tolerance: 1e-9,
            max_iterations: 100,
            max_nodes: 500_000,
            skinny_ratio: 3.0,
            multithreading: false,
        }
    }
}

impl GrpfParams {
    /// Checks parameter ranges against the documented contract.
    ///
    /// # Errors
    /// Returns [`GrpfError::InvalidParameters`] naming the offending field.
    pub fn validate(&self, initial_vertex_count: usize) -> GrpfResult<()> {
        if self.tess_sizehint < 1 {
            return Err(GrpfError::InvalidParameters(
                "tess_sizehint must be >= 1".to_string(),
            ));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(GrpfError::InvalidParameters(
                "tolerance must be a positive real".to_string(),
            ));
        }
        if self.max_nodes < initial_vertex_count {
            return Err(GrpfError::InvalidParameters(format!(
                "max_nodes ({}) must be >= the initial vertex count ({initial_vertex_count})",
                self.max_nodes
            )));
        }
        if !(self.skinny_ratio.is_finite() && self.skinny_ratio > 1.0) {
            return Err(GrpfError::InvalidParameters(
                "skinny_ratio must be > 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Roots and poles located by a `grpf` call.
#[derive(Debug, Clone)]
pub struct GrpfOutput {
    /// Locations classified as roots, in region discovery order
    pub roots: Vec<Complex64>,
    /// Locations classified as poles, in region discovery order
    pub poles: Vec<Complex64>,
    /// How refinement ended; anything but `Converged` means best-effort
    pub termination: Termination,
    /// Selection passes performed
    pub iterations: u32,
    /// Final mesh vertex count
    pub vertex_count: usize,
}

/// Extended diagnostic data, returned alongside the output on request.
#[derive(Debug, Clone)]
pub struct GrpfDiagnostics {
    /// Quadrant label per vertex
    pub quadrants: Vec<u8>,
    /// Signed phase jump per edge, as vertex index pairs
    pub phase_jumps: Vec<(usize, usize, Option<i8>)>,
    /// All traced regions with their winding numbers, including discarded ones
    pub regions: Vec<Region>,
    /// Mesh snapshot for visualization
    pub plot: PlotData,
    /// The coordinate mapper, for unmapping triangulator-plane data
    pub mapper: PlaneMapper,
}

/// Locates all roots and poles of `f` inside the region spanned by
/// `origcoords`.
///
/// # Errors
/// Returns [`GrpfError::InvalidDomain`] for empty or degenerate initial
/// points, [`GrpfError::InvalidParameters`] for out-of-range parameters,
/// and [`GrpfError::Triangulator`] if the triangulator fails.
pub fn grpf<F>(f: F, origcoords: &[Complex64], params: &GrpfParams) -> GrpfResult<GrpfOutput>
where
    F: Fn(Complex64) -> Complex64 + Sync,
{
    let (output, _, _, _) = solve(&f, origcoords, params)?;
    Ok(output)
}

/// Like [`grpf`], additionally returning per-vertex, per-edge, and mesh
/// diagnostics for plotting.
///
/// # Errors
/// Same conditions as [`grpf`].
pub fn grpf_with_diagnostics<F>(
    f: F,
    origcoords: &[Complex64],
    params: &GrpfParams,
) -> GrpfResult<(GrpfOutput, GrpfDiagnostics)>
where
    F: Fn(Complex64) -> Complex64 + Sync,
{
    let (output, mesh, outcome, regions) = solve(&f, origcoords, params)?;
    let plot = PlotData::from_mesh(&mesh, &outcome.candidates);
    let diagnostics = GrpfDiagnostics {
        quadrants: plot.quadrants.clone(),
        phase_jumps: plot.edges.clone(),
        regions,
        mapper: *mesh.mapper(),
        plot,
    };
    Ok((output, diagnostics))
}

#[allow(clippy::type_complexity)]
fn solve<F>(
    f: &F,
    origcoords: &[Complex64],
    params: &GrpfParams,
) -> GrpfResult<(GrpfOutput, MeshStore<SpadeBackend>, RefinementOutcome, Vec<Region>)>
where
    F: Fn(Complex64) -> Complex64 + Sync,
{
    params.validate(origcoords.len())?;
    let (z_lo, z_hi) = PlaneMapper::bounding_box(origcoords)?;
    if all_collinear(origcoords) {
        return Err(GrpfError::InvalidDomain(
            "origcoords are collinear; the initial mesh must span a two-dimensional region"
                .to_string(),
        ));
    }

    log::info!(
        "grpf: {} initial points on [{}, {}] x [{}, {}], tolerance {:.3e}",
        origcoords.len(),
        z_lo.re,
        z_hi.re,
        z_lo.im,
        z_hi.im,
        params.tolerance
    );

    let backend = SpadeBackend::with_size_hint(params.tess_sizehint);
    let mapper = PlaneMapper::from_bounding_box(z_lo, z_hi, backend.admissible_box())?;
    let mut mesh = MeshStore::new(backend, mapper);

    mesh.insert_points(origcoords)?;
    let pending = mesh.unevaluated();
    evaluate_vertices(&mut mesh, &pending, f, params.multithreading);

    let outcome = refine(&mut mesh, f, params)?;
    let regions = trace_regions(&mesh, &outcome.candidates);

    let mut roots = Vec::new();
    let mut poles = Vec::new();
    for region in &regions {
        if region.is_root() {
            roots.push(region.location);
        } else if region.is_pole() {
            poles.push(region.location);
        } else {
            log::debug!(
                "discarding zero-winding region near {} ({} vertices)",
                region.location,
                region.vertices.len()
            );
        }
    }

    log::info!(
        "grpf finished: {} roots, {} poles, {} vertices, {} passes",
        roots.len(),
        poles.len(),
        mesh.vertex_count(),
        outcome.iterations
    );

    let output = GrpfOutput {
        roots,
        poles,
        termination: outcome.termination,
        iterations: outcome.iterations,
        vertex_count: mesh.vertex_count(),
    };
    Ok((output, mesh, outcome, regions))
}

/// Whether all points lie on one straight line (within round-off).
fn all_collinear(points: &[Complex64]) -> bool {
    if points.len() < 3 {
        return true;
    }
    let p0 = points[0];
    let Some(dir) = points.iter().map(|&p| p - p0).find(|d| d.norm() > 0.0) else {
        return true;
    };
    let span = points
        .iter()
        .map(|&p| (p - p0).norm())
        .fold(0.0, f64::max);
    let eps = 1e-12 * span * span;
    points.iter().all(|&p| {
        let d = p - p0;
        (dir.re * d.im - dir.im * d.re).abs() <= eps
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::domains::rectangular_domain;
    use approx::assert_relative_eq;

    fn unit_square(step: f64) -> Vec<Complex64> {
        rectangular_domain(Complex64::new(-1.0, -1.0), Complex64::new(1.0, 1.0), step)
    }

    #[test]
    fn simple_root_is_located() {
        let params = GrpfParams {
            tolerance: 1e-6,
            ..GrpfParams::default()
        };
        let output = grpf(|z| z - Complex64::new(0.25, -0.25), &unit_square(0.3), &params)
            .expect("solver run");

        assert_eq!(output.termination, Termination::Converged);
        assert_eq!(output.roots.len(), 1);
        assert!(output.poles.is_empty());
        assert_relative_eq!(output.roots[0].re, 0.25, epsilon = 1e-5);
        assert_relative_eq!(output.roots[0].im, -0.25, epsilon = 1e-5);
    }

    #[test]
    fn simple_pole_is_located() {
        let params = GrpfParams {
            tolerance: 1e-6,
            ..GrpfParams::default()
        };
        let output = grpf(
            |z| 1.0 / (z - Complex64::new(-0.3, 0.1)),
            &unit_square(0.3),
            &params,
        )
        .expect("solver run");

        assert!(output.roots.is_empty());
        assert_eq!(output.poles.len(), 1);
        assert_relative_eq!(output.poles[0].re, -0.3, epsilon = 1e-5);
        assert_relative_eq!(output.poles[0].im, 0.1, epsilon = 1e-5);
    }

    #[test]
    fn empty_origcoords_is_invalid_domain() {
        let result = grpf(|z| z, &[], &GrpfParams::default());
        assert!(matches!(result, Err(GrpfError::InvalidDomain(_))));
    }

    #[test]
    fn collinear_origcoords_is_invalid_domain() {
        let points: Vec<Complex64> = (0..10)
            .map(|i| Complex64::new(f64::from(i) * 0.1, f64::from(i) * 0.2))
            .collect();
        let result = grpf(|z| z, &points, &GrpfParams::default());
        assert!(matches!(result, Err(GrpfError::InvalidDomain(_))));
    }

    #[test]
    fn parameter_validation_is_enforced() {
        let points = unit_square(0.5);

        let bad_tolerance = GrpfParams {
            tolerance: 0.0,
            ..GrpfParams::default()
        };
        assert!(matches!(
            grpf(|z| z, &points, &bad_tolerance),
            Err(GrpfError::InvalidParameters(_))
        ));

        let bad_ratio = GrpfParams {
            skinny_ratio: 1.0,
            ..GrpfParams::default()
        };
        assert!(matches!(
            grpf(|z| z, &points, &bad_ratio),
            Err(GrpfError::InvalidParameters(_))
        ));

        let bad_nodes = GrpfParams {
            max_nodes: 1,
            ..GrpfParams::default()
        };
        assert!(matches!(
            grpf(|z| z, &points, &bad_nodes),
            Err(GrpfError::InvalidParameters(_))
        ));

        let bad_hint = GrpfParams {
            tess_sizehint: 0,
            ..GrpfParams::default()
        };
        assert!(matches!(
            grpf(|z| z, &points, &bad_hint),
            Err(GrpfError::InvalidParameters(_))
        ));
    }

    #[test]
    fn diagnostics_cover_the_final_mesh() {
        let params = GrpfParams {
            tolerance: 1e-4,
            ..GrpfParams::default()
        };
        let (output, diagnostics) =
            grpf_with_diagnostics(|z| z, &unit_square(0.4), &params).expect("solver run");

        assert_eq!(diagnostics.quadrants.len(), output.vertex_count);
        assert_eq!(diagnostics.plot.vertices.len(), output.vertex_count);
        assert!(!diagnostics.phase_jumps.is_empty());
        assert_eq!(diagnostics.regions.len(), 1);
        assert_eq!(diagnostics.regions[0].winding, 1);

        // The mapper in the diagnostics unmaps mesh coordinates back to the
        // user plane.
        let z = Complex64::new(0.5, 0.5);
        let (x, y) = diagnostics.mapper.map(z);
        let back = diagnostics.mapper.unmap(x, y);
        assert_relative_eq!(back.re, z.re, max_relative = 1e-12);
        assert_relative_eq!(back.im, z.im, max_relative = 1e-12);
    }

    #[test]
    fn multithreaded_run_matches_serial() {
        let f = |z: Complex64| (z - Complex64::new(0.2, 0.3)) * (z + Complex64::new(0.4, 0.1));
        let serial = GrpfParams {
            tolerance: 1e-5,
            ..GrpfParams::default()
        };
        let parallel = GrpfParams {
            multithreading: true,
            ..serial.clone()
        };

        let a = grpf(f, &unit_square(0.3), &serial).expect("serial run");
        let b = grpf(f, &unit_square(0.3), &parallel).expect("parallel run");

        assert_eq!(a.roots.len(), b.roots.len());
        assert_eq!(a.poles.len(), b.poles.len());
        for (ra, rb) in a.roots.iter().zip(&b.roots) {
            assert_relative_eq!(ra.re, rb.re, epsilon = 1e-9);
            assert_relative_eq!(ra.im, rb.im, epsilon = 1e-9);
        }
    }
}
