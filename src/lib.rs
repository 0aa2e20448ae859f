#![allow(clippy::multiple_crate_versions)]
#![warn(missing_docs)]

//! Global root and pole finding for complex-valued functions.
//!
//! This library locates all zeros and poles of a function f : ℂ → ℂ inside
//! a bounded planar region, without derivatives or contour integration. The
//! method combines a Delaunay triangulation of sample points with a
//! discrete form of the Cauchy argument principle: function phases are
//! quantized into quadrants, edges with a phase reversal bound regions that
//! must contain a zero or a pole, and those regions are adaptively refined
//! until their winding numbers classify them.
//!
//! # Key Features
//!
//! - Incremental Delaunay meshing behind a replaceable backend trait
//! - Adaptive refinement with sliver suppression
//! - Quantized winding-number classification of candidate regions
//! - Optional data-parallel function evaluation
//!
//! # Example
//!
//! ```rust
//! use global_rootfinding::{GrpfParams, grpf, rectangular_domain};
//! use num_complex::Complex64;
//!
//! let region = rectangular_domain(
//!     Complex64::new(-2.0, -2.0),
//!     Complex64::new(2.0, 2.0),
//!     0.2,
//! );
//! let params = GrpfParams {
//!     tolerance: 1e-6,
//!     ..GrpfParams::default()
//! };
//! let output = grpf(|z| z * z + 1.0, &region, &params).unwrap();
//! assert_eq!(output.roots.len(), 2); // +i and -i
//! ```

use clap::{Parser, ValueEnum};
use num_complex::Complex64;

// Module declarations (avoiding mod.rs files)
/// Error types for the GRPF library.
pub mod errors;

/// Utility functions for random point generation.
pub mod util;

/// Geometry layer: coordinate mapping, mesh storage, and triangulator
/// backends.
///
/// The root-finding engine is isolated from any concrete triangulator by
/// the traits in this module.
pub mod geometry {
    /// Initial mesh generators for rectangles and disks.
    pub mod domains;
    /// Bijection between user coordinates and the triangulator plane.
    pub mod mapper;
    /// The mesh store: triangulator plus per-vertex side tables.
    pub mod mesh;
    /// Core triangulator traits.
    pub mod traits;

    /// Triangulator backend implementations.
    pub mod backends {
        /// Mock backend for testing.
        pub mod mock;

        /// Spade backend - wraps the spade crate.
        pub mod spade;
    }
}

/// The root-and-pole-finding pipeline.
pub mod grpf {
    /// Contour tracing and winding-number classification.
    pub mod contour;
    /// Batch function evaluation, optionally parallel.
    pub mod evaluator;
    /// Plot-data extraction.
    pub mod plot;
    /// Phase quantization into quadrants.
    pub mod quadrant;
    /// The adaptive refinement loop.
    pub mod refinement;
    /// Candidate edge and triangle detection.
    pub mod selector;
    /// Parameters and the `grpf` entry point.
    pub mod solver;
}

// Re-exports for convenience
pub use errors::{GrpfError, GrpfResult};
pub use geometry::domains::{disk_domain, rectangular_domain};
pub use grpf::contour::Region;
pub use grpf::quadrant::Quadrant;
pub use grpf::refinement::Termination;
pub use grpf::solver::{GrpfDiagnostics, GrpfOutput, GrpfParams, grpf, grpf_with_diagnostics};

/// Built-in demonstration functions for the command-line binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DemoFunction {
    /// (z-1)(z-i)²(z+1)³ / (z+i)
    Rational,
    /// z² + 1
    Polynomial,
    /// 1 / ((z-0.5)(z+0.5))
    Reciprocal,
    /// e^z, with no zeros or poles anywhere
    Exponential,
}

impl DemoFunction {
    /// Evaluates the selected demonstration function.
    #[must_use]
    pub fn evaluate(self, z: Complex64) -> Complex64 {
        let i = Complex64::new(0.0, 1.0);
        match self {
            Self::Rational => {
                (z - 1.0) * (z - i).powi(2) * (z + 1.0).powi(3) / (z + i)
            }
            Self::Polynomial => z * z + 1.0,
            Self::Reciprocal => 1.0 / ((z - 0.5) * (z + 0.5)),
            Self::Exponential => z.exp(),
        }
    }
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
/// Configuration options for the `grpf-rs` binary.
pub struct Config {
    /// Demonstration function to analyze
    #[arg(short, long, value_enum)]
    function: DemoFunction,

    /// Lower real bound of the search rectangle
    #[arg(long, default_value = "-2.0", allow_hyphen_values = true)]
    re_min: f64,

    /// Upper real bound of the search rectangle
    #[arg(long, default_value = "2.0", allow_hyphen_values = true)]
    re_max: f64,

    /// Lower imaginary bound of the search rectangle
    #[arg(long, default_value = "-2.0", allow_hyphen_values = true)]
    im_min: f64,

    /// Upper imaginary bound of the search rectangle
    #[arg(long, default_value = "2.0", allow_hyphen_values = true)]
    im_max: f64,

    /// Initial mesh step
    #[arg(short, long, default_value = "0.1")]
    step: f64,

    /// Edge-length stop in user coordinates
    #[arg(long, default_value = "1e-9")]
    tolerance: f64,

    /// Cap on refinement rounds
    #[arg(long, default_value = "100")]
    max_iterations: u32,

    /// Cap on mesh vertices
    #[arg(long, default_value = "500000")]
    max_nodes: usize,

    /// Longest-to-shortest edge ratio marking a triangle as skinny
    #[arg(long, default_value = "3.0")]
    skinny_ratio: f64,

    /// Evaluate the function in parallel
    #[arg(long, default_value = "false")]
    multithreading: bool,
}

impl Config {
    /// Builds a new instance of `Config` from the command line.
    #[must_use]
    pub fn build() -> Self {
        Self::parse()
    }

    /// Creates `GrpfParams` from this configuration.
    #[must_use]
    pub const fn to_params(&self) -> GrpfParams {
        GrpfParams {
            tess_sizehint: 5000,
            tolerance: self.tolerance,
            max_iterations: self.max_iterations,
            max_nodes: self.max_nodes,
            skinny_ratio: self.skinny_ratio,
            multithreading: self.multithreading,
        }
    }
}

/// Runs the solver with the given configuration and logs a summary.
///
/// # Errors
///
/// Returns [`GrpfError::InvalidDomain`] if the configured rectangle is
/// degenerate, or any error produced by [`grpf`] itself.
pub fn run(config: &Config) -> GrpfResult<GrpfOutput> {
    let z_lo = Complex64::new(config.re_min, config.im_min);
    let z_hi = Complex64::new(config.re_max, config.im_max);

    log::info!("Function: {:?}", config.function);
    log::info!("Region: [{z_lo}, {z_hi}], step {}", config.step);

    let origcoords = rectangular_domain(z_lo, z_hi, config.step);
    let params = config.to_params();
    let function = config.function;

    let output = grpf(move |z| function.evaluate(z), &origcoords, &params)?;

    for root in &output.roots {
        log::info!("root at {root}");
    }
    for pole in &output.poles {
        log::info!("pole at {pole}");
    }
    if output.termination != Termination::Converged {
        log::warn!("search stopped early: {:?}", output.termination);
    }

    Ok(output)
}

#[cfg(test)]
mod lib_tests {
    use super::*;
    use approx::assert_relative_eq;

    fn create_test_config() -> Config {
        Config {
            function: DemoFunction::Polynomial,
            re_min: -2.0,
            re_max: 2.0,
            im_min: -2.0,
            im_max: 2.0,
            step: 0.4,
            tolerance: 1e-5,
            max_iterations: 100,
            max_nodes: 100_000,
            skinny_ratio: 3.0,
            multithreading: false,
        }
    }

    #[test]
    fn test_run_polynomial() {
        let config = create_test_config();
        let output = run(&config).expect("Failed to run solver");
        assert_eq!(output.roots.len(), 2);
        assert!(output.poles.is_empty());
        for root in &output.roots {
            assert_relative_eq!(root.re, 0.0, epsilon = 1e-4);
            assert_relative_eq!(root.im.abs(), 1.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_config_conversion() {
        let config = create_test_config();
        let params = config.to_params();
        assert_relative_eq!(params.tolerance, 1e-5);
        assert_eq!(params.max_iterations, 100);
        assert_eq!(params.max_nodes, 100_000);
        assert!(!params.multithreading);
    }

    #[test]
    fn test_demo_function_values() {
        let i = Complex64::new(0.0, 1.0);

        // The rational demo vanishes at 1 and has a pole at -i.
        assert!(DemoFunction::Rational.evaluate(Complex64::new(1.0, 0.0)).norm() < 1e-12);
        assert!(!DemoFunction::Rational.evaluate(-i).is_finite());

        assert!(DemoFunction::Polynomial.evaluate(i).norm() < 1e-12);
        assert!(DemoFunction::Exponential.evaluate(Complex64::new(0.0, 0.0)).norm() > 0.9);
    }
}
