//! Minimal library usage: locate the zeros and the pole of a rational
//! function on a square region.
//!
//! Run with `cargo run --example basic_grpf`.

use global_rootfinding::{GrpfParams, grpf_with_diagnostics, rectangular_domain};
use num_complex::Complex64;

fn main() {
    env_logger::init();

    let i = Complex64::new(0.0, 1.0);
    let f = move |z: Complex64| (z - 1.0) * (z - i) / (z + i);

    let origcoords = rectangular_domain(
        Complex64::new(-2.0, -2.0),
        Complex64::new(2.0, 2.0),
        0.2,
    );
    let params = GrpfParams {
        tolerance: 1e-9,
        ..GrpfParams::default()
    };

    let (output, diagnostics) =
        grpf_with_diagnostics(f, &origcoords, &params).expect("solver failed");

    println!("converged in {} passes over {} vertices", output.iterations, output.vertex_count);
    for root in &output.roots {
        println!("root at {root}");
    }
    for pole in &output.poles {
        println!("pole at {pole}");
    }
    for region in &diagnostics.regions {
        println!(
            "region near {} with winding {}",
            region.location, region.winding
        );
    }
}
