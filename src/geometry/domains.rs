//! Initial mesh generators.
//!
//! Pure geometry helpers producing the seed point sets handed to the
//! solver. Both layouts aim for near-equilateral initial triangles so the
//! first candidate-selection pass sees edges of comparable length; the
//! exact layouts are implementation details, only the returned sequences
//! are contractual.

use num_complex::Complex64;
use std::f64::consts::PI;

/// Row spacing factor for a hex-offset lattice (sqrt(3)/2).
const ROW_FACTOR: f64 = 0.866_025_403_784_438_6;

/// Generates a rectangular initial mesh between two corners.
///
/// Points form a hex-offset lattice: rows are spaced `step * sqrt(3)/2`
/// apart and every other row is shifted by half a step, which triangulates
/// into near-equilateral triangles. The four corners of the rectangle are
/// always included so the bounding box of the output equals the requested
/// rectangle.
#[must_use]
pub fn rectangular_domain(z_lo: Complex64, z_hi: Complex64, step: f64) -> Vec<Complex64> {
    let width = z_hi.re - z_lo.re;
    let height = z_hi.im - z_lo.im;
    if width <= 0.0 || height <= 0.0 || step <= 0.0 {
        return Vec::new();
    }

    let row_spacing = step * ROW_FACTOR;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let rows = (height / row_spacing).ceil().max(1.0) as usize;

    let mut points = Vec::new();
    for j in 0..=rows {
        #[allow(clippy::cast_precision_loss)]
        let y = (z_lo.im + j as f64 * height / rows as f64).min(z_hi.im);
        let offset = if j % 2 == 1 { 0.5 * step } else { 0.0 };
        if offset > 0.0 {
            // Shifted rows still need the left boundary sampled.
            points.push(Complex64::new(z_lo.re, y));
        }
        let mut x = z_lo.re + offset;
        while x < z_hi.re {
            points.push(Complex64::new(x, y));
            x += step;
        }
        points.push(Complex64::new(z_hi.re, y));
    }
    points
}

/// Generates a disk-shaped initial mesh around a center point.
///
/// Points lie on concentric rings spaced `step` apart, each ring carrying
/// enough points to keep its arc spacing close to `step`; ring phases are
/// staggered to avoid radial alignment.
#[must_use]
pub fn disk_domain(center: Complex64, radius: f64, step: f64) -> Vec<Complex64> {
    if radius <= 0.0 || step <= 0.0 {
        return Vec::new();
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let rings = (radius / step).ceil().max(1.0) as usize;

    let mut points = vec![center];
    for k in 1..=rings {
        #[allow(clippy::cast_precision_loss)]
        let r = radius * k as f64 / rings as f64;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let count = ((2.0 * PI * r / step).ceil() as usize).max(6);
        #[allow(clippy::cast_precision_loss)]
        let phase = if k % 2 == 1 { 0.0 } else { PI / count as f64 };
        for i in 0..count {
            #[allow(clippy::cast_precision_loss)]
            let theta = phase + 2.0 * PI * i as f64 / count as f64;
            points.push(center + Complex64::from_polar(r, theta));
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rectangle_spans_requested_corners() {
        let lo = Complex64::new(-2.0, -1.0);
        let hi = Complex64::new(2.0, 1.0);
        let points = rectangular_domain(lo, hi, 0.25);
        assert!(!points.is_empty());

        let re_lo = points.iter().map(|p| p.re).fold(f64::INFINITY, f64::min);
        let re_hi = points.iter().map(|p| p.re).fold(f64::NEG_INFINITY, f64::max);
        let im_lo = points.iter().map(|p| p.im).fold(f64::INFINITY, f64::min);
        let im_hi = points.iter().map(|p| p.im).fold(f64::NEG_INFINITY, f64::max);
        assert_relative_eq!(re_lo, lo.re, epsilon = 1e-12);
        assert_relative_eq!(re_hi, hi.re, epsilon = 1e-12);
        assert_relative_eq!(im_lo, lo.im, epsilon = 1e-12);
        assert_relative_eq!(im_hi, hi.im, epsilon = 1e-12);
    }

    #[test]
    fn rectangle_density_tracks_step() {
        let lo = Complex64::new(0.0, 0.0);
        let hi = Complex64::new(1.0, 1.0);
        let coarse = rectangular_domain(lo, hi, 0.5).len();
        let fine = rectangular_domain(lo, hi, 0.1).len();
        assert!(fine > 4 * coarse, "coarse = {coarse}, fine = {fine}");
    }

    #[test]
    fn rectangle_rejects_degenerate_input() {
        let lo = Complex64::new(0.0, 0.0);
        assert!(rectangular_domain(lo, Complex64::new(0.0, 1.0), 0.1).is_empty());
        assert!(rectangular_domain(lo, Complex64::new(1.0, 1.0), 0.0).is_empty());
        assert!(rectangular_domain(Complex64::new(1.0, 1.0), lo, 0.1).is_empty());
    }

    #[test]
    fn disk_points_stay_inside_radius() {
        let center = Complex64::new(0.5, -0.5);
        let radius = 2.0;
        let points = disk_domain(center, radius, 0.3);
        assert!(points.contains(&center));
        for p in &points {
            assert!((p - center).norm() <= radius + 1e-12);
        }
    }

    #[test]
    fn disk_outer_ring_reaches_radius() {
        let center = Complex64::new(0.0, 0.0);
        let radius = 1.0;
        let points = disk_domain(center, radius, 0.2);
        let max_r = points.iter().map(|p| p.norm()).fold(0.0, f64::max);
        assert_relative_eq!(max_r, radius, max_relative = 1e-12);
    }

    #[test]
    fn disk_rejects_degenerate_input() {
        assert!(disk_domain(Complex64::new(0.0, 0.0), 0.0, 0.1).is_empty());
        assert!(disk_domain(Complex64::new(0.0, 0.0), 1.0, -0.5).is_empty());
    }
}
