use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Scatters `count` points uniformly over a rectangle in the complex plane.
///
/// Used by benchmarks and property tests to build irregular initial meshes.
///
/// # Returns
///
/// A `Vec` of `count` complex points inside `[z_lo.re, z_hi.re] x [z_lo.im, z_hi.im]`.
#[must_use]
pub fn random_rectangle_points(z_lo: Complex64, z_hi: Complex64, count: usize, seed: u64) -> Vec<Complex64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            Complex64::new(
                rng.gen_range(z_lo.re..=z_hi.re),
                rng.gen_range(z_lo.im..=z_hi.im),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_stay_in_rectangle() {
        let lo = Complex64::new(-2.0, -1.0);
        let hi = Complex64::new(3.0, 4.0);
        let points = random_rectangle_points(lo, hi, 200, 7);
        assert_eq!(points.len(), 200);
        for p in points {
            assert!(p.re >= lo.re && p.re <= hi.re);
            assert!(p.im >= lo.im && p.im <= hi.im);
        }
    }

    #[test]
    fn test_seed_determinism() {
        let lo = Complex64::new(0.0, 0.0);
        let hi = Complex64::new(1.0, 1.0);
        let a = random_rectangle_points(lo, hi, 16, 42);
        let b = random_rectangle_points(lo, hi, 16, 42);
        assert_eq!(a, b);
    }
}
