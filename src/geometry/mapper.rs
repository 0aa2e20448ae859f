//! Coordinate mapper between the user domain and the triangulator plane.
//!
//! The triangulator only accepts points strictly inside its admissible open
//! square. The mapper is an affine bijection from the axis-aligned bounding
//! rectangle of the initial points onto an inset copy of that square. A
//! single scale factor is used on both axes so edge-length ratios (and with
//! them triangle skinniness) are preserved; absolute lengths are not, which
//! is why tolerance comparisons always happen in user coordinates.

use crate::errors::{GrpfError, GrpfResult};
use num_complex::Complex64;

/// Fraction of the admissible interval kept as safety margin on each side.
///
/// Refinement only ever inserts points inside existing triangles, so the
/// margin merely has to absorb round-off from the affine transform.
const MARGIN_FRACTION: f64 = 0.025;

/// Uniform-scale affine bijection `user rectangle -> admissible square`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneMapper {
    user_center: Complex64,
    square_center: f64,
    scale: f64,
}

impl PlaneMapper {
    /// Builds a mapper for the rectangle `[z_lo, z_hi]` targeting the open
    /// admissible interval `box_interval` on each axis.
    ///
    /// # Errors
    /// Returns [`GrpfError::InvalidDomain`] if the rectangle has no area
    /// (all initial points on one horizontal or vertical line) or contains
    /// non-finite corners.
    pub fn from_bounding_box(
        z_lo: Complex64,
        z_hi: Complex64,
        box_interval: (f64, f64),
    ) -> GrpfResult<Self> {
        if !z_lo.re.is_finite() || !z_lo.im.is_finite() || !z_hi.re.is_finite() || !z_hi.im.is_finite()
        {
            return Err(GrpfError::InvalidDomain(
                "bounding rectangle has non-finite corners".to_string(),
            ));
        }

        let width = z_hi.re - z_lo.re;
        let height = z_hi.im - z_lo.im;
        if width <= 0.0 || height <= 0.0 {
            return Err(GrpfError::InvalidDomain(format!(
                "bounding rectangle is degenerate ({width} x {height}); \
                 initial points must span a two-dimensional region"
            )));
        }

        let (lo, hi) = box_interval;
        let side = (hi - lo) * (1.0 - 2.0 * MARGIN_FRACTION);
        let scale = side / width.max(height);

        Ok(Self {
            user_center: Complex64::new(
                z_lo.re.midpoint(z_hi.re),
                z_lo.im.midpoint(z_hi.im),
            ),
            square_center: lo.midpoint(hi),
            scale,
        })
    }

    /// Computes the axis-aligned bounding rectangle of a point set.
    ///
    /// # Errors
    /// Returns [`GrpfError::InvalidDomain`] if the set is empty or contains
    /// non-finite points.
    pub fn bounding_box(points: &[Complex64]) -> GrpfResult<(Complex64, Complex64)> {
        if points.is_empty() {
            return Err(GrpfError::InvalidDomain(
                "origcoords must contain at least one point".to_string(),
            ));
        }

        let mut re_lo = f64::INFINITY;
        let mut re_hi = f64::NEG_INFINITY;
        let mut im_lo = f64::INFINITY;
        let mut im_hi = f64::NEG_INFINITY;
        for z in points {
            if !z.re.is_finite() || !z.im.is_finite() {
                return Err(GrpfError::InvalidDomain(format!(
                    "origcoords contains non-finite point {z}"
                )));
            }
            re_lo = re_lo.min(z.re);
            re_hi = re_hi.max(z.re);
            im_lo = im_lo.min(z.im);
            im_hi = im_hi.max(z.im);
        }

        Ok((Complex64::new(re_lo, im_lo), Complex64::new(re_hi, im_hi)))
    }

    /// Maps a user-domain point into the triangulator plane.
    #[must_use]
    pub fn map(&self, z: Complex64) -> (f64, f64) {
        (
            self.square_center + (z.re - self.user_center.re) * self.scale,
            self.square_center + (z.im - self.user_center.im) * self.scale,
        )
    }

    /// Maps a triangulator-plane point back into the user domain.
    #[must_use]
    pub fn unmap(&self, x: f64, y: f64) -> Complex64 {
        Complex64::new(
            self.user_center.re + (x - self.square_center) / self.scale,
            self.user_center.im + (y - self.square_center) / self.scale,
        )
    }

    /// The constant Jacobian scale of the forward map.
    #[must_use]
    pub const fn scale(&self) -> f64 {
        self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square_mapper() -> PlaneMapper {
        PlaneMapper::from_bounding_box(
            Complex64::new(-2.0, -2.0),
            Complex64::new(2.0, 2.0),
            (1.0, 2.0),
        )
        .expect("mapper for a proper rectangle")
    }

    #[test]
    fn round_trip_is_identity() {
        let mapper = square_mapper();
        for &z in &[
            Complex64::new(-2.0, -2.0),
            Complex64::new(2.0, 2.0),
            Complex64::new(0.1, -1.7),
            Complex64::new(-0.33, 0.0),
        ] {
            let (x, y) = mapper.map(z);
            let back = mapper.unmap(x, y);
            assert_relative_eq!(back.re, z.re, max_relative = 1e-14);
            assert_relative_eq!(back.im, z.im, max_relative = 1e-14);
        }
    }

    #[test]
    fn mapped_points_stay_inside_open_box() {
        let mapper = square_mapper();
        for &z in &[Complex64::new(-2.0, -2.0), Complex64::new(2.0, 2.0)] {
            let (x, y) = mapper.map(z);
            assert!(x > 1.0 && x < 2.0, "x = {x} escaped the box");
            assert!(y > 1.0 && y < 2.0, "y = {y} escaped the box");
        }
    }

    #[test]
    fn aspect_ratio_preserved_for_tall_rectangles() {
        // 1 x 4 rectangle: the single scale factor must be set by the
        // longer axis, so a unit segment maps to the same length on
        // either axis.
        let mapper = PlaneMapper::from_bounding_box(
            Complex64::new(0.0, 0.0),
            Complex64::new(1.0, 4.0),
            (1.0, 2.0),
        )
        .expect("tall rectangle mapper");

        let (x0, _) = mapper.map(Complex64::new(0.0, 0.0));
        let (x1, _) = mapper.map(Complex64::new(1.0, 0.0));
        let (_, y0) = mapper.map(Complex64::new(0.0, 0.0));
        let (_, y1) = mapper.map(Complex64::new(0.0, 1.0));
        assert_relative_eq!(x1 - x0, y1 - y0, max_relative = 1e-14);
    }

    #[test]
    fn degenerate_rectangles_rejected() {
        let flat = PlaneMapper::from_bounding_box(
            Complex64::new(-1.0, 0.0),
            Complex64::new(1.0, 0.0),
            (1.0, 2.0),
        );
        assert!(matches!(flat, Err(GrpfError::InvalidDomain(_))));

        let thin = PlaneMapper::from_bounding_box(
            Complex64::new(0.5, -3.0),
            Complex64::new(0.5, 3.0),
            (1.0, 2.0),
        );
        assert!(matches!(thin, Err(GrpfError::InvalidDomain(_))));
    }

    #[test]
    fn bounding_box_of_points() {
        let points = [
            Complex64::new(1.0, -2.0),
            Complex64::new(-3.0, 0.5),
            Complex64::new(0.0, 4.0),
        ];
        let (lo, hi) = PlaneMapper::bounding_box(&points).expect("bbox");
        assert_relative_eq!(lo.re, -3.0);
        assert_relative_eq!(lo.im, -2.0);
        assert_relative_eq!(hi.re, 1.0);
        assert_relative_eq!(hi.im, 4.0);
    }

    #[test]
    fn bounding_box_rejects_empty_and_non_finite() {
        assert!(PlaneMapper::bounding_box(&[]).is_err());
        assert!(PlaneMapper::bounding_box(&[Complex64::new(f64::NAN, 0.0)]).is_err());
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: unmap(map(z)) == z to round-off for points in the rectangle.
        #[test]
        fn round_trip_property(
            re in -2.0f64..2.0,
            im in -2.0f64..2.0,
        ) {
            let mapper = PlaneMapper::from_bounding_box(
                Complex64::new(-2.0, -2.0),
                Complex64::new(2.0, 2.0),
                (1.0, 2.0),
            ).unwrap();

            let z = Complex64::new(re, im);
            let (x, y) = mapper.map(z);
            let back = mapper.unmap(x, y);
            prop_assert!((back.re - z.re).abs() <= 4.0 * f64::EPSILON * z.re.abs().max(1.0));
            prop_assert!((back.im - z.im).abs() <= 4.0 * f64::EPSILON * z.im.abs().max(1.0));
        }

        /// Property: the forward map is monotone in each axis.
        #[test]
        fn monotone_property(
            a in -10.0f64..10.0,
            b in -10.0f64..10.0,
        ) {
            let mapper = PlaneMapper::from_bounding_box(
                Complex64::new(-10.0, -10.0),
                Complex64::new(10.0, 10.0),
                (1.0, 2.0),
            ).unwrap();

            let (xa, ya) = mapper.map(Complex64::new(a, a));
            let (xb, yb) = mapper.map(Complex64::new(b, b));
            prop_assert_eq!(a < b, xa < xb);
            prop_assert_eq!(a < b, ya < yb);
        }

        /// Property: mapped points always land strictly inside the box.
        #[test]
        fn admissible_property(
            re in -5.0f64..5.0,
            im in -5.0f64..5.0,
        ) {
            let mapper = PlaneMapper::from_bounding_box(
                Complex64::new(-5.0, -5.0),
                Complex64::new(5.0, 5.0),
                (1.0, 2.0),
            ).unwrap();

            let (x, y) = mapper.map(Complex64::new(re, im));
            prop_assert!(x > 1.0 && x < 2.0);
            prop_assert!(y > 1.0 && y < 2.0);
        }
    }
}
