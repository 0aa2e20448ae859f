//! Phase quantization for the discrete argument principle.
//!
//! The phase of f at each mesh vertex is quantized into one of four
//! quadrants of the complex plane. Edges across which the quadrant jumps by
//! two mark a phase reversal and bound regions containing a root or a pole;
//! smaller jumps are smooth phase drift. Winding numbers are recovered by
//! summing quantized jumps along a closed contour and dividing by four,
//! since one full turn of the phase crosses all four quadrants.

use num_complex::Complex64;

/// Quadrant label of a function value.
///
/// `Node` marks a vertex whose value is zero or non-finite; such vertices
/// are treated as already-resolved singular points and never participate in
/// phase-difference arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    /// Value was zero or non-finite
    Node,
    /// Re >= 0 and Im > 0
    First,
    /// Re < 0 and Im >= 0
    Second,
    /// Re <= 0 and Im < 0
    Third,
    /// Re > 0 and Im <= 0
    Fourth,
}

impl Quadrant {
    /// Quantizes a function value into its quadrant.
    ///
    /// Exactly one label applies to every finite nonzero value; the four
    /// half-open sectors tile the punctured plane.
    #[must_use]
    pub fn classify(value: Complex64) -> Self {
        if !value.re.is_finite() || !value.im.is_finite() || (value.re == 0.0 && value.im == 0.0) {
            return Self::Node;
        }

        if value.im > 0.0 {
            if value.re >= 0.0 { Self::First } else { Self::Second }
        } else if value.im < 0.0 {
            if value.re <= 0.0 { Self::Third } else { Self::Fourth }
        } else if value.re < 0.0 {
            // Im == 0 exactly: negative reals close quadrant 2,
            // positive reals close quadrant 4.
            Self::Second
        } else {
            Self::Fourth
        }
    }

    /// The numeric label Q in {0..4} used in diagnostics.
    #[must_use]
    pub const fn label(self) -> u8 {
        match self {
            Self::Node => 0,
            Self::First => 1,
            Self::Second => 2,
            Self::Third => 3,
            Self::Fourth => 4,
        }
    }

    /// Whether this vertex carries a usable phase label.
    #[must_use]
    pub const fn is_phase(self) -> bool {
        !matches!(self, Self::Node)
    }
}

/// Signed quantized phase jump from `a` to `b`, wrapped into `[-2, 2]`.
///
/// Jumps of ±3 alias to ∓1 (the phase moved one quadrant the other way
/// around); ±2 is a phase reversal and genuinely direction-ambiguous.
/// Returns `None` if either endpoint is a [`Quadrant::Node`].
#[must_use]
pub fn phase_jump(a: Quadrant, b: Quadrant) -> Option<i8> {
    if !a.is_phase() || !b.is_phase() {
        return None;
    }

    let mut d = i8::try_from(b.label()).expect("label fits i8")
        - i8::try_from(a.label()).expect("label fits i8");
    if d > 2 {
        d -= 4;
    } else if d < -2 {
        d += 4;
    }
    Some(d)
}

/// Whether a jump marks a candidate (phase-reversal) edge.
#[must_use]
pub fn is_reversal(jump: Option<i8>) -> bool {
    matches!(jump, Some(d) if d.abs() == 2)
}

/// Contribution of a jump to a contour winding sum.
///
/// Reversal jumps are ambiguous (+2 and −2 are the same half-turn) and
/// contribute nothing; on a refined contour they do not occur.
#[must_use]
pub fn winding_term(jump: Option<i8>) -> i64 {
    match jump {
        Some(d) if d.abs() < 2 => i64::from(d),
        _ => 0,
    }
}
