//! Fundamental constants at pair precision.
//!
//! Each constant is stored as an integer part plus 16 base-256 digits of
//! the fraction (128 bits, comfortably past the ~107-bit pair mantissa)
//! and folded into a [`Quad`] on first access. The fold only adds small
//! integers and scales by powers of two, both exact in pair arithmetic,
//! so the cached value is the correctly rounded pair representation of
//! the digit table. Deriving the constants from the native library's
//! double versions would throw away the tail component entirely.

use crate::float::Float;
use crate::guard::PrecisionGuard;
use crate::quad::Quad;

/// π = 3.243F6A8885A308D3... (base 16).
const PI_DIGITS: (u32, [u32; 16]) = (
    3,
    [
        0x24, 0x3f, 0x6a, 0x88, 0x85, 0xa3, 0x08, 0xd3, 0x13, 0x19, 0x8a, 0x2e, 0x03, 0x70, 0x73,
        0x44,
    ],
);

/// e = 2.B7E151628AED2A6A... (base 16).
const E_DIGITS: (u32, [u32; 16]) = (
    2,
    [
        0xb7, 0xe1, 0x51, 0x62, 0x8a, 0xed, 0x2a, 0x6a, 0xbf, 0x71, 0x58, 0x80, 0x9c, 0xf4, 0xf3,
        0xc7,
    ],
);

/// ln 2 = 0.B17217F7D1CF79AB... (base 16).
const LN2_DIGITS: (u32, [u32; 16]) = (
    0,
    [
        0xb1, 0x72, 0x17, 0xf7, 0xd1, 0xcf, 0x79, 0xab, 0xc9, 0xe3, 0xb3, 0x98, 0x03, 0xf2, 0xf6,
        0xaf,
    ],
);

/// √2 = 1.6A09E667F3BCC908... (base 16).
const SQRT2_DIGITS: (u32, [u32; 16]) = (
    1,
    [
        0x6a, 0x09, 0xe6, 0x67, 0xf3, 0xbc, 0xc9, 0x08, 0xb2, 0xfb, 0x13, 0x66, 0xea, 0x95, 0x7d,
        0x3e,
    ],
);

/// Euler–Mascheroni γ = 0.93C467E37DB0C7A4... (base 16).
const EULER_DIGITS: (u32, [u32; 16]) = (
    0,
    [
        0x93, 0xc4, 0x67, 0xe3, 0x7d, 0xb0, 0xc7, 0xa4, 0xd1, 0xbe, 0x3f, 0x81, 0x01, 0x52, 0xcb,
        0x56,
    ],
);

/// The per-width constant cache; one instance lives behind each width's
/// `OnceCell` slot for the process lifetime.
#[derive(Debug)]
pub struct Constants<F: Float> {
    pub(crate) pi: Quad<F>,
    pub(crate) two_pi: Quad<F>,
    pub(crate) half_pi: Quad<F>,
    pub(crate) e: Quad<F>,
    pub(crate) ln2: Quad<F>,
    pub(crate) sqrt2: Quad<F>,
    pub(crate) euler: Quad<F>,
}

/// Folds an integer part and base-256 fraction digits into a pair.
///
/// The fraction is accumulated least-significant digit first as
/// `(acc + d) / 256`; the division is an exact power-of-two scale and
/// the addition a two-sum, so the only rounding is the final pair
/// normalization.
fn fold<F: Float>((int_part, digits): (u32, [u32; 16])) -> Quad<F> {
    let mut acc = Quad::zero();
    for &d in digits.iter().rev() {
        acc = (acc + Quad::from(F::from_u32(d))).ldexp(-8);
    }
    acc + Quad::from(F::from_u32(int_part))
}

impl<F: Float> Constants<F> {
    fn compute() -> Self {
        // Folding must itself round to the component width on x87.
        let _guard = PrecisionGuard::new();
        let pi = fold(PI_DIGITS);
        Constants {
            pi,
            two_pi: pi.ldexp(1),
            half_pi: pi.ldexp(-1),
            e: fold(E_DIGITS),
            ln2: fold(LN2_DIGITS),
            sqrt2: fold(SQRT2_DIGITS),
            euler: fold(EULER_DIGITS),
        }
    }

    pub(crate) fn get() -> &'static Self {
        F::constants().get_or_init(Self::compute)
    }
}

impl<F: Float> Quad<F> {
    /// π at pair precision.
    #[inline]
    pub fn pi() -> Self {
        Constants::get().pi
    }

    /// 2π, derived from π by an exact power-of-two scale.
    #[inline]
    pub fn two_pi() -> Self {
        Constants::get().two_pi
    }

    /// π/2, derived from π by an exact power-of-two scale.
    #[inline]
    pub fn half_pi() -> Self {
        Constants::get().half_pi
    }

    /// Euler's number e at pair precision.
    #[inline]
    pub fn e() -> Self {
        Constants::get().e
    }

    /// ln 2 at pair precision.
    #[inline]
    pub fn ln2() -> Self {
        Constants::get().ln2
    }

    /// √2 at pair precision.
    #[inline]
    pub fn sqrt2() -> Self {
        Constants::get().sqrt2
    }

    /// The Euler–Mascheroni constant γ at pair precision.
    #[inline]
    pub fn euler() -> Self {
        Constants::get().euler
    }
}
