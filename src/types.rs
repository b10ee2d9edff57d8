//! Word types and the handful of small value types shared across the core.
//!
//! `Zz` is sized for a 30-bit-prime profile (spec.md §3): a machine unsigned
//! integer wide enough to hold any prime in the chain plus one bit, so `u32`.

/// Unsigned coefficient word. Wide enough for any ≤30-bit prime plus one bit.
pub type Zz = u32;

/// Signed companion of [`Zz`], same width, used for branchless negation tricks.
pub type ZzSigned = i32;

/// A prime modulus in the chain, plus its precomputed Barrett `const_ratio`.
///
/// `const_ratio` is `floor(2**64 / q)`, stored as the two `Zz` words spec.md
/// §3 calls for (`[hi, lo]`) even though a `u64` would do on a 64-bit host —
/// this is the on-device storage shape a 32-bit `Zz` profile actually uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Modulus {
    q: Zz,
    const_ratio: [Zz; 2],
}

impl Modulus {
    /// Builds a modulus from a prime `q`. `q` must be prime, `q <= 2**30`,
    /// and `q ≡ 1 (mod 2n)` for whatever ring degree `n` it will be used
    /// with (checked by the caller at `ParameterSet` construction, since
    /// `n` is not known here).
    #[must_use]
    pub const fn new(q: Zz) -> Self {
        let ratio = floor_2_64_div(q);
        Self { q, const_ratio: [(ratio >> 32) as Zz, ratio as Zz] }
    }

    /// The prime itself.
    #[must_use]
    pub const fn value(&self) -> Zz { self.q }

    /// `floor(2**64 / q)` reassembled from the stored two-word form.
    #[must_use]
    pub(crate) const fn const_ratio(&self) -> u64 {
        ((self.const_ratio[0] as u64) << 32) | (self.const_ratio[1] as u64)
    }
}

/// `floor(2**64 / q)` computed via a 128-bit intermediate (`const fn`-safe,
/// since `u64::MAX as u128 + 1` would overflow `u64` arithmetic).
const fn floor_2_64_div(q: Zz) -> u64 {
    ((1u128 << 64) / (q as u128)) as u64
}

/// A complex double used by the FFT/IFFT stage (spec.md §4.4).
///
/// `no_std` has no `f64::cos`/`f64::sin`; [`libm`] supplies them for the
/// on-the-fly root-generation policy.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Complex64 {
    pub re: f64,
    pub im: f64,
}

impl Complex64 {
    #[must_use]
    pub const fn new(re: f64, im: f64) -> Self { Self { re, im } }

    #[must_use]
    pub fn conj(self) -> Self { Self { re: self.re, im: -self.im } }

    #[must_use]
    pub fn add(self, other: Self) -> Self { Self { re: self.re + other.re, im: self.im + other.im } }

    #[must_use]
    pub fn sub(self, other: Self) -> Self { Self { re: self.re - other.re, im: self.im - other.im } }

    #[must_use]
    pub fn mul(self, other: Self) -> Self {
        Self {
            re: self.re * other.re - self.im * other.im,
            im: self.re * other.im + self.im * other.re,
        }
    }

    /// `e^{i * angle}` via `libm`, used by the on-the-fly root policy.
    #[must_use]
    pub fn from_angle(angle: f64) -> Self { Self { re: libm::cos(angle), im: libm::sin(angle) } }
}

/// The storage code for a single ternary coefficient, as laid out on the
/// wire (spec.md §3): `{-1 -> 0, 0 -> 1, 1 -> 2}` for the 2-bit compressed
/// form, `{0 -> q-1, 1 -> 0, 2 -> 1}` once expanded mod a modulus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ternary {
    NegOne,
    Zero,
    One,
}

impl Ternary {
    /// Decode the 2-bit compressed storage code. `0b11` must never occur
    /// (spec.md §3 invariant (iii)); the caller is expected to have only
    /// ever written codes produced by [`Ternary::pack_code`].
    #[must_use]
    pub(crate) fn from_pack_code(code: u8) -> Self {
        match code & 0b11 {
            0 => Ternary::NegOne,
            1 => Ternary::Zero,
            2 => Ternary::One,
            _ => Ternary::Zero, // unreachable under the invariant; harmless default
        }
    }

    #[must_use]
    pub(crate) const fn pack_code(self) -> u8 {
        match self {
            Ternary::NegOne => 0,
            Ternary::Zero => 1,
            Ternary::One => 2,
        }
    }

    /// Expand against a modulus using the `{0 -> q-1, 1 -> 0, 2 -> 1}` code.
    #[must_use]
    pub(crate) fn expand_mod(self, q: Zz) -> Zz {
        match self {
            Ternary::NegOne => q - 1,
            Ternary::Zero => 0,
            Ternary::One => 1,
        }
    }
}

/// Tracks the representation a secret-key buffer is currently in, so that
/// cross-form operations (e.g. NTT-multiplying a compressed buffer) are a
/// type error rather than silent memory corruption (spec.md §9).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SecretKeyForm {
    /// 2-bit-per-coefficient packed ternary, `n/4` bytes.
    Compressed,
    /// Expanded to one `Zz` per coefficient, reduced mod the current prime,
    /// in coefficient order.
    Expanded,
    /// Expanded and NTT-transformed mod the current prime.
    ExpandedNtt,
}

#[cfg(test)]
mod tests {
    use super::{Modulus, Ternary};

    #[test]
    fn modulus_const_ratio_roundtrip() {
        let m = Modulus::new(1_073_741_827); // a 30-bit prime
        let expected = (1u128 << 64) / u128::from(m.value());
        assert_eq!(u128::from(m.const_ratio()), expected);
    }

    #[test]
    fn ternary_pack_roundtrip() {
        for t in [Ternary::NegOne, Ternary::Zero, Ternary::One] {
            assert_eq!(Ternary::from_pack_code(t.pack_code()), t);
        }
    }

    #[test]
    fn ternary_expand_mod() {
        let q = 17;
        assert_eq!(Ternary::NegOne.expand_mod(q), q - 1);
        assert_eq!(Ternary::Zero.expand_mod(q), 0);
        assert_eq!(Ternary::One.expand_mod(q), 1);
    }
}
