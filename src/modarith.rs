//! Constant-time modular arithmetic over 30-bit primes (spec.md §4.1).
//!
//! Every operation here follows the branch-free formula spec.md spells out
//! directly, the same way the teacher's [`crate::types`]-equivalent (its
//! `Z::add`/`Z::sub`/`Z::mul`) hand-writes its reduction rather than
//! reaching for `subtle` — `subtle` is reserved in this crate for the
//! handful of genuinely data-dependent selects in the encryptors.

use crate::types::{Modulus, Zz};

/// `a + b mod q`. Precondition: `a + b < 2q - 1` (spec.md §4.1).
#[inline(always)]
#[must_use]
pub(crate) fn add_mod(a: Zz, b: Zz, q: Zz) -> Zz {
    debug_assert!(a < q && b < q);
    let sum = a + b;
    let mask = 0u32.wrapping_sub(u32::from(sum >= q));
    sum - (q & mask)
}

/// `-a mod q`, branchless: `(q - a) & -(a != 0)`.
#[inline(always)]
#[must_use]
pub(crate) fn neg_mod(a: Zz, q: Zz) -> Zz {
    debug_assert!(a < q);
    let mask = 0u32.wrapping_sub(u32::from(a != 0));
    (q - a) & mask
}

/// `a - b mod q`, built from [`add_mod`] and [`neg_mod`] per spec.md §4.1.
#[inline(always)]
#[must_use]
pub(crate) fn sub_mod(a: Zz, b: Zz, q: Zz) -> Zz { add_mod(a, neg_mod(b, q), q) }

/// `a * b mod q` via Barrett reduction using the modulus's precomputed
/// `const_ratio = floor(2**64 / q)`.
#[inline(always)]
#[must_use]
pub(crate) fn mul_mod(a: Zz, b: Zz, modulus: &Modulus) -> Zz {
    let q = u64::from(modulus.value());
    let prod = u64::from(a) * u64::from(b);
    let t = ((u128::from(prod) * u128::from(modulus.const_ratio())) >> 64) as u64;
    let mut r = prod.wrapping_sub(t.wrapping_mul(q));
    // Barrett's approximation can undershoot by up to one extra multiple of q;
    // two conditional subtracts cover the worst case without ever looping.
    if r >= q {
        r -= q;
    }
    if r >= q {
        r -= q;
    }
    debug_assert!(r < q);
    r as Zz
}

/// Reduces a 64-bit value given as two `Zz` words `[hi, lo]` (i.e.
/// `(hi << 32) | lo`) modulo `q`, via the same Barrett operand as
/// [`mul_mod`]. Used directly by the double-word reduction paths the
/// encoder and NTT "fast" variant need (spec.md §8 seed scenario 6).
#[must_use]
pub(crate) fn barrett_reduce_wide(input: [Zz; 2], modulus: &Modulus) -> Zz {
    let q = u64::from(modulus.value());
    let value = (u64::from(input[0]) << 32) | u64::from(input[1]);
    let t = ((u128::from(value) * u128::from(modulus.const_ratio())) >> 64) as u64;
    let mut r = value.wrapping_sub(t.wrapping_mul(q));
    for _ in 0..4 {
        if r >= q {
            r -= q;
        }
    }
    debug_assert!(r < q);
    r as Zz
}

/// `base^exp mod q` by square-and-multiply, scanning `exp` from LSB to MSB.
#[must_use]
pub(crate) fn exponentiate_uint_mod(base: Zz, exp: u64, modulus: &Modulus) -> Zz {
    let q = modulus.value();
    let mut result: Zz = 1 % q;
    let mut b = base % q;
    let mut e = exp;
    while e > 0 {
        if e & 1 == 1 {
            result = mul_mod(result, b, modulus);
        }
        b = mul_mod(b, b, modulus);
        e >>= 1;
    }
    result
}

/// `base^(bitrev(idx, log_n)) mod q`, without ever materializing the
/// bit-reversed exponent: scanning `idx`'s bits from LSB to MSB while
/// squaring-then-conditionally-multiplying produces exactly the effect of a
/// standard MSB-to-LSB square-and-multiply over `bitrev(idx, log_n)`. This
/// is the trick NTT root tables lean on to generate `zeta^{bitrev(k)}`
/// without a separate bit-reversal pass (spec.md §4.5/§4.6).
#[must_use]
pub(crate) fn exponentiate_uint_mod_bitrev(
    base: Zz, idx: usize, log_n: u32, modulus: &Modulus,
) -> Zz {
    let q = modulus.value();
    let mut result: Zz = 1 % q;
    for i in 0..log_n {
        result = mul_mod(result, result, modulus);
        if (idx >> i) & 1 == 1 {
            result = mul_mod(result, base, modulus);
        }
    }
    result
}

/// The multiplicative inverse of `x` mod `q` (`q` prime), via
/// `x^(q-2) mod q`. Used to derive the per-`(n, q)` constants (`inv_n`,
/// `last_inv_sn`) at [`crate::params`] construction instead of hand
/// tabulating them (spec.md §9).
#[must_use]
pub(crate) fn mod_inverse(x: Zz, modulus: &Modulus) -> Zz {
    exponentiate_uint_mod(x, u64::from(modulus.value()) - 2, modulus)
}

/// A Montgomery-like lazy multiply operand: `(operand, floor(operand *
/// 2**32 / q))`. Enables [`mul_mod_mumo_lazy`]'s single-multiply lazy
/// Barrett reduction (spec.md §4.1/§4.5 "MUMO").
#[derive(Clone, Copy, Debug)]
pub(crate) struct Mumo {
    pub operand: Zz,
    pub quotient: Zz,
}

impl Mumo {
    #[must_use]
    pub(crate) fn new(operand: Zz, modulus: &Modulus) -> Self {
        let quotient = ((u64::from(operand) << 32) / u64::from(modulus.value())) as Zz;
        Self { operand, quotient }
    }
}

/// `x * y.operand mod q`, lazily: result lands in `[0, 2q)`, not fully
/// reduced. Used by the NTT "fast" Harvey butterfly, which defers full
/// reduction to a single final pass (spec.md §4.5).
#[inline(always)]
#[must_use]
pub(crate) fn mul_mod_mumo_lazy(x: Zz, y: Mumo, modulus: &Modulus) -> Zz {
    let q = u64::from(modulus.value());
    let hi = (u64::from(x) * u64::from(y.quotient)) >> 32;
    let full = u64::from(x) * u64::from(y.operand);
    full.wrapping_sub(hi * q) as Zz
}

/// As [`mul_mod_mumo_lazy`], but finishes with one conditional subtract to
/// land fully in `[0, q)`.
#[inline(always)]
#[must_use]
pub(crate) fn mul_mod_mumo(x: Zz, y: Mumo, modulus: &Modulus) -> Zz {
    let q = modulus.value();
    let mut r = mul_mod_mumo_lazy(x, y, modulus);
    if r >= q {
        r -= q;
    }
    r
}

#[cfg(test)]
mod tests {
    use super::{
        add_mod, barrett_reduce_wide, exponentiate_uint_mod, mod_inverse, mul_mod, mul_mod_mumo,
        neg_mod, sub_mod, Mumo,
    };
    use crate::types::Modulus;

    #[test]
    fn add_sub_neg_identities() {
        let q = 1_073_741_827;
        for x in [0u32, 1, 2, q - 1, q / 2] {
            assert_eq!(neg_mod(neg_mod(x, q), q), x);
            assert_eq!(add_mod(x, neg_mod(x, q), q), 0);
            assert_eq!(sub_mod(x, x, q), 0);
        }
    }

    #[test]
    fn mul_mod_matches_u64_reference() {
        let modulus = Modulus::new(1_072_496_641);
        let q = u64::from(modulus.value());
        for (a, b) in [(0u32, 0u32), (1, 1), (3, 5), (q as u32 - 1, q as u32 - 1), (12345, 67890)] {
            let expected = ((u64::from(a) * u64::from(b)) % q) as u32;
            assert_eq!(mul_mod(a, b, &modulus), expected);
        }
    }

    #[test]
    fn barrett_reduce_wide_seed_scenario_6() {
        let modulus = Modulus::new(2);
        assert_eq!(barrett_reduce_wide([u32::MAX, u32::MAX], &modulus), 1);
        assert_eq!(barrett_reduce_wide([u32::MAX, u32::MAX - 1], &modulus), 0);
    }

    #[test]
    fn exponentiate_matches_repeated_mul() {
        let modulus = Modulus::new(1_072_496_641);
        let base = 12345;
        let mut expected = 1u32 % modulus.value();
        for _ in 0..10 {
            expected = mul_mod(expected, base, &modulus);
        }
        assert_eq!(exponentiate_uint_mod(base, 10, &modulus), expected);
    }

    #[test]
    fn mod_inverse_round_trips() {
        let modulus = Modulus::new(1_072_496_641);
        let x = 9876;
        let inv = mod_inverse(x, &modulus);
        assert_eq!(mul_mod(x, inv, &modulus), 1);
    }

    #[test]
    fn mumo_matches_mul_mod() {
        let modulus = Modulus::new(1_072_496_641);
        let y = 54321;
        let mumo = Mumo::new(y, &modulus);
        for x in [0u32, 1, 999_999, modulus.value() - 1] {
            assert_eq!(mul_mod_mumo(x, mumo, &modulus), mul_mod(x, y, &modulus));
        }
    }
}
