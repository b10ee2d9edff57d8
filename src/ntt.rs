//! Negacyclic NTT / INTT (spec.md §4.5): in-place radix-2 Cooley-Tukey
//! forward transform, Gentleman-Sande inverse, both down to the full
//! `len = 1` layer (unlike the teacher's Kyber-style NTT, which stops one
//! layer early and finishes with a quadratic-extension point multiply —
//! this ring has no such shortcut, so every layer runs). The teacher's
//! `ntt.rs` loop shape (`len` halving/doubling, a root index into a
//! bit-reversed root table) is kept; only the butterfly body and root
//! bookkeeping are generalized to an arbitrary `n` and a pluggable root
//! source. The forward transform's root index is a single counter
//! incrementing once per group across the whole transform; the inverse's
//! is `h + i` recomputed fresh each round (`h` the round's group count,
//! `i` the group's position within it) since its groups are visited in the
//! opposite nesting order from the forward pass.

use crate::modarith::{
    add_mod, exponentiate_uint_mod_bitrev, mul_mod, mul_mod_mumo_lazy, sub_mod, Mumo,
};
use crate::types::{Modulus, Zz};

/// Where forward/inverse twiddles come from, spec.md §4.5's "OTF / one-shot
/// / load" policy matrix collapsed to two shapes: computed on demand, or
/// read out of a slice (an in-arena one-shot table and an oracle-loaded
/// table are the same shape once they're a slice of `Zz`).
pub enum RootSource<'a> {
    OnTheFly { root: Zz, log_n: u32 },
    Table(&'a [Zz]),
}

impl RootSource<'_> {
    /// Root at bit-reversed index `k` (`root^{bitrev(k, log_n)} mod q`, or
    /// the equivalent precomputed table entry).
    fn get(&self, k: usize, modulus: &Modulus) -> Zz {
        match *self {
            RootSource::OnTheFly { root, log_n } => {
                exponentiate_uint_mod_bitrev(root, k, log_n, modulus)
            }
            RootSource::Table(table) => table[k],
        }
    }
}

/// As [`RootSource`], but yielding [`Mumo`] lazy-multiply operands for the
/// "fast" Harvey butterfly variant.
pub(crate) enum FastRootSource<'a> {
    OnTheFly { root: Zz, log_n: u32 },
    Table(&'a [Mumo]),
}

impl FastRootSource<'_> {
    fn get(&self, k: usize, modulus: &Modulus) -> Mumo {
        match *self {
            FastRootSource::OnTheFly { root, log_n } => {
                let r = exponentiate_uint_mod_bitrev(root, k, log_n, modulus);
                Mumo::new(r, modulus)
            }
            FastRootSource::Table(table) => table[k],
        }
    }
}

/// Forward negacyclic NTT, fully reduced every round. `buf.len()` must be a
/// power of two; every coefficient must already be in `[0, q)`.
pub(crate) fn ntt_inplace(buf: &mut [Zz], modulus: &Modulus, roots: &RootSource<'_>) {
    let n = buf.len();
    let q = modulus.value();
    let mut k_ctr = 1usize;
    let mut len = n / 2;
    while len >= 1 {
        let mut start = 0;
        while start < n {
            let zeta = roots.get(k_ctr, modulus);
            k_ctr += 1;
            for j in start..start + len {
                let t = mul_mod(buf[j + len], zeta, modulus);
                let u = buf[j];
                buf[j] = add_mod(u, t, q);
                buf[j + len] = sub_mod(u, t, q);
            }
            start += 2 * len;
        }
        len /= 2;
    }
}

/// Forward negacyclic NTT, lazy Harvey variant: inputs must be in `[0,
/// 2q)`. Each round's butterfly can grow a coefficient by up to `2q`, so
/// every round's output is renormalized back to `[0, 2q)` before the next
/// round reads it (the same renormalization [`intt_inplace_fast`] already
/// does between its rounds) — without it, coefficients grow unboundedly
/// round over round and overflow `Zz` well before the transform completes.
/// A final pass reduces fully down to `[0, q)` with two conditional
/// subtracts (spec.md §4.5 "Fast variant").
pub(crate) fn ntt_inplace_fast(buf: &mut [Zz], modulus: &Modulus, roots: &FastRootSource<'_>) {
    let n = buf.len();
    let q = modulus.value();
    debug_assert!(q < (1 << 30), "fast NTT 4q arithmetic needs headroom below 2**32");
    let mut k_ctr = 1usize;
    let mut len = n / 2;
    while len >= 1 {
        let mut start = 0;
        while start < n {
            let zeta = roots.get(k_ctr, modulus);
            k_ctr += 1;
            for j in start..start + len {
                let u = buf[j];
                let v = mul_mod_mumo_lazy(buf[j + len], zeta, modulus);
                buf[j] = u + v;
                buf[j + len] = u + 2 * q - v;
            }
            start += 2 * len;
        }
        len /= 2;
        if len >= 1 {
            for x in buf.iter_mut() {
                if *x >= 2 * q {
                    *x -= 2 * q;
                }
            }
        }
    }
    for x in buf.iter_mut() {
        if *x >= 2 * q {
            *x -= 2 * q;
        }
        if *x >= q {
            *x -= q;
        }
    }
}

/// Inverse negacyclic NTT (Gentleman-Sande), fully reduced every round,
/// with the `1/n` scaling folded into the last round's butterfly
/// multipliers (`inv_n`, `last_inv_sn`) rather than a separate full-array
/// pass (spec.md §4.5/§9).
///
/// Each round's twiddle index is `h + i`, where `h = n / (2 * len)` is that
/// round's group count and `i` is the group's position (0-based, in
/// increasing `start` order) within the round — the mirror image of the
/// forward transform's incrementing `k_ctr`, reset every round rather than
/// a single counter decrementing across the whole transform. A plain
/// decrementing counter visits the table in the wrong order for every round
/// after the first and silently produces a transform that is not the
/// inverse of `ntt_inplace`.
pub(crate) fn intt_inplace(
    buf: &mut [Zz], modulus: &Modulus, inv_roots: &RootSource<'_>, inv_n: Zz, last_inv_sn: Zz,
) {
    let n = buf.len();
    let q = modulus.value();
    let mut len = 1usize;
    while len < n / 2 {
        let h = n / (2 * len);
        let mut start = 0;
        let mut i = 0usize;
        while start < n {
            let zeta = inv_roots.get(h + i, modulus);
            for j in start..start + len {
                let u = buf[j];
                let v = buf[j + len];
                buf[j] = add_mod(u, v, q);
                buf[j + len] = mul_mod(sub_mod(u, v, q), zeta, modulus);
            }
            start += 2 * len;
            i += 1;
        }
        len *= 2;
    }
    // Last round: len == n / 2, exactly one group, table index h + i == 1.
    for j in 0..len {
        let u = buf[j];
        let v = buf[j + len];
        buf[j] = mul_mod(add_mod(u, v, q), inv_n, modulus);
        buf[j + len] = mul_mod(sub_mod(u, v, q), last_inv_sn, modulus);
    }
}

/// As [`intt_inplace`], lazy Harvey variant. Each layer is renormalized to
/// `[0, 2q)` before the next (a deliberate simplification relative to a
/// pure single-final-pass Harvey INTT: easier to get right without a
/// compiler to check the bounds against, at the cost of one conditional
/// subtract per coefficient per layer instead of only at the end).
pub(crate) fn intt_inplace_fast(
    buf: &mut [Zz], modulus: &Modulus, inv_roots: &FastRootSource<'_>, inv_n: Mumo,
    last_inv_sn: Mumo,
) {
    let n = buf.len();
    let q = modulus.value();
    let mut len = 1usize;
    while len < n / 2 {
        let h = n / (2 * len);
        let mut start = 0;
        let mut i = 0usize;
        while start < n {
            let zeta = inv_roots.get(h + i, modulus);
            for j in start..start + len {
                let u = buf[j];
                let v = buf[j + len];
                buf[j] = u + v;
                buf[j + len] = mul_mod_mumo_lazy(u + 2 * q - v, zeta, modulus);
            }
            start += 2 * len;
            i += 1;
        }
        len *= 2;
        for x in buf.iter_mut() {
            if *x >= 2 * q {
                *x -= 2 * q;
            }
        }
    }
    for j in 0..len {
        let u = buf[j];
        let v = buf[j + len];
        buf[j] = mul_mod_mumo_lazy(u + v, inv_n, modulus);
        buf[j + len] = mul_mod_mumo_lazy(u + 2 * q - v, last_inv_sn, modulus);
    }
    for x in buf.iter_mut() {
        if *x >= 2 * q {
            *x -= 2 * q;
        }
        if *x >= q {
            *x -= q;
        }
    }
}
