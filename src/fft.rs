//! In-place radix-2 FFT / IFFT over [`Complex64`] (spec.md §4.4), used by
//! the encoder's power-of-two cyclotomic embedding. Structurally the
//! complex-field sibling of [`crate::ntt`]: forward is the same
//! Cooley-Tukey butterfly shape as `ntt_inplace`, inverse is the same
//! Gentleman-Sande shape as `intt_inplace` — except a root of unity's
//! inverse is just its complex conjugate, so (unlike the NTT) there is no
//! separate `inv_root` to derive, and the `1/n` scale is deliberately left
//! un-folded (spec.md §4.4: it is merged downstream with the CKKS scale
//! `Delta` instead).

use crate::types::Complex64;

/// Where FFT/IFFT twiddle roots come from (spec.md §4.4's "on-the-fly /
/// one-shot / load" policy, collapsed the same way [`crate::ntt::RootSource`]
/// collapses its three strategies).
pub enum FftRootSource<'a> {
    /// `root_index -> exp(2*pi*i * bitrev(root_index, log_n) / (2n))`.
    OnTheFly { log_n: u32 },
    Table(&'a [Complex64]),
}

impl FftRootSource<'_> {
    fn get(&self, k: usize, log_n: u32) -> Complex64 {
        match *self {
            FftRootSource::OnTheFly { log_n: ln } => {
                debug_assert_eq!(ln, log_n);
                let n = 1usize << log_n;
                let angle = core::f64::consts::TAU * (bitrev(k, log_n) as f64) / (2.0 * n as f64);
                Complex64::from_angle(angle)
            }
            FftRootSource::Table(table) => table[k],
        }
    }
}

/// Reverses the lowest `bits` bits of `x`. Also used by the encoder's
/// index-map construction (spec.md §4.6), which bit-reverses plain
/// integer indices rather than exponents.
pub(crate) fn bitrev(x: usize, bits: u32) -> usize {
    let mut result = 0usize;
    let mut x = x;
    for _ in 0..bits {
        result = (result << 1) | (x & 1);
        x >>= 1;
    }
    result
}

fn log2_exact(n: usize) -> u32 {
    debug_assert!(n.is_power_of_two());
    n.trailing_zeros()
}

/// Forward transform, Cooley-Tukey, no scaling applied.
pub(crate) fn fft_inplace(buf: &mut [Complex64], roots: &FftRootSource<'_>) {
    let n = buf.len();
    let log_n = log2_exact(n);
    let mut k_ctr = 1usize;
    let mut len = n / 2;
    while len >= 1 {
        let mut start = 0;
        while start < n {
            let zeta = roots.get(k_ctr, log_n);
            k_ctr += 1;
            for j in start..start + len {
                let t = zeta.mul(buf[j + len]);
                let u = buf[j];
                buf[j] = u.add(t);
                buf[j + len] = u.sub(t);
            }
            start += 2 * len;
        }
        len /= 2;
    }
}

/// Inverse transform, Gentleman-Sande, conjugated roots, `1/n` left
/// un-applied (spec.md §4.4: the caller folds it into the CKKS scale).
///
/// As in [`crate::ntt::intt_inplace`], the twiddle index is `h + i` —
/// recomputed every round from that round's group count `h = n / (2 *
/// len)` and the group's position `i` within it — not a single counter
/// decrementing across the whole transform; the latter visits the
/// bit-reversed root table in the wrong order for every round after the
/// first and fails to invert `fft_inplace`.
pub(crate) fn ifft_inplace(buf: &mut [Complex64], roots: &FftRootSource<'_>) {
    let n = buf.len();
    let log_n = log2_exact(n);
    let mut len = 1usize;
    while len <= n / 2 {
        let h = n / (2 * len);
        let mut start = 0;
        let mut i = 0usize;
        while start < n {
            let zeta = roots.get(h + i, log_n).conj();
            for j in start..start + len {
                let u = buf[j];
                let v = buf[j + len];
                buf[j] = u.add(v);
                buf[j + len] = zeta.mul(u.sub(v));
            }
            start += 2 * len;
            i += 1;
        }
        len *= 2;
    }
}
