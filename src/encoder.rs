//! CKKS encode (spec.md §4.6): values -> conjugate-symmetric complex
//! vector via the index map -> IFFT -> scale-and-round to `i64` -> reduce
//! mod the current prime.

use crate::error::{ensure, CkksError, CkksResult};
use crate::fft::{bitrev, ifft_inplace, FftRootSource};
use crate::modarith::neg_mod;
use crate::types::{Complex64, Modulus, Zz};
use subtle::{Choice, ConditionallySelectable};

/// Source of the index-map permutation (spec.md §4.6's four
/// "OTF / compute_persistent / load / load_persistent" modes, collapsed to
/// two real code paths: computed sequentially as the encoder's own slot
/// loop runs, or looked up in a materialized table that was either
/// computed once up front or loaded from the table oracle).
pub enum IndexMapSource<'a> {
    OnTheFly(OnTheFlyIndexMap),
    Table(&'a [u16]),
}

impl IndexMapSource<'_> {
    fn positions(&mut self, i: usize, n: usize) -> (usize, usize) {
        match self {
            IndexMapSource::OnTheFly(state) => state.next_pair(),
            IndexMapSource::Table(table) => (table[i] as usize, table[i + n / 2] as usize),
        }
    }
}

/// Sequential on-the-fly index-map generator: `pos = gen^i mod 2n`,
/// `gen = 3`, advanced one step per call rather than recomputed from
/// scratch, since the encoder only ever consumes it in ascending `i`
/// order.
pub struct OnTheFlyIndexMap {
    pos: u64,
    two_n: u64,
    n: usize,
    log_n: u32,
}

impl OnTheFlyIndexMap {
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self { pos: 1, two_n: (2 * n) as u64, n, log_n: n.trailing_zeros() }
    }

    pub fn next_pair(&mut self) -> (usize, usize) {
        let idx1 = ((self.pos - 1) / 2) as usize;
        let idx2 = self.n - 1 - idx1;
        self.pos = (self.pos * 3) % self.two_n;
        (bitrev(idx1, self.log_n), bitrev(idx2, self.log_n))
    }
}

/// Materializes the persisted index-map table (`compute_persistent` mode,
/// or the shape a `load`ed table from the oracle takes once in the
/// arena). `out.len()` must equal `n`.
pub(crate) fn compute_index_map(n: usize, out: &mut [u16]) {
    debug_assert_eq!(out.len(), n);
    let half = n / 2;
    let mut state = OnTheFlyIndexMap::new(n);
    for i in 0..half {
        let (p1, p2) = state.next_pair();
        out[i] = p1 as u16;
        out[i + half] = p2 as u16;
    }
}

/// Step 1 of encode: builds the conjugate-symmetric complex vector from
/// `v` (length `<= n/2`) via the index map. Missing slots (`v.len() <
/// n/2`) are treated as zero.
fn fill_conj_vals(v: &[f64], n: usize, index_map: &mut IndexMapSource<'_>, conj_vals: &mut [Complex64]) {
    debug_assert_eq!(conj_vals.len(), n);
    debug_assert!(v.len() <= n / 2);
    for c in conj_vals.iter_mut() {
        *c = Complex64::new(0.0, 0.0);
    }
    for i in 0..n / 2 {
        let value = v.get(i).copied().unwrap_or(0.0);
        let (p1, p2) = index_map.positions(i, n);
        // Real input: the conjugate at p2 equals the value itself.
        conj_vals[p1] = Complex64::new(value, 0.0);
        conj_vals[p2] = Complex64::new(value, 0.0);
    }
}

/// Encodes `v` into `conj_vals_int` (steps 1-3 of spec.md §4.6): index map,
/// IFFT, scale-and-round. `conj_vals` is caller-owned scratch (the arena
/// slice that later aliases `conj_vals_int` and then `c0`/`c1`).
pub(crate) fn encode_base(
    v: &[f64], n: usize, scale: f64, index_map: &mut IndexMapSource<'_>,
    fft_roots: &FftRootSource<'_>, conj_vals: &mut [Complex64], conj_vals_int: &mut [i64],
) -> CkksResult<()> {
    debug_assert_eq!(conj_vals_int.len(), n);
    ensure!(v.len() <= n / 2, CkksError::Config("encode input longer than n/2 slots"));

    fill_conj_vals(v, n, index_map, conj_vals);
    ifft_inplace(conj_vals, fft_roots);

    for (slot, c) in conj_vals_int.iter_mut().zip(conj_vals.iter()) {
        let scaled = c.re * scale / (n as f64);
        ensure!(scaled.abs() <= i64::MAX as f64, CkksError::EncodeOverflow);
        *slot = scaled.round() as i64;
    }
    Ok(())
}

/// Step 4: reduces `conj_vals_int` into `[0, q)` per prime, constant-time
/// sign selection via [`neg_mod`] and `subtle::conditional_select` (the
/// data-dependent select spec.md §4.6 calls for) rather than a branch.
pub(crate) fn reduce_into_prime(conj_vals_int: &[i64], modulus: &Modulus, out: &mut [Zz]) {
    debug_assert_eq!(conj_vals_int.len(), out.len());
    let q = modulus.value();
    for (slot, &value) in out.iter_mut().zip(conj_vals_int.iter()) {
        let sign = Choice::from(u8::from(value < 0));
        let magnitude = value.unsigned_abs();
        let reduced = crate::modarith::barrett_reduce_wide(
            [(magnitude >> 32) as Zz, magnitude as Zz],
            modulus,
        );
        let negated = neg_mod(reduced, q);
        *slot = Zz::conditional_select(&reduced, &negated, sign);
    }
}
