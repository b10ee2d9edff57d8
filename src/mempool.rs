//! The single contiguous ZZ-word arena (spec.md §3 `MemPool`/§5 sizing) and
//! the pure `mempool_size` layout function.
//!
//! The source this was distilled from reused one arena as a complex-double
//! buffer, then an int64 buffer, then a ZZ buffer, by casting the same
//! address to different element types (spec.md §9 "buffer aliasing"). That
//! note explicitly suggests the re-implementation path taken here: the
//! arena stays exactly what spec.md's data model calls it — a flat `[Zz]`
//! word array — and the aliased stages (`conj_vals` / `conj_vals_int` /
//! `c0`/`c1`) are modeled as typed read/write helpers that pack an `f64` or
//! `i64` into its constituent `Zz` words, rather than an unsafe pointer
//! cast. No `unsafe` is needed anywhere in this module.

use crate::error::{ensure, CkksError, CkksResult};
use crate::params::SecretKeyPersistence;
use crate::types::{Complex64, Zz};

/// Where FFT/IFFT twiddle roots live for layout purposes (spec.md §4.4).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FftRootPolicy {
    OnTheFly,
    Load,
}

/// Where NTT/INTT twiddle roots live for layout purposes (spec.md §4.5).
/// `OneShot` and `Load` cost the same arena space (a materialized table is
/// a materialized table, whether it was computed once or read from the
/// oracle); `LoadFast` doubles it, since a MUMO entry is two `Zz` words.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NttRootPolicy {
    OnTheFly,
    OneShot,
    Load,
    LoadFast,
}

/// Where the index map π⁻¹ lives for layout purposes (spec.md §4.6/§6).
/// The three materialized variants all cost the same `n/2` words; only
/// `OnTheFly` avoids the table entirely.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexMapPolicy {
    OnTheFly,
    ComputePersistent,
    Load,
    LoadPersistent,
    LoadPersistentSymLoadAsym,
}

/// The handful of layout-relevant knobs from spec.md §6's configuration
/// struct. `policy::Config` (which also carries the non-layout-relevant
/// knobs) embeds one of these.
#[derive(Clone, Copy, Debug)]
pub struct LayoutPolicy {
    pub fft_roots: FftRootPolicy,
    pub ntt_roots: NttRootPolicy,
    pub intt_roots: NttRootPolicy,
    pub index_map: IndexMapPolicy,
    pub sk_persistence: SecretKeyPersistence,
    pub include_values_buffer: bool,
}

/// The deterministic word-offset layout spec.md §5/§8 requires:
/// `mempool_size` must equal the max offset any buffer pointer writes, and
/// the same `(n, policy)` must always produce the same offsets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    /// The staged `conj_vals` / `conj_vals_int` / `c0`,`c1` region: `4n`
    /// words, wide enough for `n` `Complex64`s (4 words each), reused in
    /// place for the narrower `i64` (2 words) and `Zz` (1 word) stages.
    pub conj_region: usize,
    pub values: Option<usize>,
    pub ifft_roots: Option<usize>,
    /// `(offset, word_count)`: word count depends on policy (`n` for a
    /// plain table, `2n` for a MUMO/"fast" table), so it travels with the
    /// offset rather than being re-derived from `n` alone.
    pub ntt_roots: Option<(usize, usize)>,
    pub intt_roots: Option<(usize, usize)>,
    pub index_map: Option<usize>,
    pub secret_key: Option<usize>,
    pub total_words: usize,
}

/// Computes the deterministic offset layout for ring degree `n` under
/// `policy`. Pure: same inputs, same output, no I/O (spec.md §5).
#[must_use]
pub fn compute_layout(n: usize, policy: &LayoutPolicy) -> Layout {
    let mut cursor = 0usize;
    let conj_region = cursor;
    cursor += 4 * n;

    let values = if policy.include_values_buffer {
        let off = cursor;
        cursor += n / 2;
        Some(off)
    } else {
        None
    };

    let ifft_roots = match policy.fft_roots {
        FftRootPolicy::OnTheFly => None,
        FftRootPolicy::Load => {
            let off = cursor;
            cursor += 4 * n;
            Some(off)
        }
    };

    let ntt_roots = ntt_table_words(policy.ntt_roots).map(|words_fn| {
        let off = cursor;
        let words = words_fn(n);
        cursor += words;
        (off, words)
    });
    let intt_roots = ntt_table_words(policy.intt_roots).map(|words_fn| {
        let off = cursor;
        let words = words_fn(n);
        cursor += words;
        (off, words)
    });

    let index_map = match policy.index_map {
        IndexMapPolicy::OnTheFly => None,
        _ => {
            let off = cursor;
            cursor += n / 2;
            Some(off)
        }
    };

    // A persistently-held secret key (in either expanded-once-and-kept or
    // across-primes form) keeps its compressed backing store in the arena;
    // a per-prime policy re-reads it fresh from the oracle into transient
    // scratch that is not counted here, per spec.md §5's "removes n/16 if
    // the secret key is loaded per-prime".
    let secret_key = match policy.sk_persistence {
        SecretKeyPersistence::PerPrime => None,
        SecretKeyPersistence::AcrossPrimes | SecretKeyPersistence::Persistent => {
            let off = cursor;
            cursor += n / 16;
            Some(off)
        }
    };

    Layout {
        conj_region,
        values,
        ifft_roots,
        ntt_roots,
        intt_roots,
        index_map,
        secret_key,
        total_words: cursor,
    }
}

fn ntt_table_words(policy: NttRootPolicy) -> Option<fn(usize) -> usize> {
    match policy {
        NttRootPolicy::OnTheFly => None,
        NttRootPolicy::OneShot | NttRootPolicy::Load => Some(|n| n),
        NttRootPolicy::LoadFast => Some(|n| 2 * n),
    }
}

/// `mempool_size(n, mode, policy)` (spec.md §5): the exact word count the
/// layout consumes. `mode` (sym/asym) does not change the word count this
/// core computes — the two encryptors differ in which buffers are *live*
/// at a given instant, not in the ceiling any single policy needs — but is
/// accepted for call-site symmetry with the spec's signature.
#[must_use]
pub fn mempool_size(n: usize, policy: &LayoutPolicy) -> usize {
    compute_layout(n, policy).total_words
}

/// The flat ZZ-word arena plus its computed layout. All polynomial/complex
/// buffers are non-owning, offset-addressed views into `words`
/// (spec.md §3 "Ownership").
pub struct MemPool<const CAPACITY: usize> {
    words: [Zz; CAPACITY],
    layout: Layout,
}

impl<const CAPACITY: usize> MemPool<CAPACITY> {
    /// Lays out a pool for ring degree `n` under `policy`. Fails if the
    /// arena's compile-time capacity is smaller than `mempool_size` demands
    /// (spec.md §3 invariant (i)).
    pub fn new(n: usize, policy: &LayoutPolicy) -> CkksResult<Self> {
        let layout = compute_layout(n, policy);
        ensure!(layout.total_words <= CAPACITY, CkksError::Config("mempool arena too small"));
        Ok(Self { words: [0; CAPACITY], layout })
    }

    #[must_use]
    pub fn layout(&self) -> &Layout { &self.layout }

    /// The raw conj-region words, for callers (the FFT/encoder/encryptor
    /// stages) that want to drive the staged reinterpretation themselves.
    pub(crate) fn conj_region_mut(&mut self, n: usize) -> &mut [Zz] {
        &mut self.words[self.layout.conj_region..self.layout.conj_region + 4 * n]
    }

    #[must_use]
    pub(crate) fn conj_region(&self, n: usize) -> &[Zz] {
        &self.words[self.layout.conj_region..self.layout.conj_region + 4 * n]
    }

    /// Writes `conj_vals[i]` as a `Complex64` into the conj-region's
    /// 4-words-per-coefficient stage.
    pub(crate) fn write_conj_complex(&mut self, i: usize, value: Complex64) {
        let base = self.layout.conj_region + i * 4;
        let (re_hi, re_lo) = split_f64(value.re);
        let (im_hi, im_lo) = split_f64(value.im);
        self.words[base] = re_hi;
        self.words[base + 1] = re_lo;
        self.words[base + 2] = im_hi;
        self.words[base + 3] = im_lo;
    }

    #[must_use]
    pub(crate) fn read_conj_complex(&self, i: usize) -> Complex64 {
        let base = self.layout.conj_region + i * 4;
        let re = join_f64(self.words[base], self.words[base + 1]);
        let im = join_f64(self.words[base + 2], self.words[base + 3]);
        Complex64::new(re, im)
    }

    /// Writes `conj_vals_int[i]` as an `i64` into the conj-region's
    /// 2-words-per-coefficient stage (the region is wide enough for the
    /// earlier 4-word `Complex64` stage, so the narrower `i64` stage only
    /// ever uses the first half of each slot).
    pub(crate) fn write_conj_int64(&mut self, i: usize, value: i64) {
        let base = self.layout.conj_region + i * 4;
        let bits = value as u64;
        self.words[base] = (bits >> 32) as Zz;
        self.words[base + 1] = bits as Zz;
    }

    #[must_use]
    pub(crate) fn read_conj_int64(&self, i: usize) -> i64 {
        let base = self.layout.conj_region + i * 4;
        let bits = (u64::from(self.words[base]) << 32) | u64::from(self.words[base + 1]);
        bits as i64
    }

    /// Writes `c0`/`c1`'s reduced coefficient `i` (the narrowest, 1-word
    /// stage the conj region is finally reused for).
    pub(crate) fn write_conj_zz(&mut self, i: usize, value: Zz) {
        let base = self.layout.conj_region + i * 4;
        self.words[base] = value;
    }

    #[must_use]
    pub(crate) fn read_conj_zz(&self, i: usize) -> Zz {
        self.words[self.layout.conj_region + i * 4]
    }

    pub(crate) fn ntt_roots_mut(&mut self) -> Option<&mut [Zz]> {
        let (off, len) = self.layout.ntt_roots?;
        Some(&mut self.words[off..off + len])
    }

    pub(crate) fn intt_roots_mut(&mut self) -> Option<&mut [Zz]> {
        let (off, len) = self.layout.intt_roots?;
        Some(&mut self.words[off..off + len])
    }

    pub(crate) fn secret_key_bytes_mut(&mut self, n: usize) -> Option<&mut [Zz]> {
        let off = self.layout.secret_key?;
        Some(&mut self.words[off..off + n / 16])
    }

    pub(crate) fn index_map_mut(&mut self, n: usize) -> Option<&mut [Zz]> {
        let off = self.layout.index_map?;
        Some(&mut self.words[off..off + n / 2])
    }
}

fn split_f64(x: f64) -> (Zz, Zz) {
    let bits = x.to_bits();
    ((bits >> 32) as Zz, bits as Zz)
}

fn join_f64(hi: Zz, lo: Zz) -> f64 {
    f64::from_bits((u64::from(hi) << 32) | u64::from(lo))
}

#[cfg(test)]
mod tests {
    use super::{
        compute_layout, mempool_size, FftRootPolicy, IndexMapPolicy, LayoutPolicy, MemPool,
        NttRootPolicy,
    };
    use crate::params::SecretKeyPersistence;
    use crate::types::Complex64;

    fn all_otf_persistent_compressed_sk() -> LayoutPolicy {
        LayoutPolicy {
            fft_roots: FftRootPolicy::OnTheFly,
            ntt_roots: NttRootPolicy::OnTheFly,
            intt_roots: NttRootPolicy::OnTheFly,
            index_map: IndexMapPolicy::OnTheFly,
            sk_persistence: SecretKeyPersistence::Persistent,
            include_values_buffer: false,
        }
    }

    #[test]
    fn baseline_matches_spec_literal_formula() {
        // spec.md §5: "4n + n/16 ZZ-words" for the sym/OTF-everywhere/
        // persistent-compressed-sk baseline.
        let n = 4096;
        let size = mempool_size(n, &all_otf_persistent_compressed_sk());
        assert_eq!(size, 4 * n + n / 16);
    }

    #[test]
    fn values_buffer_adds_half_n() {
        let n = 4096;
        let mut policy = all_otf_persistent_compressed_sk();
        let without = mempool_size(n, &policy);
        policy.include_values_buffer = true;
        let with = mempool_size(n, &policy);
        assert_eq!(with - without, n / 2);
    }

    #[test]
    fn loaded_ifft_roots_add_4n() {
        let n = 2048;
        let mut policy = all_otf_persistent_compressed_sk();
        let without = mempool_size(n, &policy);
        policy.fft_roots = FftRootPolicy::Load;
        let with = mempool_size(n, &policy);
        assert_eq!(with - without, 4 * n);
    }

    #[test]
    fn materialized_ntt_and_intt_tables_add_n_each() {
        let n = 1024;
        let mut policy = all_otf_persistent_compressed_sk();
        let without = mempool_size(n, &policy);
        policy.ntt_roots = NttRootPolicy::OneShot;
        policy.intt_roots = NttRootPolicy::OneShot;
        let with = mempool_size(n, &policy);
        assert_eq!(with - without, 2 * n);
    }

    #[test]
    fn fast_tables_double_the_materialized_cost() {
        let n = 1024;
        let mut one_shot = all_otf_persistent_compressed_sk();
        one_shot.ntt_roots = NttRootPolicy::OneShot;
        let mut fast = all_otf_persistent_compressed_sk();
        fast.ntt_roots = NttRootPolicy::LoadFast;
        assert_eq!(mempool_size(n, &fast) - mempool_size(n, &one_shot), n);
    }

    #[test]
    fn persisted_index_map_adds_half_n() {
        let n = 4096;
        let mut policy = all_otf_persistent_compressed_sk();
        let without = mempool_size(n, &policy);
        policy.index_map = IndexMapPolicy::ComputePersistent;
        let with = mempool_size(n, &policy);
        assert_eq!(with - without, n / 2);
    }

    #[test]
    fn per_prime_secret_key_removes_n_over_16() {
        let n = 4096;
        let mut policy = all_otf_persistent_compressed_sk();
        let with = mempool_size(n, &policy);
        policy.sk_persistence = SecretKeyPersistence::PerPrime;
        let without = mempool_size(n, &policy);
        assert_eq!(with - without, n / 16);
    }

    #[test]
    fn layout_is_deterministic_given_same_inputs() {
        let n = 8192;
        let policy = all_otf_persistent_compressed_sk();
        assert_eq!(compute_layout(n, &policy), compute_layout(n, &policy));
    }

    #[test]
    fn total_words_equals_max_offset_written() {
        let n = 2048;
        let mut policy = all_otf_persistent_compressed_sk();
        policy.index_map = IndexMapPolicy::ComputePersistent;
        policy.ntt_roots = NttRootPolicy::OneShot;
        let layout = compute_layout(n, &policy);
        let max_end = [
            Some(layout.conj_region + 4 * n),
            layout.values.map(|o| o + n / 2),
            layout.ifft_roots.map(|o| o + 4 * n),
            layout.ntt_roots.map(|(o, len)| o + len),
            layout.intt_roots.map(|(o, len)| o + len),
            layout.index_map.map(|o| o + n / 2),
            layout.secret_key.map(|o| o + n / 16),
        ]
        .into_iter()
        .flatten()
        .max()
        .unwrap();
        assert_eq!(max_end, layout.total_words);
    }

    #[test]
    fn conj_region_round_trips_complex_then_int64_then_zz_stages() {
        let n = 16usize;
        let policy = all_otf_persistent_compressed_sk();
        let size = mempool_size(n, &policy);
        assert!(size <= 256);
        let mut pool = MemPool::<256>::new(n, &policy).unwrap();

        pool.write_conj_complex(3, Complex64::new(1.5, -2.25));
        let got = pool.read_conj_complex(3);
        assert_eq!(got.re, 1.5);
        assert_eq!(got.im, -2.25);

        pool.write_conj_int64(5, -123_456_789_012i64);
        assert_eq!(pool.read_conj_int64(5), -123_456_789_012i64);

        pool.write_conj_zz(7, 999);
        assert_eq!(pool.read_conj_zz(7), 999);
    }
}
