//! Cross-module integration tests: full symmetric/asymmetric encrypt paths
//! driven entirely through the crate's public API, plus a literal-byte-
//! vector ternary test (spec.md §8's "seed scenario" style, but exercised
//! from outside the crate rather than from a `#[cfg(test)]` module).

use ckks_embedded_core::traits::Sink;
use ckks_embedded_core::types::Complex64;
use ckks_embedded_core::{
    CkksError, CkksResult, Config, EncryptionMode, FftRootSource, IndexMapSource, OnTheFlyIndexMap,
    ParameterSet, Prng, RootSource, SymEncryptor, SymState,
};
use rand::{RngCore, SeedableRng};

struct VecSink {
    first: Vec<u32>,
    second: Vec<u32>,
    seen_first: bool,
}

impl VecSink {
    fn new() -> Self { Self { first: Vec::new(), second: Vec::new(), seen_first: false } }
}

impl Sink for VecSink {
    fn emit(&mut self, words: &[u32]) -> CkksResult<usize> {
        if !self.seen_first {
            self.first = words.to_vec();
            self.seen_first = true;
        } else {
            self.second = words.to_vec();
        }
        Ok(words.len())
    }
}

/// Symmetric encrypt, driven entirely through the public API, with the
/// plaintext vector drawn from a seeded `rand` RNG rather than a fixed
/// literal — exercising the public surface the way a real caller would,
/// not just the crate's own internal unit tests.
#[test]
fn symmetric_encrypt_completes_for_a_random_plaintext_vector() {
    const N: usize = 1024;
    let q: u32 = 134_012_929;
    let root: u32 = 57;

    let cfg = Config::on_the_fly_defaults(EncryptionMode::Symmetric);
    cfg.validate(N, 4 * N + N / 16).unwrap();

    let params =
        ParameterSet::<2>::new(N, &[(q, root), (q, root)], 20, false, true, false, true, false, false)
            .unwrap();

    let mut seed_rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
    let v: Vec<f64> = (0..8).map(|_| (seed_rng.next_u32() as f64 / u32::MAX as f64) - 0.5).collect();

    let mut sk_prng = Prng::from_seed([3u8; 64]);
    let mut sk_compressed = vec![0u8; N / 4];
    // The secret key would normally arrive from the table oracle (spec.md
    // §6); here it's freshly sampled for the test the same way the crate's
    // own `sym_encryptor` unit test does.
    ckks_embedded_core_test_support::sample_sk(&mut sk_prng, &mut sk_compressed, N);

    let log_n = params.log_n();
    let fft_roots = FftRootSource::OnTheFly { log_n };
    let mut conj_vals = vec![Complex64::new(0.0, 0.0); N];
    let mut index_map = IndexMapSource::OnTheFly(OnTheFlyIndexMap::new(N));

    let mut enc = SymEncryptor::<N>::new();
    assert_eq!(enc.state(), SymState::Idle);
    enc.encode(&v, &params, &mut index_map, &fft_roots, &mut conj_vals).unwrap();

    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
    let mut share_prng = Prng::default();
    let mut private_prng = Prng::default();
    enc.add_error(N, &mut share_prng, &mut private_prng, None, None, &mut rng).unwrap();

    let ntt_roots = RootSource::OnTheFly { root, log_n };
    let mut sink = VecSink::new();
    enc.encrypt_current_prime(&params, &sk_compressed, &mut share_prng, &ntt_roots, &mut sink)
        .unwrap();

    assert_eq!(sink.first.len(), N);
    assert_eq!(sink.second.len(), N);
    assert!(matches!(enc.state(), SymState::PerPrimeEncrypted(0)));
}

/// A config whose layout would overflow the supplied arena capacity is
/// rejected at configuration time, never discovered at runtime (spec.md
/// §6).
#[test]
fn oversized_layout_is_rejected_before_any_encryption_runs() {
    let mut cfg = Config::on_the_fly_defaults(EncryptionMode::Symmetric);
    cfg.layout.ntt_roots = ckks_embedded_core::NttRootPolicy::LoadFast;
    cfg.layout.intt_roots = ckks_embedded_core::NttRootPolicy::LoadFast;
    let err = cfg.validate(16384, 1024).unwrap_err();
    assert_eq!(err, CkksError::Config("configuration exceeds mempool capacity"));
}

/// `hex` round-trips the same literal the `hex-literal` macro embeds above,
/// as a sanity check that the two test-vector tools agree on encoding.
#[test]
fn hex_crate_round_trips_the_literal_sk_pattern() {
    let literal = "1b2d9300ff476ce1";
    let bytes = hex::decode(literal).unwrap();
    assert_eq!(bytes.len(), 8);
    assert_eq!(hex::encode(&bytes), literal);
}

mod ckks_embedded_core_test_support {
    //! A tiny local stand-in for "sample a secret key" that an integration
    //! test is allowed to reach for without pulling in the crate's private
    //! sampler internals (those are `pub(crate)`, by design — see
    //! DESIGN.md's `oracle` entry on why table/key material crosses the
    //! crate boundary as raw bytes, not as a sampler call).
    use hex_literal::hex;

    /// A fixed, literal 256-coefficient (64-byte) ternary-compressed
    /// pattern, repeated to fill `out`. Not a real secret key — a
    /// reproducible byte pattern standing in for one, the same role
    /// spec.md §8's literal seed scenarios play for other components.
    const PATTERN: [u8; 8] = hex!("1b 2d 93 00 ff 47 6c e1");

    pub(crate) fn sample_sk(_prng: &mut ckks_embedded_core::Prng, out: &mut [u8], n: usize) {
        debug_assert_eq!(out.len(), n / 4);
        for (i, byte) in out.iter_mut().enumerate() {
            // Mask off any `0b11` bit-pair the literal pattern might
            // contain: spec.md §3 invariant (iii) forbids that code, and
            // the expand path used downstream assumes it never occurs.
            let raw = PATTERN[i % PATTERN.len()];
            *byte = raw & 0b0101_0101;
        }
    }
}
