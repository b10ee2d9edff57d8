//! Symmetric encryptor state machine (spec.md §4.7):
//! `Idle -> Encoded -> ErrorAdded -> PerPrimeEncrypted_0 -> ... -> ChainExhausted`.
//!
//! Scratch buffers are plain const-generic fixed arrays rather than views
//! into a [`crate::mempool::MemPool`] arena: the teacher sizes each of its
//! buffers (`EK_LEN`, `DK_LEN`, `CT_LEN`) independently rather than reusing
//! one arena, and ML-KEM never needed the aliasing trick this core's
//! `conj_vals` stage does — so the encryptor follows the teacher's plain
//! fixed-buffer style here, while [`crate::mempool`] separately proves out
//! the arena-sizing/aliasing property spec.md §5/§8 actually tests.

use crate::encoder::{self, IndexMapSource};
use crate::error::{ensure, CkksError, CkksResult};
use crate::fft::FftRootSource;
use crate::modarith::{add_mod, mul_mod, neg_mod};
use crate::ntt::{ntt_inplace, RootSource};
use crate::params::ParameterSet;
use crate::prng::Prng;
use crate::sampling::{sample_cbd_add, sample_uniform};
use crate::ternary;
use crate::traits::Sink;
use crate::types::{Complex64, SecretKeyForm, Zz};
use rand_core::CryptoRngCore;

/// The state machine's five states (spec.md §4.7). `PerPrimeEncrypted(i)`
/// records which prime index was last encrypted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymState {
    Idle,
    Encoded,
    ErrorAdded,
    PerPrimeEncrypted(usize),
    ChainExhausted,
}

/// `MAX_N` bounds every fixed-size scratch buffer; callers pick it as the
/// largest ring degree their build supports (spec.md §3's `SUPPORTED_DEGREES`).
pub struct SymEncryptor<const MAX_N: usize> {
    state: SymState,
    conj_vals_int: [i64; MAX_N],
    c0: [Zz; MAX_N],
    c1: [Zz; MAX_N],
    sk_ntt: [Zz; MAX_N],
    /// Tracks `sk_ntt`'s current representation (spec.md §9: "secret-key
    /// form is not a type distinction in the source... re-implementations
    /// should carry the form on the buffer's type or a tagged handle"). The
    /// per-prime step below is only allowed to run when this is back at
    /// `Compressed` (the buffer holds nothing live yet), and must leave it
    /// at `ExpandedNtt` once done — `debug_assert`ed at each transition so
    /// an accidental cross-form reuse trips in debug builds rather than
    /// silently multiplying against stale NTT-form data from a prior prime.
    sk_form: SecretKeyForm,
}

impl<const MAX_N: usize> Default for SymEncryptor<MAX_N> {
    fn default() -> Self { Self::new() }
}

impl<const MAX_N: usize> SymEncryptor<MAX_N> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: SymState::Idle,
            conj_vals_int: [0; MAX_N],
            c0: [0; MAX_N],
            c1: [0; MAX_N],
            sk_ntt: [0; MAX_N],
            sk_form: SecretKeyForm::Compressed,
        }
    }

    #[must_use]
    pub fn state(&self) -> SymState { self.state }

    /// The secret-key scratch buffer's current representation (spec.md §9).
    #[must_use]
    pub fn sk_form(&self) -> SecretKeyForm { self.sk_form }

    /// `Idle -> Encoded`.
    pub fn encode<const MP: usize>(
        &mut self, v: &[f64], params: &ParameterSet<MP>, index_map: &mut IndexMapSource<'_>,
        fft_roots: &FftRootSource<'_>, conj_vals_scratch: &mut [Complex64],
    ) -> CkksResult<()> {
        ensure!(self.state == SymState::Idle, CkksError::Config("encode called outside Idle state"));
        let n = params.n();
        encoder::encode_base(
            v, n, params.scale(), index_map, fft_roots, conj_vals_scratch,
            &mut self.conj_vals_int[..n],
        )?;
        self.state = SymState::Encoded;
        Ok(())
    }

    /// `Encoded -> ErrorAdded`: `sym_init` resets both PRNGs and fuses CBD
    /// noise `e` into the encoded message in place, yielding `m + e`.
    pub fn add_error(
        &mut self, n: usize, share_prng: &mut Prng, private_prng: &mut Prng,
        share_seed: Option<[u8; 64]>, private_seed: Option<[u8; 64]>, rng: &mut impl CryptoRngCore,
    ) -> CkksResult<()> {
        ensure!(
            self.state == SymState::Encoded,
            CkksError::Config("add_error called outside Encoded state")
        );
        share_prng.randomize_reset(share_seed, rng)?;
        private_prng.randomize_reset(private_seed, rng)?;
        sample_cbd_add(private_prng, &mut self.conj_vals_int[..n]);
        self.state = SymState::ErrorAdded;
        Ok(())
    }

    /// `ErrorAdded -> PerPrimeEncrypted(0)` or `PerPrimeEncrypted(i) ->
    /// PerPrimeEncrypted(i+1)`: encrypts under the parameter set's current
    /// prime (`c1` uniform from the shareable PRNG, `c0 = -ntt(s)*ntt(c1) +
    /// ntt(m+e)`) and emits `(c0, c1)` to `sink`, c0 first (spec.md
    /// §4.7/§5).
    pub fn encrypt_current_prime<const MP: usize>(
        &mut self, params: &ParameterSet<MP>, sk_compressed: &[u8], share_prng: &mut Prng,
        ntt_roots: &RootSource<'_>, sink: &mut impl Sink,
    ) -> CkksResult<()> {
        let idx = params.curr_modulus_idx();
        let ready = match self.state {
            SymState::ErrorAdded => idx == 0,
            SymState::PerPrimeEncrypted(done) => idx == done + 1,
            _ => false,
        };
        ensure!(ready, CkksError::Config("encrypt_current_prime called out of sequence"));

        let n = params.n();
        let prime = params.curr_prime();
        let modulus = prime.modulus;
        let q = modulus.value();

        sample_uniform(share_prng, &modulus, &mut self.c1[..n]);

        debug_assert_eq!(self.sk_form, SecretKeyForm::Compressed);
        ternary::expand(sk_compressed, &modulus, &mut self.sk_ntt[..n]);
        self.sk_form = SecretKeyForm::Expanded;
        ntt_inplace(&mut self.sk_ntt[..n], &modulus, ntt_roots);
        self.sk_form = SecretKeyForm::ExpandedNtt;

        let mut c1_ntt = [0 as Zz; MAX_N];
        c1_ntt[..n].copy_from_slice(&self.c1[..n]);
        ntt_inplace(&mut c1_ntt[..n], &modulus, ntt_roots);

        for i in 0..n {
            self.c0[i] = neg_mod(mul_mod(self.sk_ntt[i], c1_ntt[i], &modulus), q);
        }

        let mut message = [0 as Zz; MAX_N];
        encoder::reduce_into_prime(&self.conj_vals_int[..n], &modulus, &mut message[..n]);
        ntt_inplace(&mut message[..n], &modulus, ntt_roots);
        for i in 0..n {
            self.c0[i] = add_mod(self.c0[i], message[i], q);
        }

        self.state = SymState::PerPrimeEncrypted(idx);
        sink.emit(&self.c0[..n])?;
        sink.emit(&self.c1[..n])?;
        Ok(())
    }

    /// Advances the cursor. On `ChainExhausted` (the special prime was
    /// reached), the state machine transitions to its terminal state — a
    /// normal completion, not a failure (spec.md §7).
    pub fn advance<const MP: usize>(&mut self, params: &mut ParameterSet<MP>) -> CkksResult<()> {
        match params.next_modulus() {
            Ok(()) => {
                // The NTT-form scratch is specific to the prime just left
                // behind; the next per-prime step must re-derive it from
                // the compressed source rather than reuse stale data.
                self.sk_form = SecretKeyForm::Compressed;
                Ok(())
            }
            Err(CkksError::ChainExhausted) => {
                self.state = SymState::ChainExhausted;
                Err(CkksError::ChainExhausted)
            }
            Err(e) => Err(e),
        }
    }
}
