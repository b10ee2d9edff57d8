//! Asymmetric encryptor state machine (spec.md §4.8):
//! `Idle -> Encoded -> ErrorAdded -> PerPrimeEncrypted_0 -> ... -> ChainExhausted`.
//!
//! Shares the [`crate::sym_encryptor::SymEncryptor`] state shape and scratch
//! style (plain const-generic fixed arrays, not arena views — see that
//! module's header note for why). The two encryptors differ in what gets
//! sampled once at `init` (symmetric: just the error `e`; asymmetric: the
//! ephemeral `u`, `e0`, and `e1`) and in the per-prime formula (symmetric:
//! `c0 = -ntt(s)*ntt(c1) + ntt(m+e)`, `c1` uniform; asymmetric: `c0 =
//! ntt(pk0)*ntt(u) + ntt(m+e0)`, `c1 = ntt(pk1)*ntt(u) + ntt(e1)`).

use crate::encoder::{self, IndexMapSource};
use crate::error::{ensure, CkksError, CkksResult};
use crate::fft::FftRootSource;
use crate::modarith::{add_mod, mul_mod};
use crate::ntt::{ntt_inplace, RootSource};
use crate::params::ParameterSet;
use crate::prng::Prng;
use crate::sampling::{sample_cbd, sample_cbd_add};
use crate::ternary;
use crate::traits::Sink;
use crate::types::{Complex64, Zz};
use rand_core::CryptoRngCore;
use subtle::{Choice, ConditionallySelectable};

/// The state machine's states (spec.md §4.8), identical in shape to
/// [`crate::sym_encryptor::SymState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AsymState {
    Idle,
    Encoded,
    ErrorAdded,
    PerPrimeEncrypted(usize),
    ChainExhausted,
}

/// `MAX_N` bounds every fixed-size scratch buffer, as in `SymEncryptor`.
pub struct AsymEncryptor<const MAX_N: usize> {
    state: AsymState,
    conj_vals_int: [i64; MAX_N],
    c0: [Zz; MAX_N],
    c1: [Zz; MAX_N],
    /// Ephemeral `u`, kept compressed (`small_u`) or expanded per prime;
    /// this buffer always holds the expanded-mod-current-prime form, since
    /// every per-prime step needs it in that shape regardless of `small_u`.
    u_expanded: [Zz; MAX_N],
    u_compressed: [u8; MAX_N], // only the first n/4 bytes are meaningful
    e1: [i8; MAX_N],
}

impl<const MAX_N: usize> Default for AsymEncryptor<MAX_N> {
    fn default() -> Self { Self::new() }
}

impl<const MAX_N: usize> AsymEncryptor<MAX_N> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: AsymState::Idle,
            conj_vals_int: [0; MAX_N],
            c0: [0; MAX_N],
            c1: [0; MAX_N],
            u_expanded: [0; MAX_N],
            u_compressed: [0; MAX_N],
            e1: [0; MAX_N],
        }
    }

    #[must_use]
    pub fn state(&self) -> AsymState { self.state }

    /// `Idle -> Encoded`.
    pub fn encode<const MP: usize>(
        &mut self, v: &[f64], params: &ParameterSet<MP>, index_map: &mut IndexMapSource<'_>,
        fft_roots: &FftRootSource<'_>, conj_vals_scratch: &mut [Complex64],
    ) -> CkksResult<()> {
        ensure!(self.state == AsymState::Idle, CkksError::Config("encode called outside Idle state"));
        let n = params.n();
        encoder::encode_base(
            v, n, params.scale(), index_map, fft_roots, conj_vals_scratch,
            &mut self.conj_vals_int[..n],
        )?;
        self.state = AsymState::Encoded;
        Ok(())
    }

    /// `Encoded -> ErrorAdded`: `asym_init` resets the private PRNG, samples
    /// the ephemeral `u` (ternary, compressed if `small_u` per spec.md §6),
    /// fuses CBD noise `e0` into the encoded message, and samples `e1`.
    #[allow(clippy::too_many_arguments)]
    pub fn add_error<const MP: usize>(
        &mut self, params: &ParameterSet<MP>, private_prng: &mut Prng, private_seed: Option<[u8; 64]>,
        rng: &mut impl CryptoRngCore,
    ) -> CkksResult<()> {
        ensure!(
            self.state == AsymState::Encoded,
            CkksError::Config("add_error called outside Encoded state")
        );
        let n = params.n();
        private_prng.randomize_reset(private_seed, rng)?;

        if params.small_u() {
            crate::sampling::sample_ternary_compressed(
                private_prng, &mut self.u_compressed[..n / 4], n,
            );
            ternary::expand(&self.u_compressed[..n / 4], &params.curr_prime().modulus, &mut self.u_expanded[..n]);
        } else {
            crate::sampling::sample_ternary_expanded(
                private_prng, &params.curr_prime().modulus, &mut self.u_expanded[..n],
            );
        }

        sample_cbd_add(private_prng, &mut self.conj_vals_int[..n]);
        sample_cbd(private_prng, &mut self.e1[..n]);

        self.state = AsymState::ErrorAdded;
        Ok(())
    }

    /// `ErrorAdded -> PerPrimeEncrypted(0)` or `PerPrimeEncrypted(i) ->
    /// PerPrimeEncrypted(i+1)`: `c0 = ntt(pk0)*ntt(u) + ntt(m+e0)`,
    /// `c1 = ntt(pk1)*ntt(u) + ntt(e1)`, both already in NTT form as loaded
    /// from the oracle (spec.md §3 "Key material"). Emits `(c0, c1)` to
    /// `sink`, c1 first then c0, the reverse of the symmetric path
    /// (spec.md §5 "within a prime... after in the asymmetric path").
    pub fn encrypt_current_prime<const MP: usize>(
        &mut self, params: &ParameterSet<MP>, pk0_ntt: &[Zz], pk1_ntt: &[Zz], ntt_roots: &RootSource<'_>,
        sink: &mut impl Sink,
    ) -> CkksResult<()> {
        let idx = params.curr_modulus_idx();
        let ready = match self.state {
            AsymState::ErrorAdded => idx == 0,
            AsymState::PerPrimeEncrypted(done) => idx == done + 1,
            _ => false,
        };
        ensure!(ready, CkksError::Config("encrypt_current_prime called out of sequence"));

        let n = params.n();
        let prime = params.curr_prime();
        let modulus = prime.modulus;
        let q = modulus.value();
        debug_assert_eq!(pk0_ntt.len(), n);
        debug_assert_eq!(pk1_ntt.len(), n);

        let mut u_ntt = [0 as Zz; MAX_N];
        u_ntt[..n].copy_from_slice(&self.u_expanded[..n]);
        ntt_inplace(&mut u_ntt[..n], &modulus, ntt_roots);

        for i in 0..n {
            self.c0[i] = mul_mod(pk0_ntt[i], u_ntt[i], &modulus);
            self.c1[i] = mul_mod(pk1_ntt[i], u_ntt[i], &modulus);
        }

        let mut message = [0 as Zz; MAX_N];
        encoder::reduce_into_prime(&self.conj_vals_int[..n], &modulus, &mut message[..n]);
        ntt_inplace(&mut message[..n], &modulus, ntt_roots);
        for i in 0..n {
            self.c0[i] = add_mod(self.c0[i], message[i], q);
        }

        let mut e1_reduced = [0 as Zz; MAX_N];
        for i in 0..n {
            e1_reduced[i] = reduce_i8(self.e1[i], q);
        }
        ntt_inplace(&mut e1_reduced[..n], &modulus, ntt_roots);
        for i in 0..n {
            self.c1[i] = add_mod(self.c1[i], e1_reduced[i], q);
        }

        self.state = AsymState::PerPrimeEncrypted(idx);
        sink.emit(&self.c1[..n])?;
        sink.emit(&self.c0[..n])?;
        Ok(())
    }

    /// Advances the cursor, re-expanding `u` against the new prime when it
    /// is kept compressed (spec.md §4.8 "Advance with `next_modulus`,
    /// re-expanding u against the new prime"), or re-reducing the expanded
    /// form in place otherwise.
    pub fn advance<const MP: usize>(&mut self, params: &mut ParameterSet<MP>) -> CkksResult<()> {
        let n = params.n();
        let old_q = params.curr_prime().modulus.value();
        match params.next_modulus() {
            Ok(()) => {
                let new_modulus = params.curr_prime().modulus;
                if params.small_u() {
                    ternary::expand(&self.u_compressed[..n / 4], &new_modulus, &mut self.u_expanded[..n]);
                } else {
                    ternary::convert_in_place(&mut self.u_expanded[..n], old_q, &new_modulus);
                }
                Ok(())
            }
            Err(CkksError::ChainExhausted) => {
                self.state = AsymState::ChainExhausted;
                Err(CkksError::ChainExhausted)
            }
            Err(e) => Err(e),
        }
    }
}

/// Reduces a CBD sample (range `[-21, 21]`) into `[0, q)`, constant-time
/// sign selection mirroring [`crate::encoder::reduce_into_prime`].
fn reduce_i8(v: i8, q: Zz) -> Zz {
    let magnitude = v.unsigned_abs() as Zz;
    let negated = q.wrapping_sub(magnitude);
    let sign = Choice::from(u8::from(v < 0));
    Zz::conditional_select(&magnitude, &negated, sign)
}
