//! `ParameterSet` (spec.md §3/§2.7): ring degree, prime chain, cursor,
//! scale, and the per-prime NTT constants derived at construction rather
//! than hand-tabulated (spec.md §9).

use crate::error::{ensure, CkksError, CkksResult};
use crate::modarith::{exponentiate_uint_mod_bitrev, mod_inverse, mul_mod};
use crate::types::{Modulus, Zz};

/// Ring degrees this core supports (spec.md §3).
pub const SUPPORTED_DEGREES: [usize; 5] = [1024, 2048, 4096, 8192, 16384];

/// Per-prime constants cached once at construction: the caller-supplied
/// primitive `2n`-th root, its modular inverse, `n^{-1} mod q`, and the
/// folded last-INTT-round constant `inv_n * inv_root^{bitrev(1, log_n)}`
/// (spec.md §9's "compute at setup" option — the alternative, hand
/// tabulating them per `(n, q)`, is what the original device firmware did
/// and is exactly what this crate avoids).
#[derive(Clone, Copy, Debug)]
pub struct PrimeConsts {
    pub modulus: Modulus,
    pub root: Zz,
    pub inv_root: Zz,
    pub inv_n: Zz,
    pub last_inv_sn: Zz,
}

impl PrimeConsts {
    fn derive(modulus: Modulus, root: Zz, log_n: u32) -> Self {
        let n = 1u64 << log_n;
        let inv_root = mod_inverse(root, &modulus);
        let inv_n = mod_inverse((n % u64::from(modulus.value())) as Zz, &modulus);
        let s1 = exponentiate_uint_mod_bitrev(inv_root, 1, log_n, &modulus);
        let last_inv_sn = mul_mod(inv_n, s1, &modulus);
        Self { modulus, root, inv_root, inv_n, last_inv_sn }
    }
}

/// Where the secret key is kept across the per-prime loop (spec.md §6).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SecretKeyPersistence {
    /// Re-expanded from the compressed form on every prime.
    PerPrime,
    /// Re-expanded whenever the cursor moves, but cached within a prime.
    AcrossPrimes,
    /// Expanded once and kept in NTT form for the whole chain.
    Persistent,
}

/// Degree `n`, the prime chain, the current-prime cursor, the CKKS scale,
/// and the handful of mode flags spec.md §3 groups under `ParameterSet`.
pub struct ParameterSet<const MAX_PRIMES: usize> {
    n: usize,
    log_n: u32,
    primes: [PrimeConsts; MAX_PRIMES],
    nprimes: usize,
    curr_modulus_idx: usize,
    scale_bits: u32,
    is_asymmetric: bool,
    small_s: bool,
    small_u: bool,
    sample_s: bool,
    pk_from_file: bool,
    reverse_direction: bool,
}

impl<const MAX_PRIMES: usize> ParameterSet<MAX_PRIMES> {
    /// Builds a `ParameterSet`. `prime_roots` is the ordered chain
    /// `(q_i, root_i)`, the last entry being the "special" prime consumed
    /// off-device by key generation (spec.md §3). `scale_bits` is `k` in
    /// `Delta = 2^k`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        n: usize, prime_roots: &[(Zz, Zz)], scale_bits: u32, is_asymmetric: bool, small_s: bool,
        small_u: bool, sample_s: bool, pk_from_file: bool, reverse_direction: bool,
    ) -> CkksResult<Self> {
        ensure!(SUPPORTED_DEGREES.contains(&n), CkksError::Config("unsupported ring degree n"));
        ensure!(!prime_roots.is_empty(), CkksError::Config("prime chain must have at least one prime"));
        ensure!(
            prime_roots.len() <= MAX_PRIMES,
            CkksError::Config("prime chain exceeds MAX_PRIMES capacity")
        );
        let log_n = n.trailing_zeros();
        for &(q, _) in prime_roots {
            ensure!(q >= 2, CkksError::Config("modulus must be >= 2"));
            ensure!(
                u64::from(q) % (2 * n as u64) == 1,
                CkksError::Config("modulus must be congruent to 1 mod 2n")
            );
        }

        let mut primes = core::array::from_fn(|_| PrimeConsts::derive(Modulus::new(2), 1, 1));
        for (i, &(q, root)) in prime_roots.iter().enumerate() {
            primes[i] = PrimeConsts::derive(Modulus::new(q), root, log_n);
        }

        Ok(Self {
            n,
            log_n,
            primes,
            nprimes: prime_roots.len(),
            curr_modulus_idx: 0,
            scale_bits,
            is_asymmetric,
            small_s,
            small_u,
            sample_s,
            pk_from_file,
            reverse_direction,
        })
    }

    #[must_use]
    pub fn n(&self) -> usize { self.n }

    #[must_use]
    pub fn log_n(&self) -> u32 { self.log_n }

    #[must_use]
    pub fn nprimes(&self) -> usize { self.nprimes }

    /// Primes actually used for encryption; the chain's last entry is the
    /// special prime reserved for off-device key generation (spec.md §3).
    #[must_use]
    pub fn working_primes(&self) -> usize { self.nprimes - 1 }

    #[must_use]
    pub fn scale(&self) -> f64 { (1u64 << self.scale_bits) as f64 }

    #[must_use]
    pub fn curr_modulus_idx(&self) -> usize { self.curr_modulus_idx }

    #[must_use]
    pub fn curr_prime(&self) -> &PrimeConsts { &self.primes[self.curr_modulus_idx] }

    #[must_use]
    pub fn is_asymmetric(&self) -> bool { self.is_asymmetric }

    #[must_use]
    pub fn small_s(&self) -> bool { self.small_s }

    #[must_use]
    pub fn small_u(&self) -> bool { self.small_u }

    #[must_use]
    pub fn sample_s(&self) -> bool { self.sample_s }

    #[must_use]
    pub fn pk_from_file(&self) -> bool { self.pk_from_file }

    #[must_use]
    pub fn reverse_direction(&self) -> bool { self.reverse_direction }

    /// Advances the cursor to the next working prime. Returns
    /// `Err(CkksError::ChainExhausted)` — a normal terminal signal, not a
    /// failure (spec.md §7) — once the cursor is already at the last
    /// working prime.
    pub fn next_modulus(&mut self) -> CkksResult<()> {
        ensure!(self.curr_modulus_idx + 1 < self.working_primes(), CkksError::ChainExhausted);
        self.curr_modulus_idx += 1;
        Ok(())
    }

    /// Resets the cursor to the first working prime (spec.md §3 lifecycle).
    pub fn reset_primes(&mut self) { self.curr_modulus_idx = 0; }
}
