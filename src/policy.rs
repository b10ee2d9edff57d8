//! Configuration (spec.md §6): the dozen-odd boolean/enum knobs, validated
//! at construction rather than trusted — mirroring the teacher's
//! `validate_keypair_vartime` "reject, don't panic" posture applied here to
//! policy combinations instead of key material.

use crate::error::{ensure, CkksError, CkksResult};
use crate::mempool::{mempool_size, FftRootPolicy, IndexMapPolicy, LayoutPolicy, NttRootPolicy};
use crate::params::SecretKeyPersistence;

/// Symmetric or asymmetric encryption (spec.md §6).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncryptionMode {
    Symmetric,
    Asymmetric,
}

/// The full configuration struct spec.md §6 describes: every policy knob
/// that shapes the arena layout, the root-table strategy, and the secret
/// key's on-device representation.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    pub mode: EncryptionMode,
    pub layout: LayoutPolicy,
    /// `small_s`/`small_u` (spec.md §3): whether the secret key / the
    /// asymmetric ephemeral `u` are kept in their compact ternary form as
    /// long as possible rather than eagerly expanded.
    pub small_s: bool,
    pub small_u: bool,
    /// Whether `s` is freshly sampled on-device (`true`) or loaded from the
    /// table oracle (`false`, the usual case when keys are generated
    /// off-device by the companion tool, spec.md §1).
    pub sample_s: bool,
    /// Whether the public key is loaded from the table oracle. Always
    /// `true` in the asymmetric path (pk generation is off-device, spec.md
    /// §1); meaningless for symmetric encryption.
    pub pk_from_file: bool,
    /// The forward-then-back prime walk optimisation (spec.md §3
    /// `curr_param_direction`) that avoids reloading twiddle tables on the
    /// return pass.
    pub reverse_direction: bool,
}

impl Config {
    /// Validates the configuration against `mempool_capacity` words and
    /// the spec.md §9 "open question" precondition (a persistent secret
    /// key and a persistent index map must not be asked to share the same
    /// arena region — the source silently allowed this and called it a
    /// known restriction; this core rejects it instead). Combinations
    /// needing more memory than `mempool_capacity` offers are rejected here
    /// rather than discovered at runtime (spec.md §6).
    pub fn validate(&self, n: usize, mempool_capacity: usize) -> CkksResult<()> {
        ensure!(
            mempool_size(n, &self.layout) <= mempool_capacity,
            CkksError::Config("configuration exceeds mempool capacity")
        );

        let sk_persists = matches!(
            self.layout.sk_persistence,
            SecretKeyPersistence::AcrossPrimes | SecretKeyPersistence::Persistent
        );
        let index_map_persists = !matches!(self.layout.index_map, IndexMapPolicy::OnTheFly);
        ensure!(
            !(sk_persists && index_map_persists && self.small_s),
            CkksError::Config(
                "persistent secret key and persistent index map cannot share the arena \
                 when the secret key is kept in its small (compressed) form"
            )
        );

        if self.mode == EncryptionMode::Symmetric {
            ensure!(
                !self.small_u,
                CkksError::Config("small_u has no meaning for symmetric encryption")
            );
        }
        if self.mode == EncryptionMode::Asymmetric {
            ensure!(
                self.pk_from_file,
                CkksError::Config("asymmetric encryption requires a public key source")
            );
        }

        Ok(())
    }

    /// A reasonable default for quick construction in tests and examples:
    /// everything on-the-fly, nothing persisted beyond the secret key.
    #[must_use]
    pub fn on_the_fly_defaults(mode: EncryptionMode) -> Self {
        Self {
            mode,
            layout: LayoutPolicy {
                fft_roots: FftRootPolicy::OnTheFly,
                ntt_roots: NttRootPolicy::OnTheFly,
                intt_roots: NttRootPolicy::OnTheFly,
                index_map: IndexMapPolicy::OnTheFly,
                sk_persistence: SecretKeyPersistence::Persistent,
                include_values_buffer: false,
            },
            small_s: true,
            small_u: false,
            sample_s: true,
            pk_from_file: mode == EncryptionMode::Asymmetric,
            reverse_direction: false,
        }
    }
}
