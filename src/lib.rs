#![no_std]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions, clippy::similar_names)]
#![doc = include_str!("../README.md")]

// Implements the encode-encrypt core of a CKKS-style Ring-LWE scheme over a
// chain of <=30-bit NTT-friendly primes, sized for a constrained device.
//
// Functionality map (spec.md section -> module)
//
// S3   Word types, Modulus, Complex64, ternary storage code   --> types.rs
// S4.1 Modular arithmetic, Barrett, MUMO                      --> modarith.rs
// S4.2 SHAKE256 seed+counter PRNG                              --> prng.rs
// S4.3 Uniform / ternary / CBD sampling                        --> sampling.rs
// S4.4 FFT / IFFT                                              --> fft.rs
// S4.5 NTT / INTT, regular + lazy Harvey variant               --> ntt.rs
// S4.6 CKKS encode (index map, IFFT, scale/round, reduce)      --> encoder.rs
// S3   Compressed ternary pack/expand/convert                  --> ternary.rs
// S3/S5 ParameterSet, prime chain, cursor, per-(n,q) constants --> params.rs
// S3/S5 MemPool arena, mempool_size layout function            --> mempool.rs
// S6   Configuration policy knobs, validation                  --> policy.rs
// S6   Table oracle trait + little-endian decode helpers       --> oracle.rs
// S4.7 Symmetric encryptor state machine                       --> sym_encryptor.rs
// S4.8 Asymmetric encryptor state machine                      --> asym_encryptor.rs
//
// The `ensure!` invocations in every module return a typed `CkksError`
// rather than panicking; `debug_assert!` carries invariants that are only
// checked in debug builds, per spec.md S7's error taxonomy.

/// The `rand_core` types are re-exported so callers don't have to pin the
/// exact same `rand_core` version this crate was built against.
pub use rand_core::{CryptoRngCore, Error as RngError};

mod asym_encryptor;
mod encoder;
mod error;
mod fft;
mod mempool;
mod modarith;
mod ntt;
mod oracle;
mod params;
mod policy;
mod prng;
mod sampling;
mod sym_encryptor;
mod ternary;

/// All functionality is covered by traits, so consumers can depend on trait
/// objects if desired (mirroring the teacher's own `traits` module).
pub mod traits;

/// Word types, `Modulus`, `Complex64`, ternary storage codes, and the
/// `SecretKeyForm` tagged handle (spec.md S3/S9).
pub mod types;

pub use asym_encryptor::{AsymEncryptor, AsymState};
pub use encoder::{IndexMapSource, OnTheFlyIndexMap};
pub use error::{CkksError, CkksResult};
pub use fft::FftRootSource;
pub use mempool::{
    compute_layout, mempool_size, FftRootPolicy, IndexMapPolicy, Layout, LayoutPolicy, MemPool,
    NttRootPolicy,
};
pub use ntt::RootSource;
pub use oracle::{TableKind, TableOracle};
pub use params::{ParameterSet, PrimeConsts, SecretKeyPersistence, SUPPORTED_DEGREES};
pub use policy::{Config, EncryptionMode};
pub use prng::{Prng, SEED_LEN};
pub use sym_encryptor::{SymEncryptor, SymState};
