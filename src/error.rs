//! Error taxonomy (spec.md §7).
//!
//! Mirrors the teacher's posture: fallible entry points return a `Result`
//! rather than panicking, and `debug_assert!` carries the invariants that
//! are only worth checking in debug builds. `ensure!` generalizes the
//! teacher's `helpers::ensure!` (which returned `&'static str`) to this
//! crate's richer enum.

use core::fmt;

/// All error outcomes the core can return. `ChainExhausted` is a normal
/// terminal signal rather than a true failure (spec.md §7) — callers match
/// on it explicitly instead of treating it like the others.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CkksError {
    /// Incompatible policy knobs, unsupported `(n, q)` pair, or a prime not
    /// present in the chain. Fatal at configuration time.
    Config(&'static str),
    /// The OS entropy source was unavailable when seeding a PRNG.
    Entropy,
    /// A coefficient would exceed `i64` after scaling by `Delta`. The
    /// caller may retry encoding with a smaller scale.
    EncodeOverflow,
    /// `next_modulus` was called when the cursor was already at the last
    /// working prime. Not a failure — encryption completed normally.
    ChainExhausted,
    /// The byte-stream table oracle short-read or had no table for the
    /// requested `(kind, n, q)`.
    Oracle(&'static str),
}

impl fmt::Display for CkksError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CkksError::Config(msg) => write!(f, "configuration error: {msg}"),
            CkksError::Entropy => write!(f, "entropy source unavailable"),
            CkksError::EncodeOverflow => write!(f, "encode overflow: scale too large for input"),
            CkksError::ChainExhausted => write!(f, "prime chain exhausted"),
            CkksError::Oracle(msg) => write!(f, "table oracle error: {msg}"),
        }
    }
}

/// Result alias used throughout the crate.
pub type CkksResult<T> = Result<T, CkksError>;

/// If the condition is not met, return the given error. Borrowed in shape
/// from the teacher's `anyhow`-style `ensure!`, generalized to carry a
/// constructed [`CkksError`] instead of a bare string.
macro_rules! ensure {
    ($cond:expr, $err:expr $(,)?) => {
        if !($cond) {
            return Err($err);
        }
    };
}

pub(crate) use ensure;

#[cfg(test)]
mod tests {
    use super::{CkksError, CkksResult};

    fn check(x: u32) -> CkksResult<u32> {
        ensure!(x < 10, CkksError::Config("x too large"));
        Ok(x)
    }

    #[test]
    fn ensure_macro_ok_and_err() {
        assert_eq!(check(3), Ok(3));
        assert_eq!(check(30), Err(CkksError::Config("x too large")));
    }
}
