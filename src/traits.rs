//! Small trait seams at the core's two I/O edges (spec.md §6), mirroring
//! the teacher's `traits.rs` (its `KeyGen`/`Encaps`/`Decaps` seams) so
//! callers can depend on trait objects instead of concrete encryptor
//! types.

use crate::error::CkksResult;

/// The ciphertext emission sink (spec.md §6 "Ciphertext emission"): raw
/// polynomial words handed over at their arena offset, in host order. The
/// return value is the number of `Zz` words actually written, mirroring
/// the spec's `emit(bytes, nbytes) -> nbytes_written`.
pub trait Sink {
    fn emit(&mut self, words: &[crate::types::Zz]) -> CkksResult<usize>;
}

/// A blanket `Sink` for any `FnMut` closure, so tests and simple callers
/// don't need to name a type.
impl<F: FnMut(&[crate::types::Zz]) -> CkksResult<usize>> Sink for F {
    fn emit(&mut self, words: &[crate::types::Zz]) -> CkksResult<usize> { self(words) }
}
