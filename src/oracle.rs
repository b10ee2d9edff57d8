//! The table oracle (spec.md §6): a byte-stream reader keyed by `(kind, n,
//! q)` standing in for whichever of the three delivery modes — runtime
//! file, compile-time embedded copy, compile-time embedded direct
//! reference — a given device build chooses. The core only ever sees the
//! [`TableOracle`] trait; reading an actual file is explicitly out of
//! scope (spec.md §1) and left to the host.

use crate::error::{CkksError, CkksResult};
use crate::modarith::Mumo;
use crate::types::{Complex64, Modulus, Zz};

/// Which precomputed table is being requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableKind {
    /// `sk(n)`: `n/4` bytes, compressed ternary.
    SecretKey,
    /// `pk_i(n, q)`, `i` in `{0, 1}`: `n` ZZ-words, NTT form.
    PublicKey(u8),
    NttRoots,
    NttFastRoots,
    InttRoots,
    InttFastRoots,
    /// `n` complex doubles in bit-reversed order.
    IfftRoots,
    /// `n` uint16 values.
    IndexMap,
}

/// A byte-stream reader for a given `(kind, n, q)` table. `q` is
/// meaningless for `n`-only tables (`IfftRoots`, `IndexMap`) — callers
/// pass `None` there. All wire values are little-endian (spec.md §6).
/// Each call advances the reader's own internal cursor for that table, so
/// a caller may read a table in several chunks.
pub trait TableOracle {
    fn read(&mut self, kind: TableKind, n: usize, q: Option<Zz>, out: &mut [u8]) -> CkksResult<()>;
}

const CHUNK_BYTES: usize = 128;

/// Reads an `n`-length ZZ-word table (`pk_i`, `ntt_roots`, `intt_roots`).
pub(crate) fn read_zz_table(
    oracle: &mut dyn TableOracle, kind: TableKind, n: usize, q: Option<Zz>, out: &mut [Zz],
) -> CkksResult<()> {
    let mut scratch = [0u8; CHUNK_BYTES];
    let mut produced = 0usize;
    while produced < out.len() {
        let words = (out.len() - produced).min(CHUNK_BYTES / 4);
        let bytes = words * 4;
        oracle.read(kind, n, q, &mut scratch[..bytes])?;
        for w in 0..words {
            let b = &scratch[w * 4..w * 4 + 4];
            out[produced + w] = u32::from_le_bytes([b[0], b[1], b[2], b[3]]);
        }
        produced += words;
    }
    Ok(())
}

/// Reads an `n`-length "fast" root table as bare ZZ operands, deriving
/// each entry's MUMO quotient locally via [`Mumo::new`] rather than
/// carrying the quotient on the wire too.
pub(crate) fn read_mumo_table(
    oracle: &mut dyn TableOracle, kind: TableKind, n: usize, q: Zz, modulus: &Modulus,
    out: &mut [Mumo],
) -> CkksResult<()> {
    let mut operands = [0u32; CHUNK_BYTES / 4];
    let mut produced = 0usize;
    while produced < out.len() {
        let words = (out.len() - produced).min(operands.len());
        read_zz_table(oracle, kind, n, Some(q), &mut operands[..words])?;
        for w in 0..words {
            out[produced + w] = Mumo::new(operands[w], modulus);
        }
        produced += words;
    }
    Ok(())
}

/// Reads an `n`-length `u16` table (`index_map`).
pub(crate) fn read_u16_table(
    oracle: &mut dyn TableOracle, n: usize, out: &mut [u16],
) -> CkksResult<()> {
    let mut scratch = [0u8; CHUNK_BYTES];
    let mut produced = 0usize;
    while produced < out.len() {
        let words = (out.len() - produced).min(CHUNK_BYTES / 2);
        let bytes = words * 2;
        oracle.read(TableKind::IndexMap, n, None, &mut scratch[..bytes])?;
        for w in 0..words {
            let b = &scratch[w * 2..w * 2 + 2];
            out[produced + w] = u16::from_le_bytes([b[0], b[1]]);
        }
        produced += words;
    }
    Ok(())
}

/// Reads an `n`-length complex-double table (`ifft_roots`), bit-reversed.
pub(crate) fn read_complex_table(
    oracle: &mut dyn TableOracle, n: usize, out: &mut [Complex64],
) -> CkksResult<()> {
    const ENTRY_BYTES: usize = 16; // two little-endian f64s
    let mut scratch = [0u8; CHUNK_BYTES];
    let per_chunk = CHUNK_BYTES / ENTRY_BYTES;
    let mut produced = 0usize;
    while produced < out.len() {
        let entries = (out.len() - produced).min(per_chunk);
        let bytes = entries * ENTRY_BYTES;
        oracle.read(TableKind::IfftRoots, n, None, &mut scratch[..bytes])?;
        for w in 0..entries {
            let base = w * ENTRY_BYTES;
            let re = f64::from_le_bytes([
                scratch[base], scratch[base + 1], scratch[base + 2], scratch[base + 3],
                scratch[base + 4], scratch[base + 5], scratch[base + 6], scratch[base + 7],
            ]);
            let im = f64::from_le_bytes([
                scratch[base + 8], scratch[base + 9], scratch[base + 10], scratch[base + 11],
                scratch[base + 12], scratch[base + 13], scratch[base + 14], scratch[base + 15],
            ]);
            out[produced + w] = Complex64::new(re, im);
        }
        produced += entries;
    }
    Ok(())
}

/// Reads `sk(n)`: `n/4` raw bytes of compressed ternary.
pub(crate) fn read_secret_key(
    oracle: &mut dyn TableOracle, n: usize, out: &mut [u8],
) -> CkksResult<()> {
    debug_assert_eq!(out.len(), n / 4);
    oracle.read(TableKind::SecretKey, n, None, out)
}
